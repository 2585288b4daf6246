// THEORY:
// The `pipeline` module is the top-level API for the perception side of the
// robot core. It bundles the externally supplied configuration (the ordered
// target palette, the cluster count, and the detector tuning) behind a single,
// validated entry point, so the control loop above it only ever hands in a
// frame and receives landmark positions.
//
// The pipeline is deliberately a value type with no mutable fields: the
// detector is stateless, every `detect` call computes fresh results, and there
// is no hidden caching between frames.

use crate::core_modules::color_sample::ColorSample;
use crate::core_modules::landmark_detector;
use crate::core_modules::vector2d::Vector2d;
use crate::error::{ConfigurationError, VisionResult};
use image::RgbImage;
use serde::{Deserialize, Serialize};

// Reference tuning, selected for the landmark localization problem: shrink
// aggressively, iterate briefly, and spend the saved time on restarts.
const DOWNSAMPLE_FACTOR: u32 = 9;
const CLUSTER_ITERATIONS: usize = 5;
const CLUSTER_EPSILON: f64 = 1.0;
const CLUSTER_ATTEMPTS: usize = 3;

/// Tuning knobs for the landmark detector. The defaults are the reference
/// values; lowering iterations or attempts bounds per-tick latency at the cost
/// of clustering quality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorParams {
    /// Linear downsample factor applied to each image dimension before
    /// clustering.
    pub downsample_factor: u32,
    /// Iteration cap for a single clustering attempt.
    pub cluster_iterations: usize,
    /// Centroid-movement threshold below which an attempt stops early.
    pub cluster_epsilon: f64,
    /// Independent random restarts; the lowest-cost result is kept.
    pub cluster_attempts: usize,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            downsample_factor: DOWNSAMPLE_FACTOR,
            cluster_iterations: CLUSTER_ITERATIONS,
            cluster_epsilon: CLUSTER_EPSILON,
            cluster_attempts: CLUSTER_ATTEMPTS,
        }
    }
}

/// Configuration for a `LandmarkPipeline`.
///
/// The palette order is significant: detector output entries correspond to
/// palette entries one to one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// The target colors to localize, in output order (R,G,B, 0-255 domain).
    pub target_palette: Vec<ColorSample>,
    /// Total color clusters to partition each frame into. Must be at least
    /// the palette length.
    pub total_clusters: usize,
    /// Detector tuning.
    pub detector: DetectorParams,
}

impl PipelineConfig {
    /// Fails fast on requests the detector would reject on every frame.
    pub fn validate(&self) -> VisionResult<()> {
        if self.target_palette.is_empty() {
            return Err(ConfigurationError::EmptyPalette);
        }
        if self.total_clusters < self.target_palette.len() {
            return Err(ConfigurationError::ClusterCountTooSmall {
                requested: self.total_clusters,
                palette_len: self.target_palette.len(),
            });
        }
        Ok(())
    }
}

/// The perception front door: a validated palette plus tuning, applied to one
/// frame at a time.
#[derive(Debug, Clone)]
pub struct LandmarkPipeline {
    config: PipelineConfig,
}

impl LandmarkPipeline {
    pub fn new(config: PipelineConfig) -> VisionResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Locates every palette color in `frame`. One entry per palette entry,
    /// in palette order; `None` marks a target the frame does not contain.
    /// `frame` is overwritten with the diagnostic overlay.
    pub fn detect(&self, frame: &mut RgbImage) -> VisionResult<Vec<Option<Vector2d>>> {
        landmark_detector::detect_with_params(
            frame,
            self.config.total_clusters,
            &self.config.target_palette,
            &self.config.detector,
            &mut rand::thread_rng(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn config(palette: Vec<ColorSample>, total_clusters: usize) -> PipelineConfig {
        PipelineConfig {
            target_palette: palette,
            total_clusters,
            detector: DetectorParams::default(),
        }
    }

    #[test]
    fn rejects_undersized_cluster_count_at_construction() {
        let bad = config(
            vec![
                ColorSample::new(255.0, 0.0, 0.0),
                ColorSample::new(0.0, 0.0, 255.0),
            ],
            1,
        );
        assert!(LandmarkPipeline::new(bad).is_err());
    }

    #[test]
    fn rejects_empty_palette_at_construction() {
        assert_eq!(
            LandmarkPipeline::new(config(Vec::new(), 3)).unwrap_err(),
            ConfigurationError::EmptyPalette
        );
    }

    #[test]
    fn detects_through_the_pipeline() {
        let pipeline = LandmarkPipeline::new(config(
            vec![
                ColorSample::new(255.0, 0.0, 0.0),
                ColorSample::new(0.0, 0.0, 255.0),
            ],
            2,
        ))
        .unwrap();

        let mut frame = RgbImage::from_fn(90, 90, |x, _| {
            if x < 45 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        });
        let positions = pipeline.detect(&mut frame).unwrap();
        assert_eq!(positions.len(), 2);
        assert!(positions[0].unwrap().x < 0.5);
        assert!(positions[1].unwrap().x > 0.5);
    }

    #[test]
    fn config_round_trips_through_serde() {
        let original = config(vec![ColorSample::new(200.0, 16.0, 16.0)], 4);
        let json = serde_json::to_string(&original).unwrap();
        let restored: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.target_palette, original.target_palette);
        assert_eq!(restored.total_clusters, original.total_clusters);
        assert_eq!(
            restored.detector.downsample_factor,
            original.detector.downsample_factor
        );
    }
}
