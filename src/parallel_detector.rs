// THEORY:
// The `parallel_detector` fans the landmark detector's clustering attempts out
// across a bounded pool of blocking tasks. The attempts are independent random
// restarts and only the lowest-cost result is kept, so they parallelize
// cleanly: scheduling order cannot change the outcome beyond the inherent
// non-determinism of random initialization.
//
// The synchronous detector in `core_modules::landmark_detector` stays the
// primary path; this variant exists for hosts that already run the control
// loop on an async runtime and want detect() off the hot thread. Everything
// around the clustering (validation, downsampling, matching, the overlay)
// is cheap and stays synchronous.

use crate::core_modules::color_cluster::{self, Clustering};
use crate::core_modules::color_sample::ColorSample;
use crate::core_modules::landmark_detector;
use crate::core_modules::vector2d::Vector2d;
use crate::error::{ConfigurationError, VisionResult};
use crate::pipeline::DetectorParams;
use futures::future::join_all;
use image::RgbImage;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use tracing::debug;

/// Runs the detector's independent clustering attempts on the tokio blocking
/// pool, bounded by the machine's core count.
pub struct ParallelDetector {
    params: DetectorParams,
    worker_count: usize,
}

impl ParallelDetector {
    pub fn new(params: DetectorParams) -> Self {
        let worker_count = num_cpus::get().max(1).min(params.cluster_attempts.max(1));
        Self {
            params,
            worker_count,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Same contract as `landmark_detector::detect`, with the attempts spread
    /// over the worker pool and merged by lowest compactness.
    pub async fn detect(
        &self,
        image: &mut RgbImage,
        total_clusters: usize,
        palette: &[ColorSample],
    ) -> VisionResult<Vec<Option<Vector2d>>> {
        landmark_detector::validate_request(image, total_clusters, palette)?;

        let small = landmark_detector::downsample(image, self.params.downsample_factor);
        let samples = Arc::new(landmark_detector::image_samples(&small));
        if samples.len() < total_clusters {
            return Err(ConfigurationError::ClusterCountExceedsPixels {
                requested: total_clusters,
                pixels: samples.len(),
            });
        }

        let attempts = self.params.cluster_attempts.max(1);
        let iterations = self.params.cluster_iterations;
        let epsilon = self.params.cluster_epsilon;

        let mut tasks = Vec::with_capacity(self.worker_count);
        for worker in 0..self.worker_count {
            // Round-robin split of the attempts across the pool.
            let share = attempts / self.worker_count
                + usize::from(worker < attempts % self.worker_count);
            if share == 0 {
                continue;
            }
            let samples = Arc::clone(&samples);
            tasks.push(tokio::task::spawn_blocking(move || {
                let mut rng = StdRng::from_entropy();
                let mut best: Option<Clustering> = None;
                for _ in 0..share {
                    let candidate =
                        color_cluster::cluster_once(&samples, total_clusters, iterations, epsilon, &mut rng);
                    if best
                        .as_ref()
                        .map_or(true, |b| candidate.compactness < b.compactness)
                    {
                        best = Some(candidate);
                    }
                }
                best
            }));
        }

        let mut best: Option<Clustering> = None;
        for outcome in join_all(tasks).await {
            let Ok(Some(candidate)) = outcome else {
                continue;
            };
            if best
                .as_ref()
                .map_or(true, |b| candidate.compactness < b.compactness)
            {
                best = Some(candidate);
            }
        }
        // A worker can only fail by panicking; fall back to one inline attempt
        // rather than surfacing a broken pool to the control loop.
        let clustering = match best {
            Some(clustering) => clustering,
            None => color_cluster::cluster_once(
                &samples,
                total_clusters,
                iterations,
                epsilon,
                &mut StdRng::from_entropy(),
            ),
        };
        debug!(
            workers = self.worker_count,
            attempts,
            compactness = clustering.compactness,
            "merged parallel clustering attempts"
        );

        Ok(landmark_detector::resolve_landmarks(
            image,
            small.width(),
            small.height(),
            &clustering,
            palette,
        ))
    }
}

impl Default for ParallelDetector {
    fn default() -> Self {
        Self::new(DetectorParams::default())
    }
}
