// THEORY:
// The `landmark_detector` is the perception half of the robot core. Given one
// camera frame and an ordered palette of target colors, it reports where in the
// frame each target color sits, as resolution-independent normalized positions.
//
// Key architectural principles & algorithm steps:
// 1.  **Downsample First**: The frame is shrunk by a fixed linear factor before
//     any color math. Clustering cost scales with pixel count, and landmark
//     localization needs nowhere near full sensor resolution; the factor trades
//     spatial precision for throughput and is tunable via `DetectorParams`.
// 2.  **Float Conversion**: Pixels become `ColorSample`s (f32) so distance and
//     centroid math does not accumulate byte-rounding error.
// 3.  **Unsupervised Clustering**: The downsampled pixels are partitioned into
//     `total_clusters` color clusters (`color_cluster`), with multiple random
//     restarts and lowest-cost selection.
// 4.  **Cluster-to-Target Matching**: Each palette entry claims the cluster with
//     the nearest centroid in color space; ties resolve to the lowest cluster
//     index. The palette's order defines the output order.
// 5.  **Coordinate-Wise Median**: A landmark's representative point is the median
//     of its member x coordinates and, independently, the median of its member
//     y coordinates. This is deliberately not a 2-D geometric median: it is
//     cheaper and resistant to stray misclassified pixels. A matched cluster
//     with no members yields an absent entry, never a fabricated point.
// 6.  **Overlay Rendering**: The caller's frame is overwritten with a diagnostic
//     rendering: member pixels of matched clusters take their centroid color,
//     each landmark's median pixel takes a maximum-contrast marker color, and
//     everything else goes black. The rendering is upscaled back to the frame's
//     original dimensions, so the buffer's size is stable across the call.
//
// The detector is stateless: every call computes fresh results, and the only
// side effect is the documented overlay write into the caller's buffer.

use crate::core_modules::color_cluster::{self, Clustering};
use crate::core_modules::color_sample::ColorSample;
use crate::core_modules::vector2d::Vector2d;
use crate::error::{ConfigurationError, VisionResult};
use crate::pipeline::DetectorParams;
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use rand::Rng;
use tracing::debug;

/// Locates each palette color in `image` with the reference tuning.
///
/// Returns one entry per palette entry, in palette order; an entry is `None`
/// when that target color's cluster owns no pixels. `image` is overwritten in
/// place with the diagnostic overlay (same dimensions as the input).
pub fn detect(
    image: &mut RgbImage,
    total_clusters: usize,
    palette: &[ColorSample],
) -> VisionResult<Vec<Option<Vector2d>>> {
    detect_with_params(
        image,
        total_clusters,
        palette,
        &DetectorParams::default(),
        &mut rand::thread_rng(),
    )
}

/// `detect` with explicit tuning and an explicit random source. Control code
/// that needs a bounded per-tick latency adjusts the iteration and attempt
/// counts here; tests pass a seeded generator.
pub fn detect_with_params(
    image: &mut RgbImage,
    total_clusters: usize,
    palette: &[ColorSample],
    params: &DetectorParams,
    rng: &mut impl Rng,
) -> VisionResult<Vec<Option<Vector2d>>> {
    validate_request(image, total_clusters, palette)?;

    let small = downsample(image, params.downsample_factor);
    let samples = image_samples(&small);
    if samples.len() < total_clusters {
        return Err(ConfigurationError::ClusterCountExceedsPixels {
            requested: total_clusters,
            pixels: samples.len(),
        });
    }

    let clustering = color_cluster::cluster_colors(
        &samples,
        total_clusters,
        params.cluster_iterations,
        params.cluster_epsilon,
        params.cluster_attempts,
        rng,
    );
    debug!(
        total_clusters,
        compactness = clustering.compactness,
        "clustered downsampled frame"
    );

    Ok(resolve_landmarks(
        image,
        small.width(),
        small.height(),
        &clustering,
        palette,
    ))
}

/// Rejects requests the pipeline cannot honor before any work starts.
pub(crate) fn validate_request(
    image: &RgbImage,
    total_clusters: usize,
    palette: &[ColorSample],
) -> VisionResult<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ConfigurationError::EmptyImage);
    }
    if palette.is_empty() {
        return Err(ConfigurationError::EmptyPalette);
    }
    if total_clusters < palette.len() {
        return Err(ConfigurationError::ClusterCountTooSmall {
            requested: total_clusters,
            palette_len: palette.len(),
        });
    }
    Ok(())
}

/// Shrinks each dimension by `factor` (bilinear). Dimensions are clamped to at
/// least 1x1 so frames smaller than the factor degrade to a one-pixel problem
/// instead of a zero-size resize.
pub(crate) fn downsample(image: &RgbImage, factor: u32) -> RgbImage {
    let factor = factor.max(1);
    let width = (image.width() / factor).max(1);
    let height = (image.height() / factor).max(1);
    imageops::resize(image, width, height, FilterType::Triangle)
}

/// Flattens an image into row-major color samples (index = y * width + x),
/// the layout the clustering labels refer back to.
pub(crate) fn image_samples(image: &RgbImage) -> Vec<ColorSample> {
    image.pixels().map(ColorSample::from).collect()
}

/// Matches palette entries to clusters, extracts each landmark's median
/// position, and writes the overlay rendering back into `image`.
pub(crate) fn resolve_landmarks(
    image: &mut RgbImage,
    small_width: u32,
    small_height: u32,
    clustering: &Clustering,
    palette: &[ColorSample],
) -> Vec<Option<Vector2d>> {
    let (full_width, full_height) = image.dimensions();
    let mut rendered = RgbImage::new(small_width, small_height);
    let mut positions = vec![None; palette.len()];

    for (entry, target) in palette.iter().enumerate() {
        let cluster = color_cluster::nearest_center(&clustering.centers, target);
        let center_color = clustering.centers[cluster].to_rgb();

        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for y in 0..small_height {
            for x in 0..small_width {
                let index = (y * small_width + x) as usize;
                if clustering.labels[index] == cluster {
                    rendered.put_pixel(x, y, center_color);
                    xs.push(x);
                    ys.push(y);
                }
            }
        }

        // A dead cluster means this target color is not present: report the
        // landmark as absent rather than inventing a position.
        if xs.is_empty() {
            continue;
        }
        xs.sort_unstable();
        ys.sort_unstable();
        let median_x = xs[xs.len() / 2];
        let median_y = ys[ys.len() / 2];

        rendered.put_pixel(
            median_x,
            median_y,
            marker_color(&clustering.centers[cluster]),
        );
        positions[entry] = Some(Vector2d::new(
            median_x as f64 / small_width as f64,
            median_y as f64 / small_height as f64,
        ));
    }

    debug!(
        targets = palette.len(),
        located = positions.iter().filter(|p| p.is_some()).count(),
        "resolved landmark positions"
    );

    *image = imageops::resize(&rendered, full_width, full_height, FilterType::Nearest);
    positions
}

/// Marker for a landmark's median pixel: every channel snapped to the end of
/// the byte range farthest from the cluster color, so the marker is separated
/// from it by at least 128 per channel.
fn marker_color(center: &ColorSample) -> Rgb<u8> {
    let flip = |channel: f32| if channel >= 128.0 { 0u8 } else { 255u8 };
    Rgb([flip(center.red), flip(center.green), flip(center.blue)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const RED: ColorSample = ColorSample {
        red: 255.0,
        green: 0.0,
        blue: 0.0,
    };
    const BLUE: ColorSample = ColorSample {
        red: 0.0,
        green: 0.0,
        blue: 255.0,
    };
    const GREEN: ColorSample = ColorSample {
        red: 0.0,
        green: 255.0,
        blue: 0.0,
    };

    /// 90x90 frame: left half solid red, right half solid blue.
    fn two_region_image() -> RgbImage {
        RgbImage::from_fn(90, 90, |x, _| {
            if x < 45 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        })
    }

    #[test]
    fn locates_two_landmarks_inside_their_regions() {
        let mut image = two_region_image();
        let mut rng = StdRng::seed_from_u64(42);
        let positions = detect_with_params(
            &mut image,
            2,
            &[RED, BLUE],
            &DetectorParams::default(),
            &mut rng,
        )
        .unwrap();

        let red_pos = positions[0].expect("red landmark present");
        let blue_pos = positions[1].expect("blue landmark present");
        assert!(red_pos.x < 0.5, "red median {red_pos:?} left of center");
        assert!(blue_pos.x > 0.5, "blue median {blue_pos:?} right of center");
        for pos in [red_pos, blue_pos] {
            assert!(pos.y > 0.25 && pos.y < 0.75, "median row centered: {pos:?}");
        }
    }

    #[test]
    fn overlay_preserves_dimensions_and_paints_the_marker() {
        let mut image = two_region_image();
        let mut rng = StdRng::seed_from_u64(42);
        let positions = detect_with_params(
            &mut image,
            2,
            &[RED, BLUE],
            &DetectorParams::default(),
            &mut rng,
        )
        .unwrap();
        assert_eq!(image.dimensions(), (90, 90));

        // The red cluster's marker is cyan (each channel flipped away from
        // red). The normalized position scales back to the center of a 9x9
        // block in the upscaled overlay.
        let red_pos = positions[0].unwrap();
        let marker_x = (red_pos.x * 90.0) as u32 + 4;
        let marker_y = (red_pos.y * 90.0) as u32 + 4;
        assert_eq!(*image.get_pixel(marker_x, marker_y), Rgb([0, 255, 255]));
    }

    #[test]
    fn dead_cluster_yields_absent_landmark() {
        // Hand-built clustering: cluster 1 sits at green but owns no pixels.
        let clustering = Clustering {
            centers: vec![RED, GREEN],
            labels: vec![0; 16],
            compactness: 0.0,
        };
        let mut image = RgbImage::from_pixel(8, 8, Rgb([255, 0, 0]));
        let positions = resolve_landmarks(&mut image, 4, 4, &clustering, &[RED, GREEN]);
        assert!(positions[0].is_some());
        assert!(positions[1].is_none());
    }

    #[test]
    fn palette_color_absent_from_image_does_not_error() {
        let mut image = two_region_image();
        let mut rng = StdRng::seed_from_u64(9);
        let positions = detect_with_params(
            &mut image,
            3,
            &[RED, BLUE, GREEN],
            &DetectorParams::default(),
            &mut rng,
        )
        .unwrap();
        assert_eq!(positions.len(), 3);
        assert!(positions[0].is_some());
        assert!(positions[1].is_some());
    }

    #[test]
    fn undersized_cluster_count_is_a_config_error_with_no_output() {
        let mut image = two_region_image();
        let before = image.clone();
        let err = detect(&mut image, 1, &[RED, BLUE]).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::ClusterCountTooSmall {
                requested: 1,
                palette_len: 2,
            }
        );
        // Fail-fast: the frame must not have been touched.
        assert_eq!(image, before);
    }

    #[test]
    fn empty_image_is_a_config_error() {
        let mut image = RgbImage::new(0, 0);
        assert_eq!(
            detect(&mut image, 2, &[RED]).unwrap_err(),
            ConfigurationError::EmptyImage
        );
    }

    #[test]
    fn empty_palette_is_a_config_error() {
        let mut image = two_region_image();
        assert_eq!(
            detect(&mut image, 2, &[]).unwrap_err(),
            ConfigurationError::EmptyPalette
        );
    }

    #[test]
    fn cluster_count_beyond_pixels_is_a_config_error() {
        // 9x9 downsamples to a single pixel.
        let mut image = RgbImage::from_pixel(9, 9, Rgb([10, 10, 10]));
        assert_eq!(
            detect(&mut image, 2, &[RED]).unwrap_err(),
            ConfigurationError::ClusterCountExceedsPixels {
                requested: 2,
                pixels: 1,
            }
        );
    }

    #[test]
    fn uniform_image_degenerates_without_crashing() {
        let mut image = RgbImage::from_pixel(45, 45, Rgb([90, 90, 90]));
        let gray = ColorSample::new(90.0, 90.0, 90.0);
        let mut rng = StdRng::seed_from_u64(5);
        let positions = detect_with_params(
            &mut image,
            2,
            &[gray],
            &DetectorParams::default(),
            &mut rng,
        )
        .unwrap();
        let pos = positions[0].expect("uniform color still localizes");
        assert!(pos.x >= 0.0 && pos.x <= 1.0);
        assert!(pos.y >= 0.0 && pos.y <= 1.0);
    }

    #[test]
    fn frames_smaller_than_the_factor_clamp_to_one_pixel() {
        let mut image = RgbImage::from_pixel(4, 4, Rgb([0, 0, 255]));
        let positions = detect(&mut image, 1, &[BLUE]).unwrap();
        assert_eq!(positions[0], Some(Vector2d::new(0.0, 0.0)));
        assert_eq!(image.dimensions(), (4, 4));
    }

    #[test]
    fn repeated_runs_are_statistically_stable() {
        let palette = [RED, BLUE];
        let mut first = two_region_image();
        let mut second = two_region_image();
        let a = detect(&mut first, 2, &palette).unwrap();
        let b = detect(&mut second, 2, &palette).unwrap();
        for (pa, pb) in a.iter().zip(&b) {
            let (pa, pb) = (pa.unwrap(), pb.unwrap());
            assert!((pa.x - pb.x).abs() < 0.2, "{pa:?} vs {pb:?}");
            assert!((pa.y - pb.y).abs() < 0.2, "{pa:?} vs {pb:?}");
        }
    }
}
