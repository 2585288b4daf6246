// THEORY:
// The `color_cluster` module is the engine of the landmark localization layer.
// It partitions a flat sequence of color samples into K clusters by minimizing
// the within-cluster sum of squared color distances (standard Lloyd's-style
// iterative relocation), the same unsupervised step the detector's pipeline is
// built around.
//
// Key architectural principles & algorithm steps:
// 1.  **Random Seeding**: Each run draws its K initial centroids from the sample
//     set without replacement. Clustering is therefore non-deterministic; a poor
//     draw can land in a poor local optimum.
// 2.  **Iterative Relocation**: Assign every sample to its nearest centroid, then
//     move each centroid to the mean of its members. The loop terminates at a
//     fixed iteration cap or once the largest centroid movement falls below a
//     small epsilon, whichever comes first.
// 3.  **Multi-Attempt Selection**: Independent random restarts are run and the
//     lowest-compactness result kept. The attempts exist specifically to reduce
//     the chance of keeping a poor local optimum; they are independent, so a
//     caller may also fan them out across threads and merge by lowest cost.
// 4.  **Stateless Utility**: Like the rest of the core, this is a set of free
//     functions over caller-owned data. Nothing persists between calls.
//
// A cluster whose membership empties mid-run keeps its last centroid rather than
// being re-seeded. Dead centroids are valid match targets for colors the image
// does not contain, and the caller treats their empty membership as an absent
// landmark.

use crate::core_modules::color_sample::ColorSample;
use rand::Rng;
use rand::seq::index::sample as sample_indices;
use tracing::trace;

/// The outcome of one clustering run over a sample sequence.
#[derive(Debug, Clone)]
pub struct Clustering {
    /// Centroid color of each cluster, indexed by cluster id.
    pub centers: Vec<ColorSample>,
    /// The cluster id assigned to each input sample, in input order.
    pub labels: Vec<usize>,
    /// Within-cluster sum of squared color distances. Lower is better.
    pub compactness: f64,
}

/// Runs `attempts` independent clusterings of `samples` into `total_clusters`
/// clusters and returns the lowest-compactness result.
///
/// Requires `1 <= total_clusters <= samples.len()`; the detector validates
/// this before calling.
pub fn cluster_colors(
    samples: &[ColorSample],
    total_clusters: usize,
    max_iterations: usize,
    epsilon: f64,
    attempts: usize,
    rng: &mut impl Rng,
) -> Clustering {
    let mut best = cluster_once(samples, total_clusters, max_iterations, epsilon, rng);
    for attempt in 1..attempts.max(1) {
        let candidate = cluster_once(samples, total_clusters, max_iterations, epsilon, rng);
        trace!(
            attempt,
            compactness = candidate.compactness,
            "clustering attempt finished"
        );
        if candidate.compactness < best.compactness {
            best = candidate;
        }
    }
    best
}

/// A single clustering attempt: random seeding plus Lloyd's iteration.
pub fn cluster_once(
    samples: &[ColorSample],
    total_clusters: usize,
    max_iterations: usize,
    epsilon: f64,
    rng: &mut impl Rng,
) -> Clustering {
    debug_assert!(total_clusters >= 1 && total_clusters <= samples.len());

    let mut centers: Vec<ColorSample> = sample_indices(rng, samples.len(), total_clusters)
        .into_iter()
        .map(|index| samples[index])
        .collect();
    let mut labels = vec![0usize; samples.len()];

    for _ in 0..max_iterations.max(1) {
        for (label, sample) in labels.iter_mut().zip(samples) {
            *label = nearest_center(&centers, sample);
        }

        let mut sums = vec![[0.0f64; 3]; total_clusters];
        let mut counts = vec![0usize; total_clusters];
        for (label, sample) in labels.iter().zip(samples) {
            sums[*label][0] += sample.red as f64;
            sums[*label][1] += sample.green as f64;
            sums[*label][2] += sample.blue as f64;
            counts[*label] += 1;
        }

        let mut movement = 0.0f64;
        for cluster in 0..total_clusters {
            // An emptied cluster keeps its centroid.
            if counts[cluster] == 0 {
                continue;
            }
            let count = counts[cluster] as f64;
            let updated = ColorSample::new(
                (sums[cluster][0] / count) as f32,
                (sums[cluster][1] / count) as f32,
                (sums[cluster][2] / count) as f32,
            );
            movement = movement.max(centers[cluster].distance(&updated));
            centers[cluster] = updated;
        }

        if movement < epsilon {
            break;
        }
    }

    // The last centroid update may have shifted assignments; settle the labels
    // against the final centers while accumulating the cost.
    let mut compactness = 0.0f64;
    for (label, sample) in labels.iter_mut().zip(samples) {
        *label = nearest_center(&centers, sample);
        compactness += sample.squared_distance(&centers[*label]);
    }

    Clustering {
        centers,
        labels,
        compactness,
    }
}

/// Index of the centroid nearest to `target` in color space. Ties resolve to
/// the lowest cluster index in scan order.
pub fn nearest_center(centers: &[ColorSample], target: &ColorSample) -> usize {
    let mut closest = 0usize;
    let mut closest_dist = f64::MAX;
    for (cluster, center) in centers.iter().enumerate() {
        let dist = center.squared_distance(target);
        if dist < closest_dist {
            closest_dist = dist;
            closest = cluster;
        }
    }
    closest
}
