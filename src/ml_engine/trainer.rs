//! K-means trainer (Lloyd's algorithm).
//!
//! Seeded initialization, z-score standardization over the full sample
//! population, iterative assignment/update with early convergence, and
//! de-standardization of the final centers back to raw units. For a fixed
//! `(samples, k, max_iter, seed)` the output is bit-identical across runs.

use tracing::debug;

use super::rng::Lcg;
use super::standardizer::distance_sq;
use crate::error::EngineError;
use crate::types::{Centroid, FeatureStats, Sample};

/// Pick `k` distinct sample indices via the seeded generator and use those
/// standardized samples as the initial centers. Stops early if the pool is
/// exhausted (only possible when n == k after the precondition).
fn pick_initial_centers(points: &[Centroid], k: usize, seed: i64) -> Vec<Centroid> {
    let mut rng = Lcg::new(seed);
    let mut centers = Vec::with_capacity(k);
    let mut used = vec![false; points.len()];

    while centers.len() < k && centers.len() < points.len() {
        let idx = rng.next_index(points.len());
        if used[idx] {
            continue;
        }
        used[idx] = true;
        centers.push(points[idx]);
    }

    centers
}

/// Assign every point to its nearest center by squared Euclidean distance.
/// Strict `<` comparison, so the lowest-scanned index wins ties.
fn assign_clusters(points: &[Centroid], centers: &[Centroid]) -> Vec<usize> {
    points
        .iter()
        .map(|&p| {
            let mut best_idx = 0;
            let mut best_dist = f64::INFINITY;
            for (idx, &c) in centers.iter().enumerate() {
                let d = distance_sq(p, c);
                if d < best_dist {
                    best_dist = d;
                    best_idx = idx;
                }
            }
            best_idx
        })
        .collect()
}

/// Recompute each center as the mean of its assigned points. A center with
/// no assigned points keeps its previous position instead of collapsing to
/// NaN or churning through empty-cluster resets.
fn recompute_centers(
    points: &[Centroid],
    assignments: &[usize],
    previous: &[Centroid],
) -> Vec<Centroid> {
    let k = previous.len();
    let mut sums = vec![(0.0f64, 0.0f64, 0usize); k];

    for (&cluster, &point) in assignments.iter().zip(points) {
        let bucket = &mut sums[cluster];
        bucket.0 += point.avg_hr;
        bucket.1 += point.steps;
        bucket.2 += 1;
    }

    sums.iter()
        .zip(previous)
        .map(|(&(hr_sum, steps_sum, count), &prev)| {
            if count > 0 {
                Centroid {
                    avg_hr: hr_sum / count as f64,
                    steps: steps_sum / count as f64,
                }
            } else {
                prev
            }
        })
        .collect()
}

/// Fit `k` cluster centers to the sample population.
///
/// Returns centers in raw `(avg_hr, steps)` units, in internal index order;
/// they carry no semantic id until the orchestrator sorts and reassigns ids.
///
/// Fails with [`EngineError::InsufficientData`] when `samples.len() < k`.
pub fn train_kmeans(
    samples: &[Sample],
    k: usize,
    max_iter: usize,
    seed: i64,
) -> Result<Vec<Centroid>, EngineError> {
    if samples.len() < k {
        return Err(EngineError::InsufficientData {
            needed: k,
            got: samples.len(),
        });
    }

    let points: Vec<Centroid> = samples
        .iter()
        .map(|s| Centroid {
            avg_hr: s.avg_hr,
            steps: s.steps,
        })
        .collect();

    let stats = FeatureStats::from_points(&points);
    let normalized: Vec<Centroid> = points.iter().map(|&p| stats.standardize(p)).collect();

    let mut centers = pick_initial_centers(&normalized, k, seed);
    let mut assignments = assign_clusters(&normalized, &centers);

    let mut iterations = 0;
    for _ in 0..max_iter {
        iterations += 1;
        let next_centers = recompute_centers(&normalized, &assignments, &centers);
        let next_assignments = assign_clusters(&normalized, &next_centers);
        let changed = next_assignments != assignments;
        centers = next_centers;
        assignments = next_assignments;
        if !changed {
            break;
        }
    }

    debug!(
        samples = samples.len(),
        k = k,
        iterations = iterations,
        "k-means training run complete"
    );

    Ok(centers.into_iter().map(|c| stats.destandardize(c)).collect())
}
