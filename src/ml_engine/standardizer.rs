//! Z-score standardization of the (avgHr, steps) feature pair.
//!
//! Pure, deterministic leaf used by both prediction and training. Stats are
//! always computed over whatever point set is being standardized and never
//! persisted.

use crate::types::{Centroid, FeatureStats};

fn mean(values: impl Iterator<Item = f64>, n: usize) -> f64 {
    values.sum::<f64>() / n.max(1) as f64
}

fn population_std(values: impl Iterator<Item = f64>, avg: f64, n: usize) -> f64 {
    let variance = values.map(|v| (v - avg) * (v - avg)).sum::<f64>() / n.max(1) as f64;
    let std = variance.sqrt();
    // Degenerate axis (all values identical): floor at 1 to avoid division by zero
    if std == 0.0 {
        1.0
    } else {
        std
    }
}

impl FeatureStats {
    /// Compute means and population standard deviations over a non-empty
    /// point set. Population std divides by n, not n-1.
    pub fn from_points(points: &[Centroid]) -> Self {
        let n = points.len();
        let mean_hr = mean(points.iter().map(|p| p.avg_hr), n);
        let mean_steps = mean(points.iter().map(|p| p.steps), n);
        Self {
            mean_hr,
            mean_steps,
            std_hr: population_std(points.iter().map(|p| p.avg_hr), mean_hr, n),
            std_steps: population_std(points.iter().map(|p| p.steps), mean_steps, n),
        }
    }

    /// Map a raw point into standardized space.
    pub fn standardize(&self, p: Centroid) -> Centroid {
        Centroid {
            avg_hr: (p.avg_hr - self.mean_hr) / self.std_hr,
            steps: (p.steps - self.mean_steps) / self.std_steps,
        }
    }

    /// Inverse of [`standardize`](Self::standardize).
    pub fn destandardize(&self, p: Centroid) -> Centroid {
        Centroid {
            avg_hr: p.avg_hr * self.std_hr + self.mean_hr,
            steps: p.steps * self.std_steps + self.mean_steps,
        }
    }
}

/// Squared Euclidean distance between two points.
pub fn distance_sq(a: Centroid, b: Centroid) -> f64 {
    let d_hr = a.avg_hr - b.avg_hr;
    let d_steps = a.steps - b.steps;
    d_hr * d_hr + d_steps * d_steps
}
