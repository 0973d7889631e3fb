//! Nearest-centroid cluster prediction.
//!
//! Pure computation over a rule-table snapshot. Standardization stats are
//! computed over the table's k centroids, not over historical samples:
//! classification boundaries track the currently published rule centroids,
//! so a prediction never outruns the last successful retrain.

use super::standardizer::distance_sq;
use crate::error::EngineError;
use crate::types::{Centroid, ClusterAssignment, FeatureStats, RuleTable};

/// Classify a query point against the table's centroids.
///
/// Returns the id of the centroid minimizing squared Euclidean distance in
/// standardized space. Ties go to the first centroid in table iteration
/// order (implementation-defined, not guaranteed lowest-id).
///
/// Fails with [`EngineError::InvalidInput`] when either input is non-finite
/// or the table is empty.
pub fn predict_cluster(
    table: &RuleTable,
    steps: f64,
    avg_hr: f64,
) -> Result<ClusterAssignment, EngineError> {
    if !steps.is_finite() || !avg_hr.is_finite() {
        return Err(EngineError::InvalidInput(
            "steps and avgHr must be finite numbers".to_string(),
        ));
    }
    if table.is_empty() {
        return Err(EngineError::InvalidInput(
            "rule table has no clusters".to_string(),
        ));
    }

    let centroids: Vec<Centroid> = table
        .clusters
        .iter()
        .map(|r| Centroid {
            avg_hr: r.avg_hr,
            steps: r.steps,
        })
        .collect();
    let stats = FeatureStats::from_points(&centroids);

    let query = stats.standardize(Centroid { avg_hr, steps });

    let mut best = ClusterAssignment {
        cluster_id: parse_id(&table.clusters[0].id, 0),
        index: 0,
    };
    let mut best_dist = f64::INFINITY;
    for (index, (rule, &centroid)) in table.clusters.iter().zip(&centroids).enumerate() {
        let d = distance_sq(query, stats.standardize(centroid));
        if d < best_dist {
            best_dist = d;
            best = ClusterAssignment {
                cluster_id: parse_id(&rule.id, index),
                index,
            };
        }
    }

    Ok(best)
}

/// Rule ids are numeric strings "1".."k"; fall back to position + 1 if a
/// hand-edited table carries a malformed id.
fn parse_id(id: &str, index: usize) -> u32 {
    id.parse().unwrap_or(index as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_at_centroid_returns_that_id() {
        let table = RuleTable::default();
        for rule in &table.clusters {
            let got = predict_cluster(&table, rule.steps, rule.avg_hr).unwrap();
            assert_eq!(got.cluster_id.to_string(), rule.id);
        }
    }

    #[test]
    fn test_extrapolates_below_range() {
        // Lowest-step cluster centroid is (3000, 72); a query well below
        // range still maps to it as nearest neighbor.
        let table = RuleTable::default();
        let got = predict_cluster(&table, 500.0, 65.0).unwrap();
        assert_eq!(got.cluster_id, 1);
        assert_eq!(got.index, 0);
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let table = RuleTable::default();
        assert!(matches!(
            predict_cluster(&table, f64::NAN, 70.0),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            predict_cluster(&table, 1000.0, f64::INFINITY),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_tie_goes_to_first_in_table_order() {
        // Two identical centroids: the first one in table order must win.
        let mut table = RuleTable::default();
        table.clusters.truncate(2);
        table.clusters[1].avg_hr = table.clusters[0].avg_hr;
        table.clusters[1].steps = table.clusters[0].steps;

        let got = predict_cluster(&table, table.clusters[0].steps, table.clusters[0].avg_hr)
            .unwrap();
        assert_eq!(got.index, 0);
    }

    #[test]
    fn test_empty_table_rejected() {
        let table = RuleTable { clusters: Vec::new() };
        assert!(matches!(
            predict_cluster(&table, 1000.0, 70.0),
            Err(EngineError::InvalidInput(_))
        ));
    }
}
