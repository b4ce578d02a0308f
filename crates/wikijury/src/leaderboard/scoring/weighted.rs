use super::super::normalization::normalize;
use super::super::schema::{CanonicalTable, MetricField};
use super::{ScoredContributor, ScoringFailure, Weights};

/// Linear blend of min-max normalized columns.
///
/// An empty weight map falls back to the unweighted sum over every metric.
pub(super) fn score_weighted(
    table: &CanonicalTable,
    weights: &Weights,
) -> Result<Vec<ScoredContributor>, ScoringFailure> {
    let applied: Vec<(MetricField, f64)> = if weights.is_empty() {
        Weights::uniform(1.0).iter().collect()
    } else {
        weights.iter().collect()
    };

    if let Some((criterion, value)) = applied.iter().find(|(_, weight)| !weight.is_finite()) {
        return Err(ScoringFailure::InvalidWeight {
            criterion: *criterion,
            value: *value,
        });
    }

    let mut scores = vec![0.0; table.len()];
    for (criterion, weight) in applied {
        let column: Vec<f64> = table
            .column(criterion)
            .into_iter()
            .map(|value| value as f64)
            .collect();
        for (score, normalized) in scores.iter_mut().zip(normalize(&column)) {
            *score += weight * normalized;
        }
    }

    Ok(table
        .contributors
        .iter()
        .zip(scores)
        .map(|(metrics, score)| ScoredContributor {
            metrics: metrics.clone(),
            article_creation_points: 0.0,
            wikidata_points: 0.0,
            upload_points: 0.0,
            commons_usage_points: 0.0,
            time_bonus: 1.0,
            score,
            rank: 0,
        })
        .collect())
}
