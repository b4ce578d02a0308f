use super::super::aliases::{self, source_key};
use super::super::schema::MetricField;
use super::ScoringFailure;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-criterion weights for the weighted (legacy) scoring mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Weights(BTreeMap<MetricField, f64>);

impl Weights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every criterion at the same weight, as the weight sliders start out.
    pub fn uniform(weight: f64) -> Self {
        Self(MetricField::ALL.into_iter().map(|field| (field, weight)).collect())
    }

    pub fn with(mut self, criterion: MetricField, weight: f64) -> Self {
        self.0.insert(criterion, weight);
        self
    }

    /// Resolves user-facing labels (English keys or French column names).
    pub fn from_labels<'a, I>(labels: I) -> Result<Self, ScoringFailure>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut weights = BTreeMap::new();
        let mut seen: BTreeMap<MetricField, &str> = BTreeMap::new();
        for (label, weight) in labels {
            let criterion =
                criterion_from_label(label).ok_or_else(|| ScoringFailure::UnknownCriterion {
                    label: label.to_string(),
                })?;
            if !weight.is_finite() {
                return Err(ScoringFailure::InvalidWeight {
                    criterion,
                    value: weight,
                });
            }
            if let Some(first) = seen.insert(criterion, label) {
                return Err(ScoringFailure::DuplicateCriterion {
                    criterion,
                    first: first.to_string(),
                    second: label.to_string(),
                });
            }
            weights.insert(criterion, weight);
        }
        Ok(Self(weights))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, criterion: MetricField) -> Option<f64> {
        self.0.get(&criterion).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricField, f64)> + '_ {
        self.0.iter().map(|(criterion, weight)| (*criterion, *weight))
    }
}

/// Maps a weight label onto the canonical metric it scales.
pub fn criterion_from_label(label: &str) -> Option<MetricField> {
    let key = source_key(label);
    if let Some(field) = MetricField::from_key(&key) {
        return Some(field);
    }

    match key.as_str() {
        aliases::REVISIONS_DURING_PROJECT | aliases::EDIT_COUNT => Some(MetricField::TotalEdits),
        aliases::TOTAL_ARTICLES_CREATED | aliases::NEW_ARTICLE => {
            Some(MetricField::ArticlesCreated)
        }
        aliases::TOTAL_ARTICLES_EDITED | aliases::USAGE_COUNT => Some(MetricField::ArticlesEdited),
        aliases::MAINSPACE_BYTES_ADDED | aliases::CHARACTERS_ADDED => Some(MetricField::BytesAdded),
        aliases::WIKIDATA_SITE_EDITS => Some(MetricField::WikidataEdits),
        _ => None,
    }
}

/// Caller-supplied knobs for one scoring pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringOptions {
    /// `Some` selects weighted mode; `None` applies the point tariff.
    #[serde(default)]
    pub weights: Option<Weights>,
    #[serde(default = "default_include_time_bonus")]
    pub include_time_bonus: bool,
}

fn default_include_time_bonus() -> bool {
    true
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            weights: None,
            include_time_bonus: true,
        }
    }
}

impl ScoringOptions {
    pub fn point_tariff(include_time_bonus: bool) -> Self {
        Self {
            weights: None,
            include_time_bonus,
        }
    }

    pub fn weighted(weights: Weights) -> Self {
        Self {
            weights: Some(weights),
            include_time_bonus: false,
        }
    }
}
