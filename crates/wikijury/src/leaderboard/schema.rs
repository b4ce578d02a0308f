use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Shape of a campaign export, chosen by the caller rather than inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Editors,
    Overview,
    Articles,
    Commons,
}

impl DataType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Editors => "editors",
            Self::Overview => "overview",
            Self::Articles => "articles",
            Self::Commons => "commons",
        }
    }

    /// Overview rows are campaign aggregates and carry no username.
    pub const fn is_per_contributor(self) -> bool {
        !matches!(self, Self::Overview)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = SchemaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "editors" | "editeurs" | "éditeurs" => Ok(Self::Editors),
            "overview" | "apercu" | "aperçu" => Ok(Self::Overview),
            "articles" => Ok(Self::Articles),
            "commons" | "uploads" | "téléversements" | "televersements" => Ok(Self::Commons),
            _ => Err(SchemaError::UnknownDataType(value.to_string())),
        }
    }
}

/// The seven canonical per-contributor counters, in output column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricField {
    TotalEdits,
    ArticlesCreated,
    ArticlesEdited,
    BytesAdded,
    ReferencesAdded,
    UploadCount,
    WikidataEdits,
}

impl MetricField {
    pub const ALL: [MetricField; 7] = [
        Self::TotalEdits,
        Self::ArticlesCreated,
        Self::ArticlesEdited,
        Self::BytesAdded,
        Self::ReferencesAdded,
        Self::UploadCount,
        Self::WikidataEdits,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            Self::TotalEdits => "total_edits",
            Self::ArticlesCreated => "articles_created",
            Self::ArticlesEdited => "articles_edited",
            Self::BytesAdded => "bytes_added",
            Self::ReferencesAdded => "references_added",
            Self::UploadCount => "upload_count",
            Self::WikidataEdits => "wikidata_edits",
        }
    }

    pub const fn label_fr(self) -> &'static str {
        match self {
            Self::TotalEdits => "Total modifications",
            Self::ArticlesCreated => "Articles créés",
            Self::ArticlesEdited => "Articles modifiés",
            Self::BytesAdded => "Octets ajoutés",
            Self::ReferencesAdded => "Références ajoutées",
            Self::UploadCount => "Fichiers téléversés",
            Self::WikidataEdits => "Éditions Wikidata",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

impl fmt::Display for MetricField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One reconciled contributor row; every counter is present, zero when defaulted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorMetrics {
    pub username: String,
    pub total_edits: u64,
    pub articles_created: u64,
    pub articles_edited: u64,
    pub bytes_added: u64,
    pub references_added: u64,
    pub upload_count: u64,
    pub wikidata_edits: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrolled_at: Option<NaiveDateTime>,
}

impl ContributorMetrics {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }

    pub fn get(&self, field: MetricField) -> u64 {
        match field {
            MetricField::TotalEdits => self.total_edits,
            MetricField::ArticlesCreated => self.articles_created,
            MetricField::ArticlesEdited => self.articles_edited,
            MetricField::BytesAdded => self.bytes_added,
            MetricField::ReferencesAdded => self.references_added,
            MetricField::UploadCount => self.upload_count,
            MetricField::WikidataEdits => self.wikidata_edits,
        }
    }

    pub(crate) fn add(&mut self, field: MetricField, amount: u64) {
        let slot = match field {
            MetricField::TotalEdits => &mut self.total_edits,
            MetricField::ArticlesCreated => &mut self.articles_created,
            MetricField::ArticlesEdited => &mut self.articles_edited,
            MetricField::BytesAdded => &mut self.bytes_added,
            MetricField::ReferencesAdded => &mut self.references_added,
            MetricField::UploadCount => &mut self.upload_count,
            MetricField::WikidataEdits => &mut self.wikidata_edits,
        };
        *slot = slot.saturating_add(amount);
    }

    pub(crate) fn merge_enrollment(&mut self, enrolled_at: Option<NaiveDateTime>) {
        self.enrolled_at = match (self.enrolled_at, enrolled_at) {
            (Some(current), Some(candidate)) => Some(current.min(candidate)),
            (current, candidate) => current.or(candidate),
        };
    }
}

/// Where a canonical field's values came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Provenance {
    Source { column: String },
    RowCount,
    Defaulted,
}

static DEFAULTED: Provenance = Provenance::Defaulted;

/// Provenance of each canonical field, threaded alongside the table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldProvenance {
    fields: BTreeMap<MetricField, Provenance>,
}

impl FieldProvenance {
    pub(crate) fn record_source(&mut self, field: MetricField, column: impl Into<String>) {
        self.fields.insert(
            field,
            Provenance::Source {
                column: column.into(),
            },
        );
    }

    pub(crate) fn record_row_count(&mut self, field: MetricField) {
        self.fields.insert(field, Provenance::RowCount);
    }

    pub(crate) fn record_default(&mut self, field: MetricField) {
        self.fields.entry(field).or_insert(Provenance::Defaulted);
    }

    /// Fields with no recorded source count as defaulted.
    pub fn get(&self, field: MetricField) -> &Provenance {
        self.fields.get(&field).unwrap_or(&DEFAULTED)
    }

    pub fn is_defaulted(&self, field: MetricField) -> bool {
        matches!(self.get(field), Provenance::Defaulted)
    }

    pub fn defaulted_fields(&self) -> Vec<MetricField> {
        MetricField::ALL
            .into_iter()
            .filter(|field| self.is_defaulted(*field))
            .collect()
    }
}

/// State of the optional enrollment column used by the time bonus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Absent,
    Complete,
    Unparseable { row: usize, value: String },
}

/// Non-fatal notice collected during adaptation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    DefaultedColumn { field: MetricField },
    UnknownUsername { rows: usize },
    DuplicateColumn { header: String, key: String },
}

impl Advisory {
    pub fn message(&self) -> String {
        match self {
            Advisory::DefaultedColumn { field } => format!(
                "column '{}' not found; every contributor defaults to 0",
                field.key()
            ),
            Advisory::UnknownUsername { rows } => {
                format!("{rows} row(s) without a username were attributed to 'Unknown'")
            }
            Advisory::DuplicateColumn { header, key } => {
                format!("column '{header}' duplicates '{key}' and was ignored")
            }
        }
    }

    pub fn message_fr(&self) -> String {
        match self {
            Advisory::DefaultedColumn { field } => format!(
                "colonne « {} » absente : valeur 0 pour tous les contributeurs",
                field.label_fr()
            ),
            Advisory::UnknownUsername { rows } => {
                format!("{rows} ligne(s) sans nom d'utilisateur attribuée(s) à « Unknown »")
            }
            Advisory::DuplicateColumn { header, key } => {
                format!("colonne « {header} » en double de « {key} », ignorée")
            }
        }
    }
}

/// Output of the schema adapter: one row per distinct contributor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalTable {
    pub data_type: DataType,
    pub contributors: Vec<ContributorMetrics>,
    pub provenance: FieldProvenance,
    pub enrollment: EnrollmentStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wiki_metrics: Vec<BTreeMap<String, u64>>,
    pub advisories: Vec<Advisory>,
}

impl CanonicalTable {
    pub fn len(&self) -> usize {
        self.contributors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contributors.is_empty()
    }

    pub fn column(&self, field: MetricField) -> Vec<u64> {
        self.contributors
            .iter()
            .map(|contributor| contributor.get(field))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("no username column in {data_type} data (accepted: username, Utilisateur, Nom d'utilisateur); found columns: {}", .available.join(", "))]
    MissingIdentity {
        data_type: DataType,
        available: Vec<String>,
    },
    #[error("unsupported data type '{0}' (expected editors, overview, articles or commons)")]
    UnknownDataType(String),
}

/// A metric cell that could not be read as a non-negative count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("row {row}: column '{column}' holds '{value}', expected a non-negative number")]
pub struct InvalidCell {
    pub column: String,
    pub row: usize,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdaptError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    InvalidCell(#[from] InvalidCell),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_accepts_french_selectors() {
        assert_eq!("Éditeurs".parse::<DataType>().unwrap(), DataType::Editors);
        assert_eq!("aperçu".parse::<DataType>().unwrap(), DataType::Overview);
        assert_eq!(" COMMONS ".parse::<DataType>().unwrap(), DataType::Commons);
        assert!(matches!(
            "pages".parse::<DataType>(),
            Err(SchemaError::UnknownDataType(_))
        ));
    }

    #[test]
    fn provenance_defaults_unrecorded_fields() {
        let mut provenance = FieldProvenance::default();
        provenance.record_source(MetricField::UploadCount, "upload_count");
        provenance.record_default(MetricField::BytesAdded);
        provenance.record_default(MetricField::UploadCount);

        assert!(!provenance.is_defaulted(MetricField::UploadCount));
        assert!(provenance.is_defaulted(MetricField::BytesAdded));
        assert!(provenance.is_defaulted(MetricField::WikidataEdits));
        assert_eq!(provenance.defaulted_fields().len(), 6);
    }

    #[test]
    fn merge_enrollment_keeps_earliest() {
        let early = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid");
        let late = chrono::NaiveDate::from_ymd_opt(2024, 2, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid");
        let mut metrics = ContributorMetrics::new("A");
        metrics.merge_enrollment(Some(late));
        metrics.merge_enrollment(None);
        metrics.merge_enrollment(Some(early));
        assert_eq!(metrics.enrolled_at, Some(early));
    }

    #[test]
    fn advisories_have_bilingual_messages() {
        let advisory = Advisory::DefaultedColumn {
            field: MetricField::UploadCount,
        };
        assert!(advisory.message().contains("upload_count"));
        assert!(advisory.message_fr().contains("Fichiers téléversés"));
    }
}
