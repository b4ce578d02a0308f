//! Reconciles the four campaign export shapes onto the canonical metric set.

use super::aliases::{self, source_key};
use super::cells::{parse_count, parse_flag, parse_timestamp};
use super::schema::{
    AdaptError, Advisory, CanonicalTable, ContributorMetrics, DataType, EnrollmentStatus,
    FieldProvenance, InvalidCell, MetricField, SchemaError,
};
use super::table::RawTable;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

const UNKNOWN_USERNAME: &str = "Unknown";
const WIKI_METRIC_SUFFIXES: &[&str] = &["_edits", "_articles_created", "_articles_edited"];

#[derive(Debug, Clone, Copy)]
enum CellKind {
    Count,
    Flag,
}

/// Candidate source columns for one canonical field, in priority order.
struct FieldSource {
    field: MetricField,
    candidates: &'static [&'static str],
    kind: CellKind,
}

const fn count(field: MetricField, candidates: &'static [&'static str]) -> FieldSource {
    FieldSource {
        field,
        candidates,
        kind: CellKind::Count,
    }
}

const EDITORS_SOURCES: &[FieldSource] = &[
    count(
        MetricField::TotalEdits,
        &[aliases::REVISIONS_DURING_PROJECT, aliases::TOTAL_EDITS],
    ),
    count(
        MetricField::BytesAdded,
        &[aliases::MAINSPACE_BYTES_ADDED, aliases::BYTES_ADDED],
    ),
    count(
        MetricField::ArticlesCreated,
        &[aliases::TOTAL_ARTICLES_CREATED, aliases::ARTICLES_CREATED],
    ),
    count(
        MetricField::ArticlesEdited,
        &[aliases::TOTAL_ARTICLES_EDITED, aliases::ARTICLES_EDITED],
    ),
    count(MetricField::ReferencesAdded, &[aliases::REFERENCES_ADDED]),
    count(MetricField::UploadCount, &[aliases::UPLOAD_COUNT]),
    count(
        MetricField::WikidataEdits,
        &[aliases::WIKIDATA_SITE_EDITS, aliases::WIKIDATA_EDITS],
    ),
];

const OVERVIEW_SOURCES: &[FieldSource] = &[
    count(MetricField::TotalEdits, &[aliases::TOTAL_EDITS]),
    count(MetricField::ArticlesCreated, &[aliases::ARTICLES_CREATED]),
    count(MetricField::ArticlesEdited, &[aliases::ARTICLES_EDITED]),
    count(MetricField::BytesAdded, &[aliases::BYTES_ADDED]),
    count(MetricField::ReferencesAdded, &[aliases::REFERENCES_ADDED]),
    count(MetricField::UploadCount, &[aliases::UPLOAD_COUNT]),
    count(
        MetricField::WikidataEdits,
        &[aliases::WIKIDATA_SITE_EDITS, aliases::WIKIDATA_EDITS],
    ),
];

const ARTICLES_SOURCES: &[FieldSource] = &[
    count(
        MetricField::TotalEdits,
        &[aliases::EDIT_COUNT, aliases::TOTAL_EDITS],
    ),
    count(
        MetricField::BytesAdded,
        &[aliases::CHARACTERS_ADDED, aliases::BYTES_ADDED],
    ),
    count(MetricField::ReferencesAdded, &[aliases::REFERENCES_ADDED]),
    FieldSource {
        field: MetricField::ArticlesCreated,
        candidates: &[aliases::NEW_ARTICLE],
        kind: CellKind::Flag,
    },
];

const COMMONS_SOURCES: &[FieldSource] = &[count(
    MetricField::ArticlesEdited,
    &[aliases::USAGE_COUNT],
)];

/// Canonical metrics for one export, or the reason the export cannot be read.
///
/// Missing metric columns never fail: they are zero-filled and reported as
/// [`Advisory::DefaultedColumn`]. Only a missing username column on a
/// per-contributor export is fatal.
pub fn adapt(raw: &RawTable, data_type: DataType) -> Result<CanonicalTable, AdaptError> {
    let mut advisories = Vec::new();
    let columns = ResolvedColumns::new(raw.headers(), &mut advisories);

    let username_column = columns.index_of(aliases::USERNAME);
    if data_type.is_per_contributor() && username_column.is_none() {
        return Err(SchemaError::MissingIdentity {
            data_type,
            available: raw.headers().to_vec(),
        }
        .into());
    }

    let sources = match data_type {
        DataType::Editors => EDITORS_SOURCES,
        DataType::Overview => OVERVIEW_SOURCES,
        DataType::Articles => ARTICLES_SOURCES,
        DataType::Commons => COMMONS_SOURCES,
    };

    let mut provenance = FieldProvenance::default();
    let bound = bind_sources(sources, &columns, &mut provenance);
    if data_type == DataType::Commons {
        provenance.record_row_count(MetricField::UploadCount);
    }
    for field in MetricField::ALL {
        provenance.record_default(field);
    }

    let mut enrollment = EnrollmentTracker::new(columns.index_of(aliases::ENROLLMENT_TIMESTAMP));
    let mut contributors = ContributorGroups::default();
    let mut wiki_metrics = Vec::new();
    let wiki_columns = if data_type == DataType::Overview {
        columns.wiki_metric_columns()
    } else {
        Vec::new()
    };
    let mut unknown_usernames = 0usize;

    for (index, row) in raw.rows().iter().enumerate() {
        let row_number = index + 1;
        let username = match username_column {
            Some(column) if data_type.is_per_contributor() => {
                let name = row[column].trim();
                if name.is_empty() {
                    unknown_usernames += 1;
                    UNKNOWN_USERNAME.to_string()
                } else {
                    name.to_string()
                }
            }
            _ => {
                let label = overview_label(&columns, row, row_number);
                if contributors.contains(&label) {
                    format!("{label} ({row_number})")
                } else {
                    label
                }
            }
        };

        let entry = contributors.entry(username);
        for source in &bound {
            let cell = &row[source.column];
            let amount = match source.kind {
                CellKind::Count => parse_count(&source.header, row_number, cell)?,
                CellKind::Flag => parse_flag(&source.header, row_number, cell)?,
            };
            entry.add(source.field, amount);
        }
        if data_type == DataType::Commons {
            entry.add(MetricField::UploadCount, 1);
        }
        entry.merge_enrollment(enrollment.observe(row_number, row));

        if data_type == DataType::Overview {
            wiki_metrics.push(read_wiki_metrics(&wiki_columns, row, row_number)?);
        }
    }

    if unknown_usernames > 0 {
        advisories.push(Advisory::UnknownUsername {
            rows: unknown_usernames,
        });
    }
    for field in provenance.defaulted_fields() {
        advisories.push(Advisory::DefaultedColumn { field });
    }

    let contributors = contributors.into_rows();
    debug!(
        %data_type,
        contributors = contributors.len(),
        advisories = advisories.len(),
        "adapted campaign export"
    );

    Ok(CanonicalTable {
        data_type,
        contributors,
        provenance,
        enrollment: enrollment.finish(),
        wiki_metrics,
        advisories,
    })
}

/// Maps each resolved source key to the first column carrying it.
struct ResolvedColumns {
    keys: Vec<(String, usize, String)>,
    by_key: HashMap<String, usize>,
}

impl ResolvedColumns {
    fn new(headers: &[String], advisories: &mut Vec<Advisory>) -> Self {
        let mut keys = Vec::with_capacity(headers.len());
        let mut by_key = HashMap::with_capacity(headers.len());

        for (index, header) in headers.iter().enumerate() {
            let key = source_key(header);
            if key.is_empty() {
                continue;
            }
            if by_key.contains_key(&key) {
                advisories.push(Advisory::DuplicateColumn {
                    header: header.clone(),
                    key,
                });
                continue;
            }
            by_key.insert(key.clone(), index);
            keys.push((key, index, header.clone()));
        }

        Self { keys, by_key }
    }

    fn index_of(&self, key: &str) -> Option<usize> {
        self.by_key.get(key).copied()
    }

    fn header_of(&self, index: usize) -> &str {
        self.keys
            .iter()
            .find(|(_, column, _)| *column == index)
            .map(|(_, _, header)| header.as_str())
            .unwrap_or_default()
    }

    fn wiki_metric_columns(&self) -> Vec<(String, usize)> {
        self.keys
            .iter()
            .filter(|(key, _, _)| {
                MetricField::from_key(key).is_none()
                    && WIKI_METRIC_SUFFIXES
                        .iter()
                        .any(|suffix| key.len() > suffix.len() && key.ends_with(suffix))
            })
            .map(|(key, index, _)| (key.clone(), *index))
            .collect()
    }
}

struct BoundSource {
    field: MetricField,
    column: usize,
    header: String,
    kind: CellKind,
}

fn bind_sources(
    sources: &[FieldSource],
    columns: &ResolvedColumns,
    provenance: &mut FieldProvenance,
) -> Vec<BoundSource> {
    sources
        .iter()
        .filter_map(|source| {
            let column = source
                .candidates
                .iter()
                .find_map(|candidate| columns.index_of(candidate))?;
            let header = columns.header_of(column).to_string();
            provenance.record_source(source.field, header.clone());
            Some(BoundSource {
                field: source.field,
                column,
                header,
                kind: source.kind,
            })
        })
        .collect()
}

fn overview_label(columns: &ResolvedColumns, row: &[String], row_number: usize) -> String {
    columns
        .index_of(aliases::WIKI)
        .map(|column| row[column].trim())
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("overview row {row_number}"))
}

fn read_wiki_metrics(
    columns: &[(String, usize)],
    row: &[String],
    row_number: usize,
) -> Result<BTreeMap<String, u64>, InvalidCell> {
    columns
        .iter()
        .map(|(key, column)| Ok((key.clone(), parse_count(key, row_number, &row[*column])?)))
        .collect()
}

/// Groups rows by username, preserving first-seen order.
#[derive(Default)]
struct ContributorGroups {
    rows: Vec<ContributorMetrics>,
    positions: HashMap<String, usize>,
}

impl ContributorGroups {
    fn entry(&mut self, username: String) -> &mut ContributorMetrics {
        let position = match self.positions.get(&username) {
            Some(position) => *position,
            None => {
                let position = self.rows.len();
                self.rows.push(ContributorMetrics::new(username.clone()));
                self.positions.insert(username, position);
                position
            }
        };
        &mut self.rows[position]
    }

    fn contains(&self, username: &str) -> bool {
        self.positions.contains_key(username)
    }

    fn into_rows(self) -> Vec<ContributorMetrics> {
        self.rows
    }
}

struct EnrollmentTracker {
    column: Option<usize>,
    failure: Option<(usize, String)>,
}

impl EnrollmentTracker {
    fn new(column: Option<usize>) -> Self {
        Self {
            column,
            failure: None,
        }
    }

    fn observe(&mut self, row_number: usize, row: &[String]) -> Option<chrono::NaiveDateTime> {
        let column = self.column?;
        let parsed = parse_timestamp(&row[column]);
        if parsed.is_none() && self.failure.is_none() {
            self.failure = Some((row_number, row[column].clone()));
        }
        parsed
    }

    fn finish(self) -> EnrollmentStatus {
        match (self.column, self.failure) {
            (None, _) => EnrollmentStatus::Absent,
            (Some(_), Some((row, value))) => EnrollmentStatus::Unparseable { row, value },
            (Some(_), None) => EnrollmentStatus::Complete,
        }
    }
}
