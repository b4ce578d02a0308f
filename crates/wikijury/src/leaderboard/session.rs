use super::schema::{DataType, SchemaError};
use super::table::{RawTable, TableError};
use super::{AnalysisOptions, AnalysisReport, LeaderboardEngine};
use std::path::Path;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no table has been uploaded in this session")]
    NoTable,
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// The table most recently uploaded in a session.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTable {
    pub name: String,
    pub data_type: DataType,
    pub raw: RawTable,
}

/// Caller-owned cache of the last upload and the last report computed from it.
#[derive(Debug, Default)]
pub struct AnalysisSession {
    table: Option<LoadedTable>,
    report: Option<(AnalysisOptions, AnalysisReport)>,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current upload and drops any cached report.
    pub fn load(&mut self, name: impl Into<String>, data_type: DataType, raw: RawTable) {
        let name = name.into();
        info!(%name, %data_type, rows = raw.len(), "loaded table");
        self.table = Some(LoadedTable {
            name,
            data_type,
            raw,
        });
        self.report = None;
    }

    pub fn load_path(
        &mut self,
        path: impl AsRef<Path>,
        data_type: DataType,
    ) -> Result<(), SessionError> {
        let path = path.as_ref();
        let raw = RawTable::from_path(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.load(name, data_type, raw);
        Ok(())
    }

    pub fn table(&self) -> Option<&LoadedTable> {
        self.table.as_ref()
    }

    /// Cached report for `options`, if the last analysis used the same ones.
    pub fn cached(&self, options: &AnalysisOptions) -> Option<&AnalysisReport> {
        self.report
            .as_ref()
            .filter(|(cached_options, _)| cached_options == options)
            .map(|(_, report)| report)
    }

    pub fn analyze(&mut self, options: &AnalysisOptions) -> Result<&AnalysisReport, SessionError> {
        let table = self.table.as_ref().ok_or(SessionError::NoTable)?;
        let reusable = matches!(&self.report, Some((cached, _)) if cached == options);
        if !reusable {
            let report = LeaderboardEngine::new(table.data_type).analyze(&table.raw, options)?;
            self.report = Some((options.clone(), report));
        }

        match &self.report {
            Some((_, report)) => Ok(report),
            None => Err(SessionError::NoTable),
        }
    }

    pub fn clear(&mut self) {
        self.table = None;
        self.report = None;
    }
}
