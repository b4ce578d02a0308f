use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Duration, NaiveDate};
use std::io::Read;
use std::path::Path;

/// Errors raised while loading an uploaded file, before any adaptation runs.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("unsupported file type '{0}': upload a .csv, .tsv, .xls, .xlsx or .ods file")]
    UnsupportedFormat(String),
    #[error("failed to read uploaded table: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid delimited data: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid spreadsheet workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("workbook contains no worksheet")]
    EmptyWorkbook,
    #[error("uploaded table has no header row")]
    MissingHeader,
}

/// Physical layout of an uploaded file, chosen from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Delimited { delimiter: u8 },
    Workbook,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Result<Self, TableError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "csv" | "txt" => Ok(Self::Delimited { delimiter: b',' }),
            "tsv" => Ok(Self::Delimited { delimiter: b'\t' }),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(Self::Workbook),
            "" => Err(TableError::UnsupportedFormat(path.display().to_string())),
            other => Err(TableError::UnsupportedFormat(format!(".{other}"))),
        }
    }
}

/// One uploaded table: a header row plus string cells, where an empty cell is null.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Builds a table from already-split cells; short rows are padded with nulls.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .collect();

        Self { headers, rows }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let path = path.as_ref();
        match TableFormat::from_path(path)? {
            TableFormat::Delimited { delimiter } => {
                let file = std::fs::File::open(path)?;
                Self::from_delimited_reader(file, delimiter)
            }
            TableFormat::Workbook => Self::from_workbook(path),
        }
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        Self::from_delimited_reader(reader, b',')
    }

    pub fn from_delimited_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self, TableError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .byte_headers()?
            .iter()
            .map(|field| String::from_utf8_lossy(field).into_owned())
            .collect();
        if headers.iter().all(|header| header.trim().is_empty()) {
            return Err(TableError::MissingHeader);
        }

        let mut rows = Vec::new();
        for record in csv_reader.byte_records() {
            let record = record?;
            rows.push(
                record
                    .iter()
                    .map(|field| String::from_utf8_lossy(field).into_owned())
                    .collect(),
            );
        }

        Ok(Self::new(headers, rows))
    }

    fn from_workbook(path: &Path) -> Result<Self, TableError> {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(TableError::EmptyWorkbook)??;

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header_row) => header_row.iter().map(cell_text).collect(),
            None => return Err(TableError::MissingHeader),
        };
        if headers.iter().all(|header| header.trim().is_empty()) {
            return Err(TableError::MissingHeader);
        }

        let body = rows
            .map(|row| row.iter().map(cell_text).collect())
            .collect();
        Ok(Self::new(headers, body))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) | Data::DateTimeIso(value) | Data::DurationIso(value) => {
            value.trim().to_string()
        }
        Data::Float(value) => value.to_string(),
        Data::Int(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        Data::DateTime(value) => excel_serial_to_text(value.as_f64()),
        Data::Error(_) => String::new(),
    }
}

// Excel serial dates count days from 1899-12-30.
fn excel_serial_to_text(serial: f64) -> String {
    let Some(epoch) = NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|d| d.and_hms_opt(0, 0, 0))
    else {
        return serial.to_string();
    };
    let seconds = (serial * 86_400.0).round() as i64;
    match epoch.checked_add_signed(Duration::seconds(seconds)) {
        Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => serial.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn csv_reader_pads_short_rows_and_skips_blank_lines() {
        let table = RawTable::from_csv_reader(Cursor::new(
            "username,upload_count,bytes_added\nAlice,3\n,,\nBob,1,200\n",
        ))
        .expect("parse");

        assert_eq!(table.headers(), ["username", "upload_count", "bytes_added"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0], vec!["Alice", "3", ""]);
    }

    #[test]
    fn header_only_file_yields_empty_table() {
        let table =
            RawTable::from_csv_reader(Cursor::new("username,upload_count\n")).expect("parse");
        assert!(table.is_empty());
    }

    #[test]
    fn empty_input_has_no_header() {
        let error = RawTable::from_csv_reader(Cursor::new("")).expect_err("no header");
        assert!(matches!(error, TableError::MissingHeader));
    }

    #[test]
    fn tab_separated_input_is_supported() {
        let table = RawTable::from_delimited_reader(
            Cursor::new("Utilisateur\tOctets ajoutés\nA\t10\n"),
            b'\t',
        )
        .expect("parse");
        assert_eq!(table.headers(), ["Utilisateur", "Octets ajoutés"]);
        assert_eq!(table.rows()[0], vec!["A", "10"]);
    }

    #[test]
    fn format_detection_rejects_unknown_extensions() {
        assert_eq!(
            TableFormat::from_path(Path::new("stats.CSV")).expect("csv"),
            TableFormat::Delimited { delimiter: b',' }
        );
        assert_eq!(
            TableFormat::from_path(Path::new("stats.xlsx")).expect("xlsx"),
            TableFormat::Workbook
        );
        let error = TableFormat::from_path(Path::new("stats.pdf")).expect_err("pdf rejected");
        assert!(error.to_string().contains(".pdf"));
    }

    #[test]
    fn from_path_propagates_io_errors() {
        let error = RawTable::from_path("./does-not-exist.csv").expect_err("missing file");
        assert!(matches!(error, TableError::Io(_)));
    }

    #[test]
    fn excel_serial_dates_render_as_iso_text() {
        assert_eq!(excel_serial_to_text(45_000.5), "2023-03-15 12:00:00");
    }
}
