//! Row source: spreadsheet or CSV document → (row number, field map)
//!
//! The first row holds the column headers. Every following row that is not
//! blank is yielded as a [`FieldMap`] keyed by header text. Row numbers are
//! counted from the header row as row 1, so blank rows leave gaps in the
//! numbering.
//!
//! Workbooks (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`) are read through
//! calamine; `.csv` files are read into memory and parsed record by record.

use std::io::Cursor;
use std::sync::Arc;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, DataType, Reader};
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::ImportError;

/// One cell as read from the document
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl CellValue {
    /// Empty cell or empty string
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Text rendering used by the normalizers
    ///
    /// Whole floats render without a fractional part (`112.0` → `"112"`).
    /// `None` for empty cells.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Text(s) => Some(s.clone()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{f:.0}")),
            Self::Float(f) => Some(f.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Date(d) => Some(d.to_string()),
        }
    }

    fn from_workbook(cell: &Data) -> Self {
        match cell {
            Data::Empty => Self::Empty,
            Data::String(s) => Self::Text(s.clone()),
            Data::Int(i) => Self::Int(*i),
            Data::Float(f) => Self::Float(*f),
            Data::Bool(b) => Self::Bool(*b),
            Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_date() {
                Some(date) => Self::Date(date),
                None => Self::Text(cell.to_string()),
            },
            Data::DurationIso(s) => Self::Text(s.clone()),
            Data::Error(e) => Self::Text(e.to_string()),
        }
    }

    fn from_csv(field: &str) -> Self {
        if field.is_empty() {
            Self::Empty
        } else {
            Self::Text(field.to_string())
        }
    }
}

/// Header-keyed cells of one row, in header order
///
/// When two headers share a name the right-most cell wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    fields: Vec<(String, CellValue)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing an earlier value under the same name
    pub fn insert(&mut self, name: impl Into<String>, value: CellValue) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, CellValue)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

/// A non-blank data row
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    /// 1-based row number, header row = 1
    pub row_number: usize,
    pub fields: FieldMap,
}

enum Records {
    Workbook(std::vec::IntoIter<Vec<CellValue>>),
    Csv {
        records: csv::StringRecordsIntoIter<Cursor<Arc<[u8]>>>,
        lines: LineIndex,
    },
}

/// Maps byte offsets of a CSV document to 1-based line numbers
struct LineIndex {
    document: Arc<[u8]>,
    /// Byte offsets of every `\n`
    newlines: Vec<usize>,
}

impl LineIndex {
    fn new(document: Arc<[u8]>) -> Self {
        let newlines = document
            .iter()
            .enumerate()
            .filter(|(_, b)| **b == b'\n')
            .map(|(i, _)| i)
            .collect();
        Self { document, newlines }
    }

    /// Line of the record starting at `offset`
    ///
    /// A record's position is taken before the reader skips empty lines, so
    /// leading line breaks are stepped over first.
    fn record_line(&self, offset: u64) -> usize {
        let mut start = usize::try_from(offset).unwrap_or(self.document.len());
        while matches!(self.document.get(start), Some(b'\n' | b'\r')) {
            start += 1;
        }
        self.newlines.partition_point(|&nl| nl < start) + 1
    }
}

/// Lazy iterator over the data rows of a document
pub struct RowSource {
    path: PathBuf,
    headers: Vec<Option<String>>,
    records: Records,
    /// Row number of the last record read
    position: usize,
}

impl std::fmt::Debug for RowSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowSource")
            .field("path", &self.path)
            .field("headers", &self.headers)
            .field("position", &self.position)
            .finish()
    }
}

impl RowSource {
    /// Open a document and read its header row
    ///
    /// Without a sheet selector the first worksheet is used. CSV documents
    /// have a single implicit sheet; a selector is ignored.
    pub fn open(path: &Path, sheet: Option<&str>) -> Result<Self, ImportError> {
        if !path.exists() {
            return Err(ImportError::SourceNotFound(path.to_path_buf()));
        }

        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

        let (header_row, records) = if is_csv {
            if let Some(sheet) = sheet {
                warn!("Ignoring sheet {sheet:?}: {} is a CSV file", path.display());
            }
            open_csv(path)?
        } else {
            open_workbook(path, sheet)?
        };

        let headers: Vec<Option<String>> = header_row
            .iter()
            .map(|cell| match cell {
                CellValue::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                _ => None,
            })
            .collect();
        debug!(?headers, "Read header row from {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            headers,
            records,
            position: 1,
        })
    }

    /// Column names in document order; `None` for dropped columns
    pub fn headers(&self) -> &[Option<String>] {
        &self.headers
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Next raw record with its row number
    fn next_record(&mut self) -> Option<Result<(usize, Vec<CellValue>), ImportError>> {
        match &mut self.records {
            Records::Workbook(rows) => {
                let cells = rows.next()?;
                self.position += 1;
                Some(Ok((self.position, cells)))
            }
            Records::Csv { records, lines } => {
                let record = match records.next()? {
                    Ok(record) => record,
                    Err(e) => {
                        return Some(Err(ImportError::Malformed {
                            path: self.path.clone(),
                            reason: e.to_string(),
                        }))
                    }
                };
                // the reader's own line counter ignores skipped empty lines
                self.position = match record.position() {
                    Some(pos) => lines.record_line(pos.byte()),
                    None => self.position + 1,
                };
                Some(Ok((self.position, record.iter().map(CellValue::from_csv).collect())))
            }
        }
    }

    fn to_field_map(&self, cells: Vec<CellValue>) -> FieldMap {
        self.headers
            .iter()
            .zip(cells)
            .filter_map(|(header, cell)| header.as_ref().map(|name| (name.clone(), cell)))
            .collect()
    }
}

impl Iterator for RowSource {
    type Item = Result<SourceRow, ImportError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (row_number, cells) = match self.next_record()? {
                Ok(record) => record,
                Err(e) => return Some(Err(e)),
            };

            if cells.iter().all(CellValue::is_empty) {
                continue;
            }

            return Some(Ok(SourceRow {
                row_number,
                fields: self.to_field_map(cells),
            }));
        }
    }
}

fn open_workbook(path: &Path, sheet: Option<&str>) -> Result<(Vec<CellValue>, Records), ImportError> {
    let malformed = |reason: String| ImportError::Malformed {
        path: path.to_path_buf(),
        reason,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| malformed(e.to_string()))?;
    let sheet_names = workbook.sheet_names();

    let sheet_name = match sheet {
        Some(name) if sheet_names.iter().any(|s| s == name) => name.to_string(),
        Some(name) => {
            return Err(ImportError::SheetNotFound {
                sheet: name.to_string(),
                path: path.to_path_buf(),
            })
        }
        None => match sheet_names.first() {
            Some(first) => first.clone(),
            None => return Err(malformed("workbook has no worksheets".to_string())),
        },
    };
    debug!("Reading worksheet {sheet_name:?}");

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| malformed(e.to_string()))?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(CellValue::from_workbook).collect::<Vec<_>>());
    let header_row = rows.next().unwrap_or_default();
    let data_rows: Vec<Vec<CellValue>> = rows.collect();

    Ok((header_row, Records::Workbook(data_rows.into_iter())))
}

fn open_csv(path: &Path) -> Result<(Vec<CellValue>, Records), ImportError> {
    let malformed = |e: csv::Error| ImportError::Malformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let document: Arc<[u8]> = std::fs::read(path)?.into();
    let lines = LineIndex::new(Arc::clone(&document));

    let mut records = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(Cursor::new(document))
        .into_records();

    let header_row = match records.next() {
        Some(record) => record.map_err(malformed)?.iter().map(CellValue::from_csv).collect(),
        None => Vec::new(),
    };

    Ok((header_row, Records::Csv { records, lines }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn whole_floats_render_without_fraction() {
        assert_eq!(CellValue::Float(112.0).as_text().as_deref(), Some("112"));
        assert_eq!(CellValue::Float(7.5).as_text().as_deref(), Some("7.5"));
        assert_eq!(CellValue::Empty.as_text(), None);
    }

    #[test]
    fn field_map_keeps_rightmost_duplicate() {
        let map: FieldMap = vec![
            ("law_title", CellValue::Text("first".into())),
            ("law_number", CellValue::Int(3)),
            ("law_title", CellValue::Text("second".into())),
        ]
        .into_iter()
        .collect();

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("law_title"), Some(&CellValue::Text("second".into())));
        assert_eq!(map.iter().next().map(|(k, _)| k), Some("law_title"));
    }

    #[test]
    fn csv_rows_skip_blanks_and_keep_row_numbers() {
        let file = write_csv("law_number,law_title\n1,Premier\n,\n\n3,Troisième\n");
        let rows: Vec<SourceRow> = RowSource::open(file.path(), None)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_number, 2);
        assert_eq!(rows[0].fields.get("law_title"), Some(&CellValue::Text("Premier".into())));
        assert_eq!(rows[1].row_number, 5);
    }

    #[test]
    fn csv_row_numbers_with_crlf_and_leading_blank_lines() {
        let file = write_csv("law_number,law_title\r\n\r\n\r\n4,Quatrième\r\n\r\n6,Sixième\r\n");
        let numbers: Vec<usize> = RowSource::open(file.path(), None)
            .unwrap()
            .map(|row| row.unwrap().row_number)
            .collect();

        assert_eq!(numbers, vec![4, 6]);
    }

    #[test]
    fn blank_and_duplicate_headers() {
        let file = write_csv(" law_number ,,law_title,law_title\n5,decor,A,B\n");
        let mut source = RowSource::open(file.path(), Some("ignored")).unwrap();
        assert_eq!(
            source.headers(),
            &[
                Some("law_number".to_string()),
                None,
                Some("law_title".to_string()),
                Some("law_title".to_string())
            ]
        );

        let row = source.next().unwrap().unwrap();
        assert_eq!(row.fields.len(), 2);
        assert_eq!(row.fields.get("law_number"), Some(&CellValue::Text("5".into())));
        assert_eq!(row.fields.get("law_title"), Some(&CellValue::Text("B".into())));
        assert!(source.next().is_none());
    }

    #[test]
    fn missing_document_is_source_not_found() {
        let err = RowSource::open(Path::new("/nonexistent/laws.xlsx"), None).unwrap_err();
        assert!(matches!(err, ImportError::SourceNotFound(_)));
    }

    #[test]
    fn header_only_document_yields_nothing() {
        let file = write_csv("law_number,law_title\n");
        assert_eq!(RowSource::open(file.path(), None).unwrap().count(), 0);
    }
}
