use std::io::Cursor;

use calamine::{Data, Reader};

use super::RowSource;
use crate::error::IbopsError;
use crate::model::{CellValue, RawRow};

/// Reads the first worksheet of an xlsx/xls/ods workbook.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxReader {
    /// 0-based row holding the column headers; rows above it are titles.
    pub header_row: usize,
}

impl XlsxReader {
    pub fn new(header_row: usize) -> Self {
        Self { header_row }
    }
}

impl RowSource for XlsxReader {
    fn read_rows(&self, bytes: &[u8]) -> Result<Vec<RawRow>, IbopsError> {
        read_workbook(bytes, self.header_row)
    }

    fn backend_name(&self) -> &str {
        "calamine"
    }
}

/// Read the first sheet into rows. Blank rows are skipped; a blank header
/// cell is keyed by its column letter.
pub fn read_workbook(bytes: &[u8], header_row: usize) -> Result<Vec<RawRow>, IbopsError> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| IbopsError::Spreadsheet(format!("failed to open workbook: {e}")))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IbopsError::Spreadsheet("workbook has no sheets".into()))?
        .map_err(|e| IbopsError::Spreadsheet(format!("failed to read first sheet: {e}")))?;

    let mut sheet_rows = range.rows().skip(header_row);
    let Some(header) = sheet_rows.next() else {
        return Err(IbopsError::Spreadsheet(format!(
            "no header row at row {}",
            header_row + 1
        )));
    };

    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| cell_as_string(cell).unwrap_or_else(|| column_letter(i)))
        .collect();

    let mut rows = Vec::new();
    for cells in sheet_rows {
        let row: RawRow = columns
            .iter()
            .zip(cells)
            .map(|(name, cell)| (name.clone(), to_cell_value(cell)))
            .filter(|(_, v)| !v.is_blank())
            .collect();
        if !row.is_empty() {
            rows.push(row);
        }
    }

    tracing::info!(rows = rows.len(), columns = columns.len(), "read workbook");
    Ok(rows)
}

fn cell_as_string(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Data::Empty => None,
        other => Some(to_cell_value(other).to_string()),
    }
}

fn to_cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        // Excel serial day number; date parsing understands serials.
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            CellValue::Text(s.clone())
        }
    }
}

/// Spreadsheet column letter for a 0-based index: 0 -> A, 26 -> AA.
fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(2), "C");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
    }

    #[test]
    fn test_cell_conversion() {
        assert_eq!(to_cell_value(&Data::Int(152)), CellValue::Number(152.0));
        assert_eq!(to_cell_value(&Data::Empty), CellValue::Empty);
        assert_eq!(
            to_cell_value(&Data::String("REC6701".into())),
            CellValue::Text("REC6701".into())
        );
        assert_eq!(cell_as_string(&Data::String("   ".into())), None);
        assert_eq!(cell_as_string(&Data::Float(3.0)).as_deref(), Some("3"));
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let err = read_workbook(b"not a workbook", 0).unwrap_err();
        assert!(matches!(err, IbopsError::Spreadsheet(_)));
    }
}
