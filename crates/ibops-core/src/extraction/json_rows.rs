use super::RowSource;
use crate::error::IbopsError;
use crate::model::RawRow;

/// Pre-parsed rows: a JSON array of `{column: value}` objects, or a
/// `{sheet: [rows]}` object, of which the first sheet by name is used.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRowsReader;

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum RowsDocument {
    Rows(Vec<RawRow>),
    Sheets(serde_json::Map<String, serde_json::Value>),
}

impl RowSource for JsonRowsReader {
    fn read_rows(&self, bytes: &[u8]) -> Result<Vec<RawRow>, IbopsError> {
        read_rows_json(bytes)
    }

    fn backend_name(&self) -> &str {
        "json"
    }
}

pub fn read_rows_json(bytes: &[u8]) -> Result<Vec<RawRow>, IbopsError> {
    let doc: RowsDocument = serde_json::from_slice(bytes)?;
    let rows = match doc {
        RowsDocument::Rows(rows) => rows,
        RowsDocument::Sheets(sheets) => match sheets.into_iter().next() {
            Some((_, value)) => serde_json::from_value(value)?,
            None => Vec::new(),
        },
    };
    Ok(rows)
}
