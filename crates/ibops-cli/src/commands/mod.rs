pub mod air_ground;
pub mod hours;
pub mod ppa;
pub mod rules;
pub mod snapshot;

use ibops_core::error::IbopsError;
use ibops_core::extraction::{JsonRowsReader, RowSource, XlsxReader};
use ibops_core::session::AnalysisSession;
use std::path::Path;

/// Pick the row reader by extension: `.json` is pre-parsed rows, anything
/// else goes through the workbook reader.
pub fn reader_for(path: &Path, header_row: usize) -> Box<dyn RowSource> {
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    tracing::debug!(path = %path.display(), json = is_json, "selected row reader");
    if is_json {
        Box::new(JsonRowsReader)
    } else {
        Box::new(XlsxReader::new(header_row))
    }
}

/// Builtin rules plus the item master, when one is given.
pub fn build_session(item_master: Option<&Path>) -> Result<AnalysisSession, IbopsError> {
    let session = AnalysisSession::with_builtin_rules()?;
    match item_master {
        Some(path) => session.load_item_master(path),
        None => Ok(session),
    }
}

pub fn read_text(path: &Path) -> Result<String, IbopsError> {
    Ok(std::fs::read_to_string(path)?)
}
