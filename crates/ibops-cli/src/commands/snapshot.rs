use ibops_core::error::IbopsError;
use std::path::PathBuf;

use super::{build_session, read_text, reader_for};
use crate::output;

pub fn run(
    transactions: Option<PathBuf>,
    labor: Option<PathBuf>,
    labor_map: Option<PathBuf>,
    header_row: usize,
    output_format: &str,
) -> Result<(), IbopsError> {
    let mut session = build_session(None)?;
    if let Some(path) = labor_map {
        session = session.with_snapshot_labor_map(&ibops_core::rules::load_labor_map(&path)?);
    }

    let tx_bytes = transactions
        .as_ref()
        .map(|path| std::fs::read(path).map(|bytes| (bytes, reader_for(path, header_row))))
        .transpose()?;
    let labor_text = labor.as_deref().map(read_text).transpose()?;

    let report = ibops_core::analyze_snapshot_inputs(
        tx_bytes
            .as_ref()
            .map(|(bytes, reader)| (bytes.as_slice(), reader.as_ref())),
        labor_text.as_deref(),
        &session,
    )?;

    match output_format {
        "json" => output::json::print(&report)?,
        _ => output::table::print_snapshot(&report),
    }
    Ok(())
}
