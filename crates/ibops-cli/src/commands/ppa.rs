use ibops_core::error::IbopsError;
use std::path::PathBuf;

use super::{build_session, reader_for};
use crate::output;

pub fn run(
    input_file: PathBuf,
    item_master: Option<PathBuf>,
    rules: Option<PathBuf>,
    header_row: usize,
    output_format: &str,
) -> Result<(), IbopsError> {
    let mut session = build_session(item_master.as_deref())?;
    if let Some(path) = rules {
        let def = ibops_core::rules::load_ruleset(&path)?;
        session = session.with_ppa_rules(&def)?;
    }

    let bytes = std::fs::read(&input_file)?;
    let reader = reader_for(&input_file, header_row);
    let report = ibops_core::analyze_ppa_file(&bytes, reader.as_ref(), &session)?;

    match output_format {
        "json" => output::json::print(&report)?,
        _ => output::table::print_ppa(&report),
    }
    Ok(())
}
