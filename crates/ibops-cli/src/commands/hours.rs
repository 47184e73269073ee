use ibops_core::error::IbopsError;
use ibops_core::pipelines::hours;
use std::path::PathBuf;

use super::{build_session, read_text};
use crate::output;

pub fn run(
    input_file: PathBuf,
    baseline: Option<PathBuf>,
    labor_map: Option<PathBuf>,
    output_format: &str,
) -> Result<(), IbopsError> {
    let mut session = build_session(None)?;
    if let Some(path) = labor_map {
        session = session.with_hours_labor_map(&ibops_core::rules::load_labor_map(&path)?);
    }
    let current = read_text(&input_file)?;

    match baseline {
        Some(path) => {
            let baseline = read_text(&path)?;
            let cmp = hours::compare_hours(&baseline, &current, &session)?;
            match output_format {
                "json" => output::json::print(&cmp)?,
                _ => output::table::print_hours_comparison(&cmp),
            }
        }
        None => {
            let report = hours::analyze_hours(&current, &session)?;
            match output_format {
                "json" => output::json::print(&report)?,
                _ => output::table::print_hours(&report),
            }
        }
    }
    Ok(())
}
