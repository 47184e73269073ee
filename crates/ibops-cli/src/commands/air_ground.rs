use ibops_core::error::IbopsError;
use ibops_core::parsing::values::parse_date_str;
use ibops_core::pipelines::air_ground::DateRange;
use std::path::PathBuf;

use super::{build_session, reader_for};
use crate::output;

pub fn run(
    input_file: PathBuf,
    item_master: Option<PathBuf>,
    rules: Option<PathBuf>,
    compare: Option<Vec<String>>,
    header_row: usize,
    output_format: &str,
) -> Result<(), IbopsError> {
    let mut session = build_session(item_master.as_deref())?;
    if let Some(path) = rules {
        let def = ibops_core::rules::load_ruleset(&path)?;
        session = session.with_air_ground_rules(&def)?;
    }

    let bytes = std::fs::read(&input_file)?;
    let reader = reader_for(&input_file, header_row);

    match compare {
        Some(dates) => {
            let (baseline, current) = parse_periods(&dates)?;
            let result = ibops_core::compare_air_ground_file(
                &bytes,
                reader.as_ref(),
                &session,
                baseline,
                current,
            )?;
            match output_format {
                "json" => output::json::print(&result)?,
                _ => output::table::print_air_ground_comparison(&result),
            }
        }
        None => {
            let report = ibops_core::analyze_air_ground_file(&bytes, reader.as_ref(), &session)?;
            match output_format {
                "json" => output::json::print(&report)?,
                _ => output::table::print_air_ground(&report),
            }
        }
    }
    Ok(())
}

fn parse_periods(dates: &[String]) -> Result<(DateRange, DateRange), IbopsError> {
    let parse = |period: &str, s: &str| {
        parse_date_str(s).ok_or_else(|| IbopsError::InvalidPeriod {
            period: period.into(),
            reason: format!("'{s}' is not a date"),
        })
    };
    match dates {
        [b_start, b_end, c_start, c_end] => Ok((
            DateRange::new(parse("baseline", b_start)?, parse("baseline", b_end)?),
            DateRange::new(parse("current", c_start)?, parse("current", c_end)?),
        )),
        _ => Err(IbopsError::InvalidPeriod {
            period: "comparison".into(),
            reason: format!("expected 4 dates, got {}", dates.len()),
        }),
    }
}
