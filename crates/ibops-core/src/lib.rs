pub mod aggregate;
pub mod classify;
pub mod diagnostics;
pub mod error;
pub mod extraction;
pub mod insights;
pub mod item_master;
pub mod labor;
pub mod model;
pub mod parsing;
pub mod pipelines;
pub mod rules;
pub mod session;
pub mod volume;

use error::IbopsError;
use extraction::RowSource;
use pipelines::air_ground::{AirGroundReport, DateRange};
use pipelines::ppa::PpaReport;
use pipelines::snapshot::SnapshotReport;
use session::AnalysisSession;

pub use aggregate::ComparisonResult;

/// Main API entry point for the PPA page: read a location export and
/// report category counts and small-volume reach moves.
pub fn analyze_ppa_file(
    bytes: &[u8],
    source: &dyn RowSource,
    session: &AnalysisSession,
) -> Result<PpaReport, IbopsError> {
    let rows = source.read_rows(bytes)?;
    tracing::debug!(backend = source.backend_name(), rows = rows.len(), "rows read");
    pipelines::ppa::analyze_ppa(&rows, session)
}

/// Air vs Ground analysis of a put-away transaction export.
pub fn analyze_air_ground_file(
    bytes: &[u8],
    source: &dyn RowSource,
    session: &AnalysisSession,
) -> Result<AirGroundReport, IbopsError> {
    let rows = source.read_rows(bytes)?;
    tracing::debug!(backend = source.backend_name(), rows = rows.len(), "rows read");
    pipelines::air_ground::analyze_air_ground(&rows, session)
}

/// Air vs Ground comparison of two date ranges within one export.
pub fn compare_air_ground_file(
    bytes: &[u8],
    source: &dyn RowSource,
    session: &AnalysisSession,
    baseline: DateRange,
    current: DateRange,
) -> Result<ComparisonResult<AirGroundReport>, IbopsError> {
    let rows = source.read_rows(bytes)?;
    pipelines::air_ground::compare_periods(&rows, session, baseline, current)
}

/// Snapshot from an optional transaction export and an optional pasted
/// labor report.
pub fn analyze_snapshot_inputs(
    transactions: Option<(&[u8], &dyn RowSource)>,
    labor_text: Option<&str>,
    session: &AnalysisSession,
) -> Result<SnapshotReport, IbopsError> {
    let rows = transactions
        .map(|(bytes, source)| source.read_rows(bytes))
        .transpose()?;
    let labor = labor_text.map(parsing::labor::parse_labor_report);
    pipelines::snapshot::analyze_snapshot(rows.as_deref(), labor.as_ref(), session)
}
