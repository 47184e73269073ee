//! Hours breakdown: pasted "function / hours" listings bucketed into
//! inbound labor groups, optionally compared against a baseline listing.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::IbopsError;
use crate::labor::{compare_shares, LaborBreakdown, ShareComparison};
use crate::parsing::labor::parse_hours_listing;
use crate::parsing::SkippedLine;
use crate::session::AnalysisSession;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoursReport {
    /// Hours across all buckets; the share base.
    pub inbound_hours: Decimal,
    /// Every hour in the listing, bucketed or not.
    pub listed_hours: Decimal,
    pub breakdown: LaborBreakdown,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_lines: Vec<SkippedLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoursComparison {
    pub baseline: HoursReport,
    pub current: HoursReport,
    /// Shifts ordered by baseline share, largest first.
    pub shares: ShareComparison,
}

pub fn analyze_hours(text: &str, session: &AnalysisSession) -> Result<HoursReport, IbopsError> {
    let listing = parse_hours_listing(text);
    if !listing.skipped_lines.is_empty() {
        tracing::debug!(skipped = listing.skipped_lines.len(), "hours listing lines skipped");
    }

    let breakdown = session.hours_labor().breakdown(&listing.rows, None);
    let inbound_hours = breakdown.bucketed_hours();
    if inbound_hours.is_zero() {
        return Err(IbopsError::NoUsableRows(format!(
            "none of {} listed function(s) matched an hours bucket",
            listing.rows.len()
        )));
    }

    tracing::info!(
        inbound_hours = %inbound_hours,
        buckets = breakdown.categories.len(),
        uncategorized = breakdown.uncategorized.len(),
        "hours breakdown finished"
    );

    Ok(HoursReport {
        inbound_hours,
        listed_hours: breakdown.total_hours,
        breakdown,
        skipped_lines: listing.skipped_lines,
    })
}

/// Compare a baseline listing (typically a 4-week average) with a current
/// one (typically a single day).
pub fn compare_hours(
    baseline_text: &str,
    current_text: &str,
    session: &AnalysisSession,
) -> Result<HoursComparison, IbopsError> {
    let baseline = analyze_hours(baseline_text, session)?;
    let current = analyze_hours(current_text, session)?;

    let mut shares = compare_shares(&baseline.breakdown, &current.breakdown);
    shares
        .shifts
        .sort_by(|a, b| b.baseline_pct.cmp(&a.baseline_pct));

    Ok(HoursComparison {
        baseline,
        current,
        shares,
    })
}
