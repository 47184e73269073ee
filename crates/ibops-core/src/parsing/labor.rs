//! Parsers for pasted labor-management text.
//!
//! Two shapes are accepted: the full labor report (metadata, department
//! totals, area totals, per-department function tables) and the bare
//! two-column "function, hours" listing used by the hours breakdown.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;

use super::values::parse_decimal;
use super::SkippedLine;

static REPORT_FIELD_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}|\t").expect("valid field separator"));
static HOURS_FIELD_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\t+|\s{2,}").expect("valid field separator"));
static FC_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"FC:\s*([A-Z0-9]+)").expect("valid FC pattern"));

/// Portal chrome copied along with the report.
const NAVIGATION_MARKERS: &[&str] = &[
    "Chewy Labor Management",
    "Welcome,",
    "Reports",
    "Actions",
    "Labor Area Summary",
    "Report an Issue",
    "FAQ/User Guide",
];

const TABLE_HEADER_MARKERS: &[&str] = &[
    "Labor Function",
    "Total Hours",
    "Labor Department",
    "Labor Dept / Area",
];

/// Headings that open a per-department function table.
pub const FUNCTION_SECTIONS: &[&str] = &[
    "Putaway",
    "Receiving",
    "Support",
    "Unallocated",
    "VAS",
    "Customer Returns",
    "Inventory Control",
    "Outbound",
    "Administrative",
    "Consolidation",
    "Fresh",
    "Returns",
    "Replenishment",
];

const DEPARTMENT_TOTALS: &str = "Labor Department Totals";
const AREA_TOTALS: &str = "Labor Area Totals";

/// One table row: a department, an area or a labor function.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LaborRow {
    /// Owning department (function sections, areas); `None` for
    /// department totals and plain hours listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub name: String,
    pub hours: Decimal,
    pub units: Decimal,
    pub uph: Decimal,
    pub transactions: Decimal,
    pub tph: Decimal,
}

impl LaborRow {
    /// A function with hours only, as read from a two-column listing.
    pub fn hours_only(name: impl Into<String>, hours: Decimal) -> Self {
        Self {
            name: name.into(),
            hours,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaborArea {
    #[serde(flatten)]
    pub row: LaborRow,
    /// `Dept / Area` as printed.
    pub full_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LaborMetadata {
    pub last_updated: Option<String>,
    pub fc: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LaborReport {
    pub metadata: LaborMetadata,
    pub departments: Vec<LaborRow>,
    pub areas: Vec<LaborArea>,
    pub functions: Vec<LaborRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_lines: Vec<SkippedLine>,
}

impl LaborReport {
    pub fn is_empty(&self) -> bool {
        self.departments.is_empty() && self.areas.is_empty() && self.functions.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Departments,
    Areas,
    Functions,
}

/// Whole-number report columns; fractional text is truncated.
fn int_field(s: &str) -> Decimal {
    parse_decimal(s).map(|d| d.trunc()).unwrap_or_default()
}

fn float_field(s: &str) -> Decimal {
    parse_decimal(s).unwrap_or_default()
}

/// Parse the six numeric-table columns: name, hours, units, UPH,
/// transactions, TPH.
fn parse_table_row(parts: &[&str]) -> LaborRow {
    LaborRow {
        department: None,
        name: parts[0].to_string(),
        hours: float_field(parts[1]),
        units: int_field(parts[2]),
        uph: float_field(parts[3]),
        transactions: int_field(parts[4]),
        tph: float_field(parts[5]),
    }
}

fn value_after(line: &str, marker: &str) -> Option<String> {
    line.split_once(marker)
        .map(|(_, rest)| rest.trim().to_string())
}

/// Parse a pasted labor report. Never fails; lines that do not fit are
/// listed in `skipped_lines`.
pub fn parse_labor_report(text: &str) -> LaborReport {
    let mut report = LaborReport::default();
    let mut section: Option<Section> = None;
    let mut department: Option<String> = None;
    let mut in_table = false;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if NAVIGATION_MARKERS.iter().any(|m| line.contains(m)) {
            continue;
        }

        if line.contains("Last Updated:") {
            report.metadata.last_updated = value_after(line, "Last Updated:");
            continue;
        }
        if line.contains("FC Timezone:") {
            report.metadata.timezone = value_after(line, "FC Timezone:");
            continue;
        }
        if line.contains("FC:") {
            if let Some(caps) = FC_CODE.captures(line) {
                report.metadata.fc = Some(caps[1].to_string());
            }
            continue;
        }
        if line.contains("Start Date:") {
            report.metadata.start_date = value_after(line, "Start Date:");
            continue;
        }
        if line.contains("End Date:") {
            report.metadata.end_date = value_after(line, "End Date:");
            continue;
        }

        if line == DEPARTMENT_TOTALS {
            section = Some(Section::Departments);
            in_table = true;
            continue;
        }
        if line == AREA_TOTALS {
            section = Some(Section::Areas);
            in_table = true;
            continue;
        }

        if let Some(heading) = FUNCTION_SECTIONS
            .iter()
            .find(|s| line == **s || line.strip_suffix(" Totals") == Some(**s))
        {
            department = Some(heading.to_string());
            section = Some(Section::Functions);
            in_table = true;
            continue;
        }

        if TABLE_HEADER_MARKERS.iter().any(|m| line.contains(m)) {
            continue;
        }

        let is_totals = line.contains("Totals");
        if in_table && !is_totals {
            let parts: Vec<&str> = REPORT_FIELD_SPLIT.split(line).collect();
            match section {
                Some(_) if parts.len() < 6 => {
                    let reason = format!("expected 6 fields, found {}", parts.len());
                    report.skipped_lines.push(SkippedLine::new(line, reason));
                }
                Some(Section::Departments) => report.departments.push(parse_table_row(&parts)),
                Some(Section::Areas) => match parts[0].split_once(" / ") {
                    Some((dept, area)) => {
                        let mut row = parse_table_row(&parts);
                        row.department = Some(dept.to_string());
                        row.name = area.to_string();
                        report.areas.push(LaborArea {
                            row,
                            full_name: parts[0].to_string(),
                        });
                    }
                    None if parts[0].contains('/') => {
                        let mut row = parse_table_row(&parts);
                        row.department = Some(parts[0].to_string());
                        report.areas.push(LaborArea {
                            row,
                            full_name: parts[0].to_string(),
                        });
                    }
                    None => report
                        .skipped_lines
                        .push(SkippedLine::new(line, "area row without 'Dept / Area' name")),
                },
                Some(Section::Functions) => {
                    if let Some(ref dept) = department {
                        let mut row = parse_table_row(&parts);
                        row.department = Some(dept.clone());
                        report.functions.push(row);
                    }
                }
                None => {}
            }
        }

        if is_totals {
            if section == Some(Section::Functions) {
                department = None;
            }
            in_table = false;
        }

        if line == "Summary" {
            section = None;
            department = None;
            in_table = false;
        }
    }

    tracing::debug!(
        departments = report.departments.len(),
        areas = report.areas.len(),
        functions = report.functions.len(),
        skipped = report.skipped_lines.len(),
        "parsed labor report"
    );
    report
}

/// Rows of a two-column "function, hours" listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HoursListing {
    pub rows: Vec<LaborRow>,
    pub skipped_lines: Vec<SkippedLine>,
}

/// Parse pasted "function name <tab or 2+ spaces> hours" lines. Extra
/// columns are ignored; lines without a numeric second field are skipped.
pub fn parse_hours_listing(text: &str) -> HoursListing {
    let mut listing = HoursListing::default();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let mut fields = HOURS_FIELD_SPLIT.split(line).map(str::trim);
        let name = fields.next().unwrap_or_default();
        let hours = fields.next().unwrap_or_default();

        if name.is_empty() || hours.is_empty() {
            listing
                .skipped_lines
                .push(SkippedLine::new(line, "expected name and hours"));
            continue;
        }
        match parse_decimal(hours) {
            Some(h) => listing.rows.push(LaborRow::hours_only(name, h)),
            None => listing
                .skipped_lines
                .push(SkippedLine::new(line, "hours not numeric")),
        }
    }

    listing
}
