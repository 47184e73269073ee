use crate::model::CellValue;
use chrono::{Days, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Date formats accepted for text cells, tried in order against the date
/// part of the value (anything after a space or `T` is ignored).
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d.%m.%Y"];

/// Largest serial day number Excel can represent (9999-12-31).
const EXCEL_MAX_SERIAL: f64 = 2_958_465.0;

/// Parse a numeric string leniently.
///
/// Handles formats like:
/// - "68" -> 68
/// - " 1,234.5 " -> 1234.5 (thousands separators are dropped)
/// - "1.5e3" -> 1500
///
/// Returns `None` for anything else; callers decide the fallback.
pub fn parse_decimal(s: &str) -> Option<Decimal> {
    let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

/// Numeric value of a cell, if it has one.
pub fn cell_decimal(cell: &CellValue) -> Option<Decimal> {
    match cell {
        CellValue::Number(n) => f64_to_decimal(*n),
        CellValue::Text(s) => parse_decimal(s),
        CellValue::Bool(_) | CellValue::Empty => None,
    }
}

/// Numeric value of a cell, or zero when it cannot be parsed.
pub fn coerce_decimal(cell: &CellValue) -> Decimal {
    cell_decimal(cell).unwrap_or(Decimal::ZERO)
}

/// Floor of the cell's numeric value, accepted only when positive.
pub fn item_number(cell: &CellValue) -> Option<i64> {
    let value = cell_decimal(cell)?.floor();
    if value <= Decimal::ZERO {
        return None;
    }
    value.to_i64()
}

/// Parse a cell as a calendar date.
///
/// Numbers are treated as Excel serial day numbers; text may be ISO
/// (`2024-03-05`) or US (`3/5/2024`), optionally followed by a time.
pub fn parse_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Number(n) => excel_serial_to_date(*n),
        CellValue::Text(s) => parse_date_str(s),
        _ => None,
    }
}

pub fn parse_date_str(s: &str) -> Option<NaiveDate> {
    let date_part = s.trim().split([' ', 'T']).next()?;
    if date_part.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > EXCEL_MAX_SERIAL {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(Days::new(serial.floor() as u64))
}

/// Spreadsheet float to decimal via its shortest display form, so a cell
/// showing 0.0035 stays 0.0035.
pub fn f64_to_decimal(f: f64) -> Option<Decimal> {
    if !f.is_finite() {
        return None;
    }
    let s = format!("{f}");
    s.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::try_from(f).ok())
}

/// Render a decimal the way a spreadsheet would show a plain number:
/// no trailing zeros, no exponent.
pub fn decimal_key(d: Decimal) -> String {
    d.normalize().to_string()
}
