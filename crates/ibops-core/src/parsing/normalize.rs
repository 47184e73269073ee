use crate::diagnostics::SkippedRow;
use crate::model::{CellValue, ItemRef, NormalizedRow, RawRow};
use crate::parsing::values::{coerce_decimal, decimal_key, item_number, parse_date, parse_decimal};
use serde::{Deserialize, Serialize};

/// Where a row's identity comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "columns")]
pub enum IdentifierSource {
    /// First non-blank value among these columns (e.g. the license plate).
    Columns(Vec<String>),
    /// Synthesized from the row position; every row is distinct.
    RowIndex,
}

/// Declarative mapping from spreadsheet columns to normalized fields.
///
/// Each field lists candidate column names; the first candidate holding a
/// non-blank value wins, so exports with renamed or letter-named columns
/// still map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMap {
    pub identifier: IdentifierSource,
    pub location: Vec<String>,
    #[serde(default)]
    pub quantity: Vec<String>,
    #[serde(default)]
    pub item: Vec<String>,
    /// Elapsed time in seconds.
    #[serde(default)]
    pub elapsed_seconds: Vec<String>,
    #[serde(default)]
    pub transaction_type: Vec<String>,
    #[serde(default)]
    pub from_location: Vec<String>,
    #[serde(default)]
    pub date: Vec<String>,
    #[serde(default)]
    pub user: Vec<String>,
}

fn cols(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl FieldMap {
    /// PPA location export: one row per license plate movement.
    pub fn ppa() -> Self {
        Self {
            identifier: IdentifierSource::Columns(cols(&["LP"])),
            location: cols(&["Location ID"]),
            quantity: cols(&["Quantity", "D"]),
            item: cols(&["Item Number", "C"]),
            elapsed_seconds: Vec::new(),
            transaction_type: Vec::new(),
            from_location: Vec::new(),
            date: Vec::new(),
            user: Vec::new(),
        }
    }

    /// Put-away transaction export used for the Air vs Ground split.
    pub fn air_ground() -> Self {
        Self {
            identifier: IdentifierSource::RowIndex,
            location: cols(&["To Location"]),
            quantity: cols(&["Quantity"]),
            item: cols(&["Item Number"]),
            elapsed_seconds: cols(&["Time to Execute"]),
            transaction_type: cols(&["Transaction Type"]),
            from_location: cols(&["From Location"]),
            date: cols(&["Start Date", "Date"]),
            user: cols(&["Employee ID", "User"]),
        }
    }

    /// Full transaction history export used by the snapshot view.
    pub fn transactions() -> Self {
        Self {
            identifier: IdentifierSource::RowIndex,
            location: cols(&["To Location", "From Location", "Location ID", "Location"]),
            quantity: cols(&["Quantity"]),
            item: cols(&["Item Number"]),
            elapsed_seconds: cols(&["Time to Execute"]),
            transaction_type: cols(&["Transaction Type"]),
            from_location: cols(&["From Location"]),
            date: cols(&["Start Date", "Date"]),
            user: cols(&["User", "Username", "User ID", "Employee ID"]),
        }
    }
}

/// First non-blank cell among the candidate columns.
fn pick<'a>(raw: &'a RawRow, candidates: &[String]) -> Option<&'a CellValue> {
    candidates
        .iter()
        .filter_map(|c| raw.get(c))
        .find(|v| !v.is_blank())
}

fn pick_text(raw: &RawRow, candidates: &[String]) -> Option<String> {
    pick(raw, candidates).map(|v| v.to_string().trim().to_string())
}

/// Transaction codes are compared as text; "152.0" and "152" are the same
/// code.
fn pick_code(raw: &RawRow, candidates: &[String]) -> Option<String> {
    let text = pick_text(raw, candidates)?;
    Some(match parse_decimal(&text) {
        Some(d) if d.fract().is_zero() => decimal_key(d),
        _ => text,
    })
}

/// Normalize a raw row, returning `None` when the row has no identifier or
/// no location.
pub fn normalize(raw: &RawRow, map: &FieldMap, index: usize) -> Option<NormalizedRow> {
    normalize_checked(raw, map, index).ok()
}

/// Normalize a raw row, or explain why it was dropped.
pub fn normalize_checked(
    raw: &RawRow,
    map: &FieldMap,
    index: usize,
) -> Result<NormalizedRow, SkippedRow> {
    let identifier = match &map.identifier {
        IdentifierSource::Columns(columns) => pick_text(raw, columns).unwrap_or_default(),
        IdentifierSource::RowIndex => format!("row-{}", index + 1),
    };
    if identifier.is_empty() {
        return Err(SkippedRow::new(index, "missing identifier"));
    }

    let location = pick_text(raw, &map.location)
        .unwrap_or_default()
        .to_uppercase();
    if location.is_empty() {
        return Err(SkippedRow::new(index, "missing location"));
    }

    let item = pick(raw, &map.item).map(|cell| ItemRef {
        raw: cell.clone(),
        number: item_number(cell),
    });

    Ok(NormalizedRow {
        index,
        identifier,
        location,
        quantity: pick(raw, &map.quantity)
            .map(coerce_decimal)
            .unwrap_or_default(),
        item,
        elapsed_seconds: pick(raw, &map.elapsed_seconds)
            .map(coerce_decimal)
            .unwrap_or_default(),
        transaction_type: pick_code(raw, &map.transaction_type),
        from_location: pick_text(raw, &map.from_location).map(|s| s.to_uppercase()),
        date: pick(raw, &map.date).and_then(parse_date),
        user: pick_text(raw, &map.user),
    })
}

/// Rows that survived normalization plus the ones that did not.
#[derive(Debug, Clone, Default)]
pub struct NormalizedRows {
    pub rows: Vec<NormalizedRow>,
    pub skipped: Vec<SkippedRow>,
}

/// Normalize every row in input order.
pub fn normalize_all(raw_rows: &[RawRow], map: &FieldMap) -> NormalizedRows {
    let mut out = NormalizedRows::default();
    for (index, raw) in raw_rows.iter().enumerate() {
        match normalize_checked(raw, map, index) {
            Ok(row) => out.rows.push(row),
            Err(skip) => out.skipped.push(skip),
        }
    }
    if !out.skipped.is_empty() {
        tracing::warn!(
            kept = out.rows.len(),
            skipped = out.skipped.len(),
            "dropped rows without identifier or location"
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn raw(pairs: &[(&str, CellValue)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_location_uppercased_identifier_kept() {
        let row = raw(&[
            ("LP", CellValue::from("  lp-001 ")),
            ("Location ID", CellValue::from(" rec6701 ")),
            ("Quantity", CellValue::Number(4.0)),
        ]);
        let n = normalize(&row, &FieldMap::ppa(), 0).unwrap();
        assert_eq!(n.identifier, "lp-001");
        assert_eq!(n.location, "REC6701");
        assert_eq!(n.quantity, dec!(4));
    }

    #[test]
    fn test_empty_location_dropped() {
        let row = raw(&[("LP", CellValue::from("L1")), ("Location ID", CellValue::from("  "))]);
        assert!(normalize(&row, &FieldMap::ppa(), 0).is_none());
        let err = normalize_checked(&row, &FieldMap::ppa(), 3).unwrap_err();
        assert_eq!(err.index, 3);
        assert_eq!(err.reason, "missing location");
    }

    #[test]
    fn test_transaction_code_canonical() {
        let code = |cell: CellValue| {
            let row = raw(&[("To Location", CellValue::from("DOCK1")), ("Transaction Type", cell)]);
            normalize(&row, &FieldMap::transactions(), 0)
                .unwrap()
                .transaction_type
        };
        assert_eq!(code(CellValue::from("152.0")), Some("152".into()));
        assert_eq!(code(CellValue::from(" 152 ")), Some("152".into()));
        assert_eq!(code(CellValue::Number(212.0)), Some("212".into()));
        assert_eq!(code(CellValue::from("PUT")), Some("PUT".into()));
    }

    #[test]
    fn test_empty_identifier_dropped() {
        let row = raw(&[("Location ID", CellValue::from("REC6701"))]);
        assert!(normalize(&row, &FieldMap::ppa(), 0).is_none());
    }

    #[test]
    fn test_bad_quantity_is_zero_not_error() {
        let row = raw(&[
            ("LP", CellValue::from("L1")),
            ("Location ID", CellValue::from("REC6701")),
            ("Quantity", CellValue::from("lots")),
        ]);
        let n = normalize(&row, &FieldMap::ppa(), 0).unwrap();
        assert_eq!(n.quantity, dec!(0));
    }

    #[test]
    fn test_fallback_columns() {
        let row = raw(&[
            ("LP", CellValue::from("L1")),
            ("Location ID", CellValue::from("REC6701")),
            ("Item Number", CellValue::from("")),
            ("C", CellValue::Number(1001.0)),
            ("D", CellValue::Number(12.0)),
        ]);
        let n = normalize(&row, &FieldMap::ppa(), 0).unwrap();
        assert_eq!(n.item_number(), Some(1001));
        assert_eq!(n.quantity, dec!(12));
    }

    #[test]
    fn test_non_numeric_item_marks_item_unusable_only() {
        let row = raw(&[
            ("LP", CellValue::from("L1")),
            ("Location ID", CellValue::from("REC6701")),
            ("Item Number", CellValue::from("N/A")),
        ]);
        let n = normalize(&row, &FieldMap::ppa(), 0).unwrap();
        assert!(n.item.is_some());
        assert_eq!(n.item_number(), None);
    }

    #[test]
    fn test_row_index_identifier() {
        let row = raw(&[("To Location", CellValue::from("12-34-A56"))]);
        let n = normalize(&row, &FieldMap::air_ground(), 4).unwrap();
        assert_eq!(n.identifier, "row-5");
    }

    #[test]
    fn test_transaction_type_from_number() {
        let row = raw(&[
            ("To Location", CellValue::from("P-1")),
            ("Transaction Type", CellValue::Number(152.0)),
            ("From Location", CellValue::from("movexx01")),
        ]);
        let n = normalize(&row, &FieldMap::transactions(), 0).unwrap();
        assert_eq!(n.transaction_type.as_deref(), Some("152"));
        assert_eq!(n.from_location.as_deref(), Some("MOVEXX01"));
    }
}
