//! PPA location check: unique license plates per put-away path, plus the
//! reach-truck movements small enough to have gone by cart.

use rust_decimal::Decimal;
use serde::Serialize;

use super::{classify_rows, fold_rows, volume_pass};
use crate::aggregate::{percent, AggregateResult, TimeUnit};
use crate::diagnostics::Diagnostics;
use crate::error::IbopsError;
use crate::model::RawRow;
use crate::parsing::normalize::FieldMap;
use crate::session::AnalysisSession;
use crate::volume::{VolumeDecision, VolumeReclassifier};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PpaCategory {
    pub name: String,
    pub label: String,
    /// Distinct license plates.
    pub count: usize,
    /// Share of the summed category counts.
    pub share_pct: Decimal,
}

/// A movement row that would fit on a cart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligibleRow {
    pub index: usize,
    pub identifier: String,
    pub item: String,
    pub quantity: Decimal,
    pub cubic_volume: Decimal,
    pub total_volume: Decimal,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmallVolumeAnalysis {
    pub movement: String,
    pub priority: Option<String>,
    /// Movement rows not rejected for a missing item or bad quantity.
    pub movement_rows: usize,
    /// Of those, rows whose identifier is in the priority category.
    pub excluded_rows: usize,
    /// Rows considered: usable and not excluded, resolved or not.
    pub candidates: usize,
    pub eligible: Vec<EligibleRow>,
    /// `eligible / candidates * 100`.
    pub small_volume_pct: Decimal,
}

impl SmallVolumeAnalysis {
    pub fn eligible_count(&self) -> usize {
        self.eligible.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VolumeSection {
    Available(SmallVolumeAnalysis),
    Unavailable { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PpaReport {
    pub ruleset: String,
    pub rows_read: usize,
    pub categories: Vec<PpaCategory>,
    /// Sum of the category counts.
    pub total_unique: usize,
    pub volume: VolumeSection,
    pub aggregate: AggregateResult,
    pub diagnostics: Diagnostics,
}

pub fn analyze_ppa(raw_rows: &[RawRow], session: &AnalysisSession) -> Result<PpaReport, IbopsError> {
    let ruleset = session.ppa_rules();
    let classified = classify_rows(raw_rows, &FieldMap::ppa(), ruleset)?;
    let aggregate = fold_rows(&classified, ruleset, TimeUnit::Hours);
    let mut diagnostics = classified.diagnostics.clone();

    let categories: Vec<PpaCategory> = ruleset
        .categories
        .iter()
        .map(|c| PpaCategory {
            name: c.name.clone(),
            label: c.label.clone(),
            count: aggregate.count(&c.name),
            share_pct: aggregate.rate(&c.name, "count_share_pct"),
        })
        .collect();
    let total_unique = categories.iter().map(|c| c.count).sum();

    let volume = match (ruleset.volume.as_ref(), session.item_master()) {
        (None, _) => VolumeSection::Unavailable {
            reason: format!("rule set '{}' has no volume rule", ruleset.name),
        },
        (Some(_), None) => VolumeSection::Unavailable {
            reason: "item master not loaded".into(),
        },
        (Some(rule), Some(master)) => {
            let reclassifier = VolumeReclassifier::from_rule(master, rule);
            let decisions = volume_pass(
                &classified,
                &reclassifier,
                &aggregate.exclusion_sets,
                &mut diagnostics,
            );

            let usable = decisions
                .iter()
                .filter(|d| !matches!(d.decision, VolumeDecision::Unusable(_)))
                .count();
            let excluded_rows = decisions
                .iter()
                .filter(|d| matches!(d.decision, VolumeDecision::Excluded))
                .count();
            let candidates = decisions
                .iter()
                .filter(|d| d.decision.counts_as_candidate())
                .count();
            let eligible: Vec<EligibleRow> = decisions
                .iter()
                .filter_map(|d| match &d.decision {
                    VolumeDecision::Measured(m) if m.eligible => Some(EligibleRow {
                        index: d.row.index,
                        identifier: d.row.identifier.clone(),
                        item: d.row.item.as_ref().map(|i| i.raw.to_string()).unwrap_or_default(),
                        quantity: m.quantity,
                        cubic_volume: m.cubic_volume,
                        total_volume: m.total_volume,
                        location: d.row.location.clone(),
                    }),
                    _ => None,
                })
                .collect();

            VolumeSection::Available(SmallVolumeAnalysis {
                movement: rule.movement.clone(),
                priority: rule.priority.clone(),
                movement_rows: usable,
                excluded_rows,
                candidates,
                small_volume_pct: percent(
                    Decimal::from(eligible.len()),
                    Decimal::from(candidates),
                ),
                eligible,
            })
        }
    };

    tracing::info!(
        rows = classified.len(),
        total_unique,
        diagnostics = %diagnostics.summary(),
        "ppa analysis finished"
    );

    Ok(PpaReport {
        ruleset: ruleset.name.clone(),
        rows_read: raw_rows.len(),
        categories,
        total_unique,
        volume,
        aggregate,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item_master::{ItemMaster, ItemMasterRecord};
    use crate::model::CellValue;
    use rust_decimal_macros::dec;

    fn raw(lp: &str, location: &str) -> RawRow {
        RawRow::from([
            ("LP".to_string(), CellValue::from(lp)),
            ("Location ID".to_string(), CellValue::from(location)),
        ])
    }

    fn raw_item(lp: &str, location: &str, item: f64, quantity: f64) -> RawRow {
        let mut row = raw(lp, location);
        row.insert("Item Number".into(), CellValue::Number(item));
        row.insert("Quantity".into(), CellValue::Number(quantity));
        row
    }

    fn master() -> ItemMaster {
        ItemMaster::from_records(vec![
            ItemMasterRecord {
                item_number: CellValue::Number(1001.0),
                cubic_vol: CellValue::Number(10.0),
            },
            ItemMasterRecord {
                item_number: CellValue::Number(2002.0),
                cubic_vol: CellValue::Number(100.0),
            },
        ])
    }

    fn session_with_master() -> AnalysisSession {
        AnalysisSession::with_builtin_rules()
            .unwrap()
            .with_item_master(master())
    }

    fn count(report: &PpaReport, name: &str) -> usize {
        report
            .categories
            .iter()
            .find(|c| c.name == name)
            .map_or(0, |c| c.count)
    }

    #[test]
    fn test_unique_license_plates_per_path() {
        let rows = vec![
            raw("L1", "IB-QA-INSPECT"),
            raw("L1", "REC6701"),
            raw("L2", "IBCARTNORTH01"),
        ];
        let report = analyze_ppa(&rows, &AnalysisSession::with_builtin_rules().unwrap()).unwrap();
        assert_eq!(count(&report, "vas"), 1);
        assert_eq!(count(&report, "reach"), 1);
        assert_eq!(count(&report, "cart"), 1);
        assert_eq!(report.total_unique, 3);
        assert_eq!(report.categories[0].share_pct.round_dp(1), dec!(33.3));
    }

    #[test]
    fn test_volume_unavailable_without_item_master() {
        let rows = vec![raw_item("L5", "REC6701", 1001.0, 100.0)];
        let report = analyze_ppa(&rows, &AnalysisSession::with_builtin_rules().unwrap()).unwrap();
        assert!(matches!(report.volume, VolumeSection::Unavailable { .. }));
    }

    #[test]
    fn test_small_volume_reach_row() {
        let rows = vec![raw_item("L5", "REC6701", 1001.0, 100.0)];
        let report = analyze_ppa(&rows, &session_with_master()).unwrap();
        let VolumeSection::Available(volume) = report.volume else {
            panic!("volume section should be available");
        };
        assert_eq!(volume.candidates, 1);
        assert_eq!(volume.eligible_count(), 1);
        assert_eq!(volume.eligible[0].total_volume, dec!(1000));
        assert_eq!(volume.small_volume_pct, dec!(100));
    }

    #[test]
    fn test_cart_plate_never_small_volume_even_when_seen_later() {
        let rows = vec![
            raw_item("L7", "REC6701", 1001.0, 1.0),
            raw_item("L8", "REC6701", 2002.0, 100.0),
            raw("L7", "IBCARTSOUTH05"),
        ];
        let report = analyze_ppa(&rows, &session_with_master()).unwrap();
        let VolumeSection::Available(volume) = report.volume else {
            panic!("volume section should be available");
        };
        assert_eq!(volume.movement_rows, 2);
        assert_eq!(volume.excluded_rows, 1);
        assert_eq!(volume.candidates, 1);
        // L8: 100 * 100 = 10000, not eligible
        assert!(volume.eligible.is_empty());
        assert_eq!(volume.small_volume_pct, dec!(0));
    }

    #[test]
    fn test_unknown_item_counts_as_candidate_and_is_reported() {
        let rows = vec![
            raw_item("L1", "REC6701", 1001.0, 2.0),
            raw_item("L2", "REC7401", 9999.0, 2.0),
            raw("L3", "REC6701"),
        ];
        let report = analyze_ppa(&rows, &session_with_master()).unwrap();
        let VolumeSection::Available(volume) = &report.volume else {
            panic!("volume section should be available");
        };
        assert_eq!(volume.candidates, 2);
        assert_eq!(volume.small_volume_pct, dec!(50));
        assert_eq!(report.diagnostics.items_not_found(), 1);
        assert_eq!(report.diagnostics.row_issues.len(), 1);
        // the unusable row still counts as a reach plate
        assert_eq!(count(&report, "reach"), 3);
    }
}
