//! End-to-end tests for the page pipelines.
//!
//! Uses a MockSource that hands back pre-built rows, so no workbook is
//! read from disk.

use ibops_core::aggregate::{percent_change, Aggregator, PercentChange, TimeUnit};
use ibops_core::classify::classify;
use ibops_core::diagnostics::IssueKind;
use ibops_core::error::IbopsError;
use ibops_core::extraction::{JsonRowsReader, RowSource};
use ibops_core::item_master::{ItemMaster, ItemMasterRecord};
use ibops_core::model::{CellValue, RawRow};
use ibops_core::parsing::normalize::{normalize, FieldMap};
use ibops_core::pipelines::air_ground::DateRange;
use ibops_core::pipelines::hours::analyze_hours;
use ibops_core::pipelines::ppa::VolumeSection;
use ibops_core::pipelines::snapshot::{LaborSection, TransactionSection};
use ibops_core::session::AnalysisSession;
use ibops_core::{
    analyze_air_ground_file, analyze_ppa_file, analyze_snapshot_inputs, compare_air_ground_file,
};
use rust_decimal_macros::dec;

struct MockSource {
    rows: Vec<RawRow>,
}

impl RowSource for MockSource {
    fn read_rows(&self, _bytes: &[u8]) -> Result<Vec<RawRow>, IbopsError> {
        Ok(self.rows.clone())
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

fn row(cells: &[(&str, CellValue)]) -> RawRow {
    cells
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn ppa_row(lp: &str, location: &str) -> RawRow {
    row(&[("LP", lp.into()), ("Location ID", location.into())])
}

fn ppa_item_row(lp: &str, location: &str, item: f64, quantity: f64) -> RawRow {
    row(&[
        ("LP", lp.into()),
        ("Location ID", location.into()),
        ("Item Number", item.into()),
        ("Quantity", quantity.into()),
    ])
}

fn item_master() -> ItemMaster {
    ItemMaster::from_records(vec![
        ItemMasterRecord {
            item_number: CellValue::Number(1001.0),
            cubic_vol: CellValue::Number(10.0),
        },
        ItemMasterRecord {
            item_number: CellValue::Number(2002.0),
            cubic_vol: CellValue::Number(1.0),
        },
    ])
}

fn session_with_master() -> AnalysisSession {
    AnalysisSession::with_builtin_rules()
        .unwrap()
        .with_item_master(item_master())
}

fn eligible_lps(section: &VolumeSection) -> Vec<String> {
    match section {
        VolumeSection::Available(v) => v.eligible.iter().map(|r| r.identifier.clone()).collect(),
        VolumeSection::Unavailable { reason } => panic!("volume unavailable: {reason}"),
    }
}

// ---------------------------------------------------------------------------
// PPA: one LP per path, counted once
// ---------------------------------------------------------------------------
#[test]
fn ppa_counts_unique_plates_per_path() {
    let source = MockSource {
        rows: vec![
            ppa_row("L1", "IB-QA-INSPECT"),
            ppa_row("L1", "REC6701"),
            ppa_row("L2", "IBCARTNORTH01"),
        ],
    };
    let session = AnalysisSession::with_builtin_rules().unwrap();

    let report = analyze_ppa_file(&[], &source, &session).unwrap();

    let count = |name: &str| {
        report
            .categories
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.count)
            .unwrap()
    };
    assert_eq!(count("vas"), 1);
    assert_eq!(count("reach"), 1);
    assert_eq!(count("cart"), 1);
    assert_eq!(report.total_unique, 3);
}

// ---------------------------------------------------------------------------
// PPA: reach move under the threshold is cart-eligible
// ---------------------------------------------------------------------------
#[test]
fn ppa_reach_row_under_threshold_is_small_volume() {
    let source = MockSource {
        rows: vec![ppa_item_row("L5", "REC6701", 1001.0, 100.0)],
    };

    let report = analyze_ppa_file(&[], &source, &session_with_master()).unwrap();

    let VolumeSection::Available(volume) = &report.volume else {
        panic!("volume section should be available");
    };
    assert_eq!(volume.eligible.len(), 1);
    assert_eq!(volume.eligible[0].total_volume, dec!(1000));
    assert_eq!(volume.small_volume_pct, dec!(100));
}

// ---------------------------------------------------------------------------
// PPA: a cart LP never shows up as small-volume
// ---------------------------------------------------------------------------
#[test]
fn cart_plates_excluded_from_small_volume() {
    let source = MockSource {
        rows: vec![
            ppa_item_row("L7", "REC6701", 1001.0, 1.0),
            ppa_row("L7", "IBCARTNORTH01"),
            ppa_item_row("L8", "REC6701", 1001.0, 1.0),
        ],
    };

    let report = analyze_ppa_file(&[], &source, &session_with_master()).unwrap();

    assert_eq!(eligible_lps(&report.volume), vec!["L8"]);
}

// ---------------------------------------------------------------------------
// Volume threshold is strict
// ---------------------------------------------------------------------------
#[test]
fn volume_threshold_is_strict() {
    let source = MockSource {
        rows: vec![
            ppa_item_row("AT", "REC6701", 2002.0, 5000.0),
            ppa_item_row("UNDER", "REC6701", 2002.0, 4999.999),
            ppa_item_row("OVER", "REC6701", 2002.0, 5000.001),
        ],
    };

    let report = analyze_ppa_file(&[], &source, &session_with_master()).unwrap();

    assert_eq!(eligible_lps(&report.volume), vec!["UNDER"]);
}

// ---------------------------------------------------------------------------
// Air vs Ground: segment rule applies to malformed locations too
// ---------------------------------------------------------------------------
#[test]
fn air_ground_segment_rule() {
    let tx = |location: &str| {
        row(&[
            ("To Location", location.into()),
            ("Time to Execute", 60.0.into()),
        ])
    };
    let source = MockSource {
        rows: vec![tx("12-34-A56"), tx("12-34-X56"), tx("BADFORMAT")],
    };
    let session = AnalysisSession::with_builtin_rules().unwrap();

    let report = analyze_air_ground_file(&[], &source, &session).unwrap();

    assert_eq!(report.metrics.ground_count, 1);
    assert_eq!(report.metrics.air_count, 2);
    assert_eq!(report.metrics.mod_transactions, 2);
    assert_eq!(report.metrics.avg_air_minutes, dec!(1));
}

#[test]
fn air_ground_comparison_rejects_reversed_period() {
    let source = MockSource {
        rows: vec![row(&[
            ("Start Date", "2024-05-01".into()),
            ("To Location", "12-34-X56".into()),
        ])],
    };
    let session = AnalysisSession::with_builtin_rules().unwrap();
    let d = |day| chrono::NaiveDate::from_ymd_opt(2024, 5, day).unwrap();

    let err = compare_air_ground_file(
        &[],
        &source,
        &session,
        DateRange::new(d(3), d(1)),
        DateRange::new(d(1), d(2)),
    )
    .unwrap_err();

    assert!(matches!(err, IbopsError::InvalidPeriod { .. }));
}

// ---------------------------------------------------------------------------
// Hours: uncategorized functions lower coverage
// ---------------------------------------------------------------------------
#[test]
fn labor_coverage_with_uncategorized_function() {
    let session = AnalysisSession::with_builtin_rules().unwrap();

    let report = analyze_hours("Reach-Truck Putaway\t10\nMystery Function\t2\n", &session).unwrap();

    assert_eq!(report.breakdown.direct_hours, dec!(10));
    assert_eq!(report.breakdown.uncategorized.len(), 1);
    assert_eq!(report.breakdown.uncategorized[0].name, "Mystery Function");
    assert_eq!(report.breakdown.uncategorized[0].hours, dec!(2));
    assert_eq!(report.breakdown.coverage_pct.round_dp(1), dec!(83.3));
}

// ---------------------------------------------------------------------------
// Snapshot from JSON rows and a pasted labor report
// ---------------------------------------------------------------------------
#[test]
fn snapshot_from_json_rows_and_labor_text() {
    let json = br#"[
        {"Transaction Type": "152", "To Location": "12-34-A01", "Quantity": 20},
        {"Transaction Type": "152", "To Location": "12-34-A02", "Quantity": 10},
        {"Transaction Type": "151", "To Location": "DOCK01", "Quantity": 30}
    ]"#;
    let labor = "Labor Department Totals\n\
                 Labor Department\tTotal Hours\tTotal Units\tUPH\tTotal Transactions\tTPH\n\
                 Inbound\t2\t30\t15\t2\t1\n\
                 Totals\t2\t30\t15\t2\t1\n";
    let session = AnalysisSession::with_builtin_rules().unwrap();

    let report = analyze_snapshot_inputs(
        Some((json.as_slice(), &JsonRowsReader as &dyn RowSource)),
        Some(labor),
        &session,
    )
    .unwrap();

    let combined = report.combined.unwrap();
    assert_eq!(combined.tplh, dec!(1));
    assert_eq!(combined.tph, dec!(15));
    assert_eq!(combined.upt, dec!(15));
    assert_eq!(combined.efficiency_variance_pct, Some(dec!(0)));
    assert_eq!(report.assessment.anomalies.len(), 1);
    let titles: Vec<&str> = report
        .assessment
        .insights
        .iter()
        .map(|i| i.title.as_str())
        .collect();
    assert!(titles.contains(&"Low TPLH Performance"));
    assert!(titles.contains(&"More Puts Than Receipts"));
}

#[test]
fn snapshot_keeps_labor_when_transactions_are_unusable() {
    let json = br#"[{"Transaction Type": "152", "Quantity": 20}]"#;
    let labor = "Labor Department Totals\n\
                 Labor Department\tTotal Hours\tTotal Units\tUPH\tTotal Transactions\tTPH\n\
                 Inbound\t2\t30\t15\t2\t1\n\
                 Totals\t2\t30\t15\t2\t1\n";
    let session = AnalysisSession::with_builtin_rules().unwrap();

    let report = analyze_snapshot_inputs(
        Some((json.as_slice(), &JsonRowsReader as &dyn RowSource)),
        Some(labor),
        &session,
    )
    .unwrap();

    assert!(matches!(
        report.transactions,
        Some(TransactionSection::InsufficientData { .. })
    ));
    let kpis = report.labor.as_ref().and_then(LaborSection::kpis).unwrap();
    assert_eq!(kpis.hours(), dec!(2));
    assert!(report.combined.is_none());
}

#[test]
fn ppa_oversized_volume_is_a_row_issue() {
    let source = MockSource {
        rows: vec![
            ppa_item_row("L1", "REC6701", 3003.0, 1e15),
            ppa_item_row("L2", "REC6701", 1001.0, 100.0),
        ],
    };
    let session = AnalysisSession::with_builtin_rules()
        .unwrap()
        .with_item_master(ItemMaster::from_records(vec![
            ItemMasterRecord {
                item_number: CellValue::Number(3003.0),
                cubic_vol: CellValue::Number(1e15),
            },
            ItemMasterRecord {
                item_number: CellValue::Number(1001.0),
                cubic_vol: CellValue::Number(10.0),
            },
        ]));

    let report = analyze_ppa_file(&[], &source, &session).unwrap();

    assert_eq!(eligible_lps(&report.volume), vec!["L2"]);
    assert!(report
        .diagnostics
        .row_issues
        .iter()
        .any(|i| i.identifier == "L1" && i.kind == IssueKind::VolumeOverflow));
}

// ---------------------------------------------------------------------------
// Engine properties
// ---------------------------------------------------------------------------
#[test]
fn classification_is_idempotent() {
    let session = AnalysisSession::with_builtin_rules().unwrap();
    let normalized = normalize(&ppa_row("L1", "REC6701"), &FieldMap::ppa(), 0).unwrap();

    let first = classify(&normalized, session.ppa_rules());
    let second = classify(&normalized, session.ppa_rules());

    assert_eq!(first, second);
    assert!(first.contains("reach"));
}

#[test]
fn repeated_plate_counted_once() {
    let source = MockSource {
        rows: (0..5).map(|_| ppa_row("L1", "REC6701")).collect(),
    };
    let session = AnalysisSession::with_builtin_rules().unwrap();

    let report = analyze_ppa_file(&[], &source, &session).unwrap();

    assert_eq!(report.aggregate.count("reach"), 1);
    assert_eq!(report.aggregate.sums("reach").transactions, 5);
}

#[test]
fn empty_aggregation_is_all_zero() {
    let session = AnalysisSession::with_builtin_rules().unwrap();

    let result = Aggregator::for_ruleset(session.ppa_rules(), TimeUnit::Hours).finalize();

    assert_eq!(result.rows, 0);
    assert!(result.category_counts.values().all(|c| *c == 0));
    assert_eq!(result.rate("reach", "units_per_hour"), dec!(0));
    assert_eq!(result.rate("reach", "avg_time"), dec!(0));
}

#[test]
fn percent_change_sentinels() {
    assert_eq!(percent_change(dec!(0), dec!(0)), PercentChange::Change(dec!(0)));
    assert_eq!(percent_change(dec!(0), dec!(5)), PercentChange::Unbounded);
    assert_eq!(percent_change(dec!(100), dec!(150)), PercentChange::Change(dec!(50)));
}

#[test]
fn rows_without_location_are_no_usable_rows() {
    let source = MockSource {
        rows: vec![row(&[("LP", "L1".into())])],
    };
    let session = AnalysisSession::with_builtin_rules().unwrap();

    let err = analyze_ppa_file(&[], &source, &session).unwrap_err();

    assert!(matches!(err, IbopsError::NoUsableRows(_)));
}
