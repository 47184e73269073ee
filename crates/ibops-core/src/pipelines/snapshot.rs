//! Inbound snapshot: transaction-history KPIs joined with a pasted labor
//! report, plus VAS and cart productivity detail.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::Serialize;

use super::{classify_rows, ClassifiedRows};
use crate::aggregate::{percent, ratio, total};
use crate::diagnostics::Diagnostics;
use crate::error::IbopsError;
use crate::insights::{assess, Assessment};
use crate::labor::LaborBreakdown;
use crate::model::RawRow;
use crate::parsing::labor::{LaborArea, LaborReport, LaborRow};
use crate::parsing::normalize::FieldMap;
use crate::rules::schema::TargetsDef;
use crate::session::AnalysisSession;

pub const RECEIPT: &str = "receipt";
pub const INBOUND_PUT: &str = "inbound_put";
pub const VAS: &str = "vas";
pub const CART: &str = "cart";

const INBOUND_AREA_KEYWORDS: [&str; 4] = ["inbound", "receiving", "putaway", "vas"];
const RETURNS_KEYWORDS: [&str; 2] = ["return", "cret"];
const SECONDS_PER_HOUR: Decimal = Decimal::from_parts(3600, 0, 0, false, 0);
/// Receipt and put counts within 5% of each other are balanced.
const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

const UNKNOWN_LOCATION: &str = "Unknown";
const UNKNOWN_USER: &str = "Unknown User";

/// Type-152 (inbound put) totals from the transaction history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionKpis {
    pub total_rows: usize,
    pub put_transactions: usize,
    pub put_volume: Decimal,
    pub put_upt: Decimal,
    /// Share of 152 rows among all rows.
    pub put_share_pct: Decimal,
    pub receipt_transactions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransactionSection {
    Available(TransactionKpis),
    /// A transaction file was given but none of its rows were usable.
    InsufficientData { reason: String },
}

impl TransactionSection {
    pub fn kpis(&self) -> Option<&TransactionKpis> {
        match self {
            TransactionSection::Available(kpis) => Some(kpis),
            TransactionSection::InsufficientData { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InboundArea {
    #[serde(flatten)]
    pub area: LaborArea,
    /// Share of the inbound department's hours.
    pub hours_pct: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaborKpis {
    pub department: LaborRow,
    pub areas: Vec<InboundArea>,
    pub breakdown: LaborBreakdown,
}

impl LaborKpis {
    pub fn hours(&self) -> Decimal {
        self.department.hours
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LaborSection {
    Available(Box<LaborKpis>),
    InsufficientData { reason: String },
}

impl LaborSection {
    pub fn kpis(&self) -> Option<&LaborKpis> {
        match self {
            LaborSection::Available(kpis) => Some(kpis),
            LaborSection::InsufficientData { .. } => None,
        }
    }
}

/// Type-152 work measured against inbound labor hours.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedKpis {
    pub inbound_hours: Decimal,
    pub total_volume: Decimal,
    pub total_transactions: usize,
    /// Units per labor hour.
    pub tph: Decimal,
    /// Transactions per labor hour.
    pub tplh: Decimal,
    pub upt: Decimal,
    pub department_tph: Decimal,
    /// `(tplh - department_tph) / department_tph * 100`; `None` when the
    /// department reports no TPH.
    pub efficiency_variance_pct: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiptPutBalance {
    pub receipts: usize,
    pub puts: usize,
    /// Puts per receipt.
    pub ratio: Decimal,
    pub balanced: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetIndicator {
    AboveTarget,
    NearTarget,
    BelowTarget,
}

impl TargetIndicator {
    pub fn from_performance(pct: Decimal) -> Self {
        if pct >= Decimal::ONE_HUNDRED {
            TargetIndicator::AboveTarget
        } else if pct >= Decimal::from(90) {
            TargetIndicator::NearTarget
        } else {
            TargetIndicator::BelowTarget
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VasTask {
    pub location: String,
    pub units: Decimal,
    pub hours: Decimal,
    pub transactions: usize,
    pub actual_uph: Decimal,
    pub target_uph: Option<Decimal>,
    pub performance_pct: Option<Decimal>,
    /// Share of all VAS units.
    pub share_pct: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VasAnalysis {
    /// Largest by units first.
    pub tasks: Vec<VasTask>,
    pub total_units: Decimal,
    pub total_hours: Decimal,
    pub total_transactions: usize,
    pub actual_uph: Decimal,
    pub actual_tplh: Decimal,
    /// Units per hour the task mix should reach, over tasks with a target.
    pub suggested_uph: Decimal,
    pub expected_hours: Decimal,
    pub performance_pct: Decimal,
    /// Hours taken beyond the expected hours; negative is faster.
    pub time_variance_hours: Decimal,
    pub indicator: TargetIndicator,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartUser {
    pub user: String,
    pub units: Decimal,
    pub hours: Decimal,
    pub transactions: usize,
    pub uph: Decimal,
    pub tplh: Decimal,
    pub locations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartProductivity {
    /// Highest TPLH first.
    pub users: Vec<CartUser>,
    pub total_units: Decimal,
    pub total_hours: Decimal,
    pub total_transactions: usize,
    pub average_uph: Decimal,
    pub tplh: Decimal,
    pub target_tplh: Decimal,
    pub performance_pct: Decimal,
    pub variance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotReport {
    pub transactions: Option<TransactionSection>,
    pub labor: Option<LaborSection>,
    pub combined: Option<CombinedKpis>,
    pub balance: Option<ReceiptPutBalance>,
    pub vas: Option<VasAnalysis>,
    pub cart: Option<CartProductivity>,
    pub assessment: Assessment,
    pub diagnostics: Diagnostics,
}

/// Build the snapshot from whichever inputs are present. At least one is
/// required. A transaction file with no usable rows only fails the run when
/// there is no labor report to fall back on.
pub fn analyze_snapshot(
    transactions: Option<&[RawRow]>,
    labor: Option<&LaborReport>,
    session: &AnalysisSession,
) -> Result<SnapshotReport, IbopsError> {
    if transactions.is_none() && labor.is_none() {
        return Err(IbopsError::NoUsableRows(
            "snapshot needs a transaction history, a labor report or both".into(),
        ));
    }

    let mut unusable_transactions = None;
    let classified = match transactions
        .map(|rows| classify_rows(rows, &FieldMap::transactions(), session.transaction_rules()))
        .transpose()
    {
        Ok(classified) => classified,
        Err(IbopsError::NoUsableRows(reason)) if labor.is_some() => {
            tracing::warn!(%reason, "transaction history unusable, continuing with labor only");
            unusable_transactions = Some(TransactionSection::InsufficientData { reason });
            None
        }
        Err(e) => return Err(e),
    };

    let labor_section = labor.map(|report| labor_kpis(report, session));

    let transaction_kpis = classified.as_ref().map(transaction_kpis);
    let combined = match (&transaction_kpis, labor_section.as_ref().and_then(LaborSection::kpis)) {
        (Some(tx), Some(labor)) => Some(combined_kpis(tx, labor)),
        _ => None,
    };
    let balance = transaction_kpis.as_ref().and_then(receipt_put_balance);
    let vas = classified
        .as_ref()
        .and_then(|c| vas_analysis(c, session.targets()));
    let cart = classified
        .as_ref()
        .and_then(|c| cart_productivity(c, session.targets()));
    let diagnostics = classified
        .map(|c| c.diagnostics)
        .unwrap_or_default();

    let mut report = SnapshotReport {
        transactions: transaction_kpis
            .map(TransactionSection::Available)
            .or(unusable_transactions),
        labor: labor_section,
        combined,
        balance,
        vas,
        cart,
        assessment: Assessment::default(),
        diagnostics,
    };
    report.assessment = assess(&report);

    tracing::info!(
        transactions = report.transactions.as_ref().and_then(TransactionSection::kpis).is_some(),
        labor = report.labor.is_some(),
        insights = report.assessment.insights.len(),
        "snapshot finished"
    );
    Ok(report)
}

fn transaction_kpis(classified: &ClassifiedRows) -> TransactionKpis {
    let mut put_transactions = 0;
    let mut put_volume = Decimal::ZERO;
    let mut receipt_transactions = 0;

    for (row, cats) in classified.iter() {
        if cats.contains(INBOUND_PUT) {
            put_transactions += 1;
            put_volume = put_volume.saturating_add(row.quantity);
        }
        if cats.contains(RECEIPT) {
            receipt_transactions += 1;
        }
    }

    TransactionKpis {
        total_rows: classified.len(),
        put_transactions,
        put_volume,
        put_upt: ratio(put_volume, Decimal::from(put_transactions)),
        put_share_pct: percent(
            Decimal::from(put_transactions),
            Decimal::from(classified.len()),
        ),
        receipt_transactions,
    }
}

fn is_inbound_area(name: &str) -> bool {
    let name = name.to_lowercase();
    INBOUND_AREA_KEYWORDS.iter().any(|k| name.contains(k))
        && !RETURNS_KEYWORDS.iter().any(|k| name.contains(k))
}

fn labor_kpis(report: &LaborReport, session: &AnalysisSession) -> LaborSection {
    let Some(department) = report
        .departments
        .iter()
        .find(|d| d.name.to_lowercase().contains("inbound"))
    else {
        tracing::warn!(
            departments = report.departments.len(),
            "no inbound department in labor report"
        );
        return LaborSection::InsufficientData {
            reason: "no inbound department found".into(),
        };
    };

    let areas = report
        .areas
        .iter()
        .filter(|a| is_inbound_area(&a.row.name))
        .map(|a| InboundArea {
            area: a.clone(),
            hours_pct: percent(a.row.hours, department.hours),
        })
        .collect();

    let breakdown = session
        .snapshot_labor()
        .breakdown(&report.functions, Some(department.hours));

    LaborSection::Available(Box::new(LaborKpis {
        department: department.clone(),
        areas,
        breakdown,
    }))
}

fn combined_kpis(tx: &TransactionKpis, labor: &LaborKpis) -> CombinedKpis {
    let hours = labor.hours();
    let transactions = Decimal::from(tx.put_transactions);
    let tplh = ratio(transactions, hours);
    let department_tph = labor.department.tph;
    let efficiency_variance_pct = (!department_tph.is_zero() && tx.put_transactions > 0)
        .then(|| percent(tplh.saturating_sub(department_tph), department_tph));

    CombinedKpis {
        inbound_hours: hours,
        total_volume: tx.put_volume,
        total_transactions: tx.put_transactions,
        tph: ratio(tx.put_volume, hours),
        tplh,
        upt: tx.put_upt,
        department_tph,
        efficiency_variance_pct,
    }
}

fn receipt_put_balance(tx: &TransactionKpis) -> Option<ReceiptPutBalance> {
    let (receipts, puts) = (tx.receipt_transactions, tx.put_transactions);
    if receipts == 0 || puts == 0 {
        return None;
    }
    let gap = Decimal::from(receipts.abs_diff(puts));
    let larger = Decimal::from(receipts.max(puts));
    Some(ReceiptPutBalance {
        receipts,
        puts,
        ratio: ratio(Decimal::from(puts), Decimal::from(receipts)),
        balanced: ratio(gap, larger) < BALANCE_TOLERANCE,
    })
}

#[derive(Default)]
struct Tally {
    units: Decimal,
    hours: Decimal,
    transactions: usize,
    locations: BTreeSet<String>,
}

fn vas_analysis(classified: &ClassifiedRows, targets: &TargetsDef) -> Option<VasAnalysis> {
    let mut groups: BTreeMap<String, Tally> = BTreeMap::new();
    for (row, _) in classified.iter().filter(|(_, cats)| cats.contains(VAS)) {
        let location = row
            .from_location
            .clone()
            .unwrap_or_else(|| UNKNOWN_LOCATION.to_string());
        let t = groups.entry(location).or_default();
        t.units = t.units.saturating_add(row.quantity);
        t.hours = t.hours.saturating_add(row.elapsed_seconds / SECONDS_PER_HOUR);
        t.transactions += 1;
    }
    if groups.is_empty() {
        return None;
    }

    let total_units = total(groups.values().map(|t| t.units));
    let total_hours = total(groups.values().map(|t| t.hours));
    let total_transactions: usize = groups.values().map(|t| t.transactions).sum();

    let mut expected_hours = Decimal::ZERO;
    let mut known_units = Decimal::ZERO;
    let mut tasks: Vec<VasTask> = groups
        .into_iter()
        .map(|(location, t)| {
            let actual_uph = ratio(t.units, t.hours);
            let target_uph = targets
                .vas_target_uph
                .get(&location)
                .copied()
                .filter(|v| *v > Decimal::ZERO);
            if let Some(target) = target_uph {
                expected_hours = expected_hours.saturating_add(ratio(t.units, target));
                known_units = known_units.saturating_add(t.units);
            }
            VasTask {
                performance_pct: target_uph.map(|target| percent(actual_uph, target)),
                location,
                units: t.units,
                hours: t.hours,
                transactions: t.transactions,
                actual_uph,
                target_uph,
                share_pct: percent(t.units, total_units),
            }
        })
        .collect();
    tasks.sort_by(|a, b| b.units.cmp(&a.units));

    let actual_uph = ratio(total_units, total_hours);
    let suggested_uph = ratio(known_units, expected_hours);
    let performance_pct = percent(actual_uph, suggested_uph);

    Some(VasAnalysis {
        tasks,
        total_units,
        total_hours,
        total_transactions,
        actual_uph,
        actual_tplh: ratio(Decimal::from(total_transactions), total_hours),
        suggested_uph,
        expected_hours,
        performance_pct,
        time_variance_hours: total_hours.saturating_sub(expected_hours),
        indicator: TargetIndicator::from_performance(performance_pct),
    })
}

fn cart_productivity(classified: &ClassifiedRows, targets: &TargetsDef) -> Option<CartProductivity> {
    let mut users: BTreeMap<String, Tally> = BTreeMap::new();
    for (row, _) in classified.iter().filter(|(_, cats)| cats.contains(CART)) {
        let user = row.user.clone().unwrap_or_else(|| UNKNOWN_USER.to_string());
        let t = users.entry(user).or_default();
        t.units = t.units.saturating_add(row.quantity);
        t.hours = t.hours.saturating_add(row.elapsed_seconds / SECONDS_PER_HOUR);
        t.transactions += 1;
        t.locations.insert(
            row.from_location
                .clone()
                .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
        );
    }
    if users.is_empty() {
        return None;
    }

    let total_units = total(users.values().map(|t| t.units));
    let total_hours = total(users.values().map(|t| t.hours));
    let total_transactions: usize = users.values().map(|t| t.transactions).sum();

    let mut users: Vec<CartUser> = users
        .into_iter()
        .map(|(user, t)| CartUser {
            user,
            units: t.units,
            hours: t.hours,
            transactions: t.transactions,
            uph: ratio(t.units, t.hours),
            tplh: ratio(Decimal::from(t.transactions), t.hours),
            locations: t.locations.into_iter().collect(),
        })
        .collect();
    users.sort_by(|a, b| b.tplh.cmp(&a.tplh));

    let tplh = ratio(Decimal::from(total_transactions), total_hours);
    let target_tplh = targets.cart_target_tplh;

    Some(CartProductivity {
        users,
        total_units,
        total_hours,
        total_transactions,
        average_uph: ratio(total_units, total_hours),
        tplh,
        target_tplh,
        performance_pct: percent(tplh, target_tplh),
        variance: tplh.saturating_sub(target_tplh),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellValue;
    use crate::parsing::labor::parse_labor_report;
    use rust_decimal_macros::dec;

    fn tx(kind: &str, from: &str, quantity: f64, seconds: f64, user: &str) -> RawRow {
        RawRow::from([
            ("Transaction Type".to_string(), CellValue::from(kind)),
            ("To Location".to_string(), CellValue::from("12-34-A01")),
            ("From Location".to_string(), CellValue::from(from)),
            ("Quantity".to_string(), CellValue::Number(quantity)),
            ("Time to Execute".to_string(), CellValue::Number(seconds)),
            ("User".to_string(), CellValue::from(user)),
        ])
    }

    fn labor(inbound_tph: &str) -> LaborReport {
        let text = format!(
            "Labor Department Totals\n\
             Labor Department  Total Hours  Total Units  UPH  Total Transactions  TPH\n\
             Inbound  10  1500  150  120  {inbound_tph}\n\
             Customer Returns  4  40  10  40  10\n\
             Totals  14  1540  110  160  11.43\n\
             Labor Area Totals\n\
             Labor Dept / Area  Total Hours  Total Units  UPH  Total Transactions  TPH\n\
             Inbound / Receiving Dock  6  1200  200  80  13.3\n\
             Inbound / Customer Returns  2  20  10  20  10\n\
             Totals  8  1220  152  100  12.5\n"
        );
        parse_labor_report(&text)
    }

    fn session() -> AnalysisSession {
        AnalysisSession::with_builtin_rules().unwrap()
    }

    #[test]
    fn test_transaction_kpis_and_balance() {
        let rows = vec![
            tx("152", "DOCK1", 10.0, 60.0, "u1"),
            tx("152", "DOCK1", 30.0, 60.0, "u1"),
            tx("151", "DOCK1", 40.0, 60.0, "u1"),
            tx("151", "DOCK1", 40.0, 60.0, "u1"),
        ];
        let report = analyze_snapshot(Some(&rows), None, &session()).unwrap();
        let kpis = report.transactions.as_ref().and_then(TransactionSection::kpis).unwrap();
        assert_eq!(kpis.put_transactions, 2);
        assert_eq!(kpis.put_volume, dec!(40));
        assert_eq!(kpis.put_upt, dec!(20));
        assert_eq!(kpis.put_share_pct, dec!(50));
        let balance = report.balance.unwrap();
        assert_eq!(balance.ratio, dec!(1));
        assert!(balance.balanced);
        assert!(report.combined.is_none());
    }

    #[test]
    fn test_combined_kpis() {
        let rows: Vec<RawRow> = (0..100).map(|_| tx("152", "DOCK1", 15.0, 60.0, "u1")).collect();
        let labor = labor("10");
        let report = analyze_snapshot(Some(&rows), Some(&labor), &session()).unwrap();
        let combined = report.combined.unwrap();
        assert_eq!(combined.inbound_hours, dec!(10));
        assert_eq!(combined.tplh, dec!(10));
        assert_eq!(combined.tph, dec!(150));
        assert_eq!(combined.upt, dec!(15));
        assert_eq!(combined.efficiency_variance_pct, Some(dec!(0)));
    }

    #[test]
    fn test_inbound_areas_exclude_returns() {
        let labor = labor("12");
        let report = analyze_snapshot(None, Some(&labor), &session()).unwrap();
        let kpis = report.labor.as_ref().and_then(LaborSection::kpis).unwrap();
        assert_eq!(kpis.department.name, "Inbound");
        assert_eq!(kpis.areas.len(), 1);
        assert_eq!(kpis.areas[0].area.row.name, "Receiving Dock");
        assert_eq!(kpis.areas[0].hours_pct, dec!(60));
    }

    #[test]
    fn test_missing_inbound_department() {
        let labor = parse_labor_report(
            "Labor Department Totals\n\
             Labor Department  Total Hours  Total Units  UPH  Total Transactions  TPH\n\
             Outbound  10  1500  150  120  12\n",
        );
        let report = analyze_snapshot(None, Some(&labor), &session()).unwrap();
        assert!(matches!(
            report.labor,
            Some(LaborSection::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_vas_analysis() {
        let rows = vec![
            // 150 units in one hour against a 150 target
            tx("600", "SM.SHRNKWRP", 150.0, 3600.0, "u1"),
            // 60 units in two hours against a 60 target
            tx("600", "IBINSPECT", 30.0, 3600.0, "u1"),
            tx("600", "IBINSPECT", 30.0, 3600.0, "u1"),
            tx("600", "NOTARGET", 10.0, 360.0, "u1"),
        ];
        let report = analyze_snapshot(Some(&rows), None, &session()).unwrap();
        let vas = report.vas.unwrap();
        assert_eq!(vas.tasks[0].location, "SM.SHRNKWRP");
        assert_eq!(vas.tasks[0].performance_pct, Some(dec!(100)));
        assert_eq!(vas.tasks[1].actual_uph, dec!(30));
        assert_eq!(vas.tasks[1].performance_pct, Some(dec!(50)));
        assert_eq!(vas.tasks[2].target_uph, None);
        assert_eq!(vas.total_transactions, 4);
        assert_eq!(vas.expected_hours, dec!(2));
        assert_eq!(vas.suggested_uph, dec!(105));
        assert_eq!(vas.indicator, TargetIndicator::BelowTarget);
    }

    #[test]
    fn test_cart_productivity() {
        let rows = vec![
            tx("212", "MOVEXX01", 5.0, 180.0, "fast"),
            tx("212", "MOVEXX02", 5.0, 180.0, "fast"),
            tx("212", "MOVEXX01", 5.0, 720.0, "slow"),
            tx("212", "DOCK1", 5.0, 60.0, "other"),
        ];
        let report = analyze_snapshot(Some(&rows), None, &session()).unwrap();
        let cart = report.cart.unwrap();
        assert_eq!(cart.users.len(), 2);
        assert_eq!(cart.users[0].user, "fast");
        assert_eq!(cart.users[0].tplh, dec!(20));
        assert_eq!(cart.users[0].locations, vec!["MOVEXX01", "MOVEXX02"]);
        assert_eq!(cart.users[1].tplh, dec!(5));
        assert_eq!(cart.total_transactions, 3);
        assert_eq!(cart.tplh, dec!(10));
        assert_eq!(cart.target_tplh, dec!(19));
        assert_eq!(cart.variance, dec!(-9));
    }

    #[test]
    fn test_unusable_transactions_fall_back_to_labor() {
        let rows = vec![RawRow::from([
            ("Transaction Type".to_string(), CellValue::from("152")),
            ("Quantity".to_string(), CellValue::Number(20.0)),
        ])];
        let labor = labor("10");
        let report = analyze_snapshot(Some(&rows), Some(&labor), &session()).unwrap();

        assert!(matches!(
            report.transactions,
            Some(TransactionSection::InsufficientData { .. })
        ));
        let kpis = report.labor.as_ref().and_then(LaborSection::kpis).unwrap();
        assert_eq!(kpis.department.name, "Inbound");
        assert!(report.combined.is_none());
        assert!(report.balance.is_none());
        assert!(report.vas.is_none());

        let err = analyze_snapshot(Some(&rows), None, &session()).unwrap_err();
        assert!(matches!(err, IbopsError::NoUsableRows(_)));
    }

    #[test]
    fn test_oversized_quantities_do_not_panic() {
        let rows = vec![
            tx("152", "DOCK1", 7.0e28, 60.0, "u1"),
            tx("152", "DOCK1", 7.0e28, 60.0, "u1"),
            tx("600", "SM.SHRNKWRP", 7.0e28, 3600.0, "u1"),
            tx("600", "SM.SHRNKWRP", 7.0e28, 3600.0, "u1"),
        ];
        let report = analyze_snapshot(Some(&rows), Some(&labor("10")), &session()).unwrap();
        let kpis = report.transactions.as_ref().and_then(TransactionSection::kpis).unwrap();
        assert_eq!(kpis.put_volume, Decimal::MAX);
        assert_eq!(report.vas.unwrap().total_units, Decimal::MAX);
    }

    #[test]
    fn test_requires_some_input() {
        let err = analyze_snapshot(None, None, &session()).unwrap_err();
        assert!(matches!(err, IbopsError::NoUsableRows(_)));
    }
}
