//! Air vs Ground: put-away transactions split by destination level, with
//! cart-size analysis of MOD-format moves and period comparison.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{classify_rows, fold_rows, volume_pass, ClassifiedRows};
use crate::aggregate::{compare, percent, AggregateResult, ComparisonResult, MetricSource, TimeUnit};
use crate::classify::CompiledRuleSet;
use crate::diagnostics::Diagnostics;
use crate::error::IbopsError;
use crate::model::RawRow;
use crate::parsing::normalize::FieldMap;
use crate::session::AnalysisSession;
use crate::volume::{volume_range, VolumeDecision, VolumeReclassifier, VOLUME_RANGES};

pub const AIR: &str = "air";
pub const GROUND: &str = "ground";
/// Category counting MOD-format locations.
pub const MOD_FORMAT: &str = "mod";

const UNKNOWN_EMPLOYEE: &str = "Unknown";
const TOP_ITEMS: usize = 10;

/// An Air/Ground rule set must define both sides of the split.
pub fn check_ruleset(ruleset: &CompiledRuleSet) -> Result<(), IbopsError> {
    for required in [AIR, GROUND] {
        if ruleset.label(required).is_none() {
            return Err(IbopsError::RulesetInvalid(format!(
                "rule set '{}' has no '{}' category",
                ruleset.name, required
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartMetrics {
    /// MOD-format rows under the volume threshold.
    pub small_volume_total: usize,
    pub cart_to_air: usize,
    pub cart_to_ground: usize,
    pub cart_air_pct: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirGroundMetrics {
    pub air_count: usize,
    pub ground_count: usize,
    pub total: usize,
    pub avg_air_minutes: Decimal,
    pub avg_ground_minutes: Decimal,
    pub air_pct: Decimal,
    pub ground_pct: Decimal,
    pub mod_transactions: usize,
    /// `None` when no item master was available.
    pub cart: Option<CartMetrics>,
}

impl MetricSource for AirGroundMetrics {
    fn metrics(&self) -> BTreeMap<String, Decimal> {
        let mut m = BTreeMap::from([
            ("air_count".to_string(), Decimal::from(self.air_count)),
            ("ground_count".to_string(), Decimal::from(self.ground_count)),
            ("avg_air_minutes".to_string(), self.avg_air_minutes),
            ("avg_ground_minutes".to_string(), self.avg_ground_minutes),
            ("air_pct".to_string(), self.air_pct),
            ("ground_pct".to_string(), self.ground_pct),
            ("mod_transactions".to_string(), Decimal::from(self.mod_transactions)),
        ]);
        if let Some(cart) = &self.cart {
            m.insert("small_volume_total".into(), Decimal::from(cart.small_volume_total));
            m.insert("cart_to_air".into(), Decimal::from(cart.cart_to_air));
            m.insert("cart_to_ground".into(), Decimal::from(cart.cart_to_ground));
            m.insert("cart_air_pct".into(), cart.cart_air_pct);
        }
        m
    }
}

/// A MOD-format move small enough for a cart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartRow {
    pub index: usize,
    pub item: String,
    pub quantity: Decimal,
    pub cubic_volume: Decimal,
    pub total_volume: Decimal,
    pub location: String,
    pub is_air: bool,
    pub employee: String,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolumeBucket {
    pub range: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeCarts {
    pub employee: String,
    pub air: usize,
    pub ground: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemCount {
    pub item: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartAnalysis {
    pub rows: Vec<CartRow>,
    /// Every range, smallest first, zeros included.
    pub volume_distribution: Vec<VolumeBucket>,
    /// Busiest employees first.
    pub employees: Vec<EmployeeCarts>,
    pub top_items: Vec<ItemCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CartSection {
    Available(CartAnalysis),
    Unavailable { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCounts {
    pub date: NaiveDate,
    pub air: usize,
    pub ground: usize,
    pub air_pct: Decimal,
    pub ground_pct: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailyBreakdown {
    /// Sorted by date.
    pub days: Vec<DailyCounts>,
    pub undated_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirGroundReport {
    pub ruleset: String,
    pub rows_read: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub metrics: AirGroundMetrics,
    pub cart: CartSection,
    pub daily: DailyBreakdown,
    pub aggregate: AggregateResult,
    pub diagnostics: Diagnostics,
}

/// An inclusive date range for period comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Start must come strictly before end.
    pub fn validate(&self, period: &str) -> Result<(), IbopsError> {
        if self.start >= self.end {
            return Err(IbopsError::InvalidPeriod {
                period: period.into(),
                reason: format!("start {} must be before end {}", self.start, self.end),
            });
        }
        Ok(())
    }
}

pub fn analyze_air_ground(
    raw_rows: &[RawRow],
    session: &AnalysisSession,
) -> Result<AirGroundReport, IbopsError> {
    let ruleset = session.air_ground_rules();
    let classified = classify_rows(raw_rows, &FieldMap::air_ground(), ruleset)?;
    let report = build_report(&classified, raw_rows.len(), session);
    tracing::info!(
        rows = report.metrics.total,
        air = report.metrics.air_count,
        ground = report.metrics.ground_count,
        diagnostics = %report.diagnostics.summary(),
        "air/ground analysis finished"
    );
    Ok(report)
}

/// Rows dated within `range`. Undated rows never match.
pub fn filter_by_date_range(classified: &ClassifiedRows, range: DateRange) -> ClassifiedRows {
    classified.filtered(|row| row.date.is_some_and(|d| range.contains(d)))
}

/// Compare two periods of the same export. Both ranges must be ordered
/// and non-empty.
pub fn compare_periods(
    raw_rows: &[RawRow],
    session: &AnalysisSession,
    baseline: DateRange,
    current: DateRange,
) -> Result<ComparisonResult<AirGroundReport>, IbopsError> {
    baseline.validate("baseline")?;
    current.validate("current")?;

    let classified = classify_rows(raw_rows, &FieldMap::air_ground(), session.air_ground_rules())?;

    let period_report = |label: &str, range: DateRange| {
        let period = filter_by_date_range(&classified, range);
        if period.is_empty() {
            return Err(IbopsError::InvalidPeriod {
                period: label.into(),
                reason: format!("no rows dated {} to {}", range.start, range.end),
            });
        }
        tracing::debug!(period = label, rows = period.len(), "period selected");
        Ok(build_report(&period, period.len(), session))
    };

    let baseline_report = period_report("baseline", baseline)?;
    let current_report = period_report("current", current)?;
    Ok(compare(baseline_report, current_report))
}

impl MetricSource for AirGroundReport {
    fn metrics(&self) -> BTreeMap<String, Decimal> {
        self.metrics.metrics()
    }
}

fn build_report(
    classified: &ClassifiedRows,
    rows_read: usize,
    session: &AnalysisSession,
) -> AirGroundReport {
    let ruleset = session.air_ground_rules();
    let aggregate = fold_rows(classified, ruleset, TimeUnit::Minutes);
    let mut diagnostics = classified.diagnostics.clone();

    let air_count = aggregate.sums(AIR).transactions as usize;
    let ground_count = aggregate.sums(GROUND).transactions as usize;
    let total = air_count + ground_count;
    let mod_transactions = aggregate.sums(MOD_FORMAT).transactions as usize;

    let cart = match (ruleset.volume.as_ref(), session.item_master()) {
        (None, _) => CartSection::Unavailable {
            reason: format!("rule set '{}' has no volume rule", ruleset.name),
        },
        (Some(_), None) => CartSection::Unavailable {
            reason: "item master not loaded".into(),
        },
        (Some(rule), Some(master)) => {
            let reclassifier = VolumeReclassifier::from_rule(master, rule);
            let decisions =
                volume_pass(classified, &reclassifier, &aggregate.exclusion_sets, &mut diagnostics);
            let rows = decisions
                .iter()
                .filter_map(|d| match &d.decision {
                    VolumeDecision::Measured(m) if m.eligible => Some(CartRow {
                        index: d.row.index,
                        item: d.row.item.as_ref().map(|i| i.raw.to_string()).unwrap_or_default(),
                        quantity: m.quantity,
                        cubic_volume: m.cubic_volume,
                        total_volume: m.total_volume,
                        location: d.row.location.clone(),
                        is_air: !d.categories.contains(GROUND),
                        employee: d
                            .row
                            .user
                            .clone()
                            .unwrap_or_else(|| UNKNOWN_EMPLOYEE.to_string()),
                        date: d.row.date,
                    }),
                    _ => None,
                })
                .collect();
            CartSection::Available(analyze_carts(rows))
        }
    };

    let cart_metrics = match &cart {
        CartSection::Available(analysis) => {
            let cart_to_air = analysis.rows.iter().filter(|r| r.is_air).count();
            let small_volume_total = analysis.rows.len();
            Some(CartMetrics {
                small_volume_total,
                cart_to_air,
                cart_to_ground: small_volume_total - cart_to_air,
                cart_air_pct: percent(Decimal::from(cart_to_air), Decimal::from(small_volume_total)),
            })
        }
        CartSection::Unavailable { .. } => None,
    };

    let metrics = AirGroundMetrics {
        air_count,
        ground_count,
        total,
        avg_air_minutes: aggregate.rate(AIR, "avg_time"),
        avg_ground_minutes: aggregate.rate(GROUND, "avg_time"),
        air_pct: percent(Decimal::from(air_count), Decimal::from(total)),
        ground_pct: percent(Decimal::from(ground_count), Decimal::from(total)),
        mod_transactions,
        cart: cart_metrics,
    };

    let dates = classified.rows.iter().filter_map(|r| r.date);
    AirGroundReport {
        ruleset: ruleset.name.clone(),
        rows_read,
        first_date: dates.clone().min(),
        last_date: dates.max(),
        metrics,
        cart,
        daily: daily_breakdown(classified),
        aggregate,
        diagnostics,
    }
}

fn analyze_carts(rows: Vec<CartRow>) -> CartAnalysis {
    let mut ranges: BTreeMap<&str, usize> = BTreeMap::new();
    let mut employees: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    let mut items: BTreeMap<&str, usize> = BTreeMap::new();

    for row in &rows {
        *ranges.entry(volume_range(row.total_volume)).or_default() += 1;
        let e = employees.entry(row.employee.as_str()).or_default();
        if row.is_air {
            e.0 += 1;
        } else {
            e.1 += 1;
        }
        *items.entry(row.item.as_str()).or_default() += 1;
    }

    let volume_distribution = VOLUME_RANGES
        .iter()
        .map(|(_, label)| VolumeBucket {
            range: label.to_string(),
            count: ranges.get(label).copied().unwrap_or(0),
        })
        .collect();

    let mut employees: Vec<EmployeeCarts> = employees
        .into_iter()
        .map(|(employee, (air, ground))| EmployeeCarts {
            employee: employee.to_string(),
            air,
            ground,
        })
        .collect();
    employees.sort_by(|a, b| (b.air + b.ground).cmp(&(a.air + a.ground)));

    let mut top_items: Vec<ItemCount> = items
        .into_iter()
        .map(|(item, count)| ItemCount {
            item: item.to_string(),
            count,
        })
        .collect();
    top_items.sort_by(|a, b| b.count.cmp(&a.count));
    top_items.truncate(TOP_ITEMS);

    CartAnalysis {
        rows,
        volume_distribution,
        employees,
        top_items,
    }
}

fn daily_breakdown(classified: &ClassifiedRows) -> DailyBreakdown {
    let mut days: BTreeMap<NaiveDate, (usize, usize)> = BTreeMap::new();
    let mut undated_rows = 0;

    for (row, cats) in classified.iter() {
        let Some(date) = row.date else {
            undated_rows += 1;
            continue;
        };
        let day = days.entry(date).or_default();
        if cats.contains(GROUND) {
            day.1 += 1;
        } else {
            day.0 += 1;
        }
    }

    DailyBreakdown {
        days: days
            .into_iter()
            .map(|(date, (air, ground))| {
                let total = Decimal::from(air + ground);
                DailyCounts {
                    date,
                    air,
                    ground,
                    air_pct: percent(Decimal::from(air), total),
                    ground_pct: percent(Decimal::from(ground), total),
                }
            })
            .collect(),
        undated_rows,
    }
}
