use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;

use super::LaborCategorizer;
use crate::aggregate::{percent, percent_change, ratio, total, PercentChange};
use crate::parsing::labor::LaborRow;
use crate::rules::schema::LaborKind;

/// Share differences at or below this many percentage points are
/// reported as unchanged.
pub const SHARE_DEAD_BAND: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionHours {
    pub name: String,
    pub hours: Decimal,
    pub units: Decimal,
    pub transactions: Decimal,
}

impl From<&LaborRow> for FunctionHours {
    fn from(row: &LaborRow) -> Self {
        Self {
            name: row.name.clone(),
            hours: row.hours,
            units: row.units,
            transactions: row.transactions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotals {
    pub name: String,
    pub kind: LaborKind,
    pub hours: Decimal,
    pub units: Decimal,
    pub transactions: Decimal,
    /// Share of all bucketed hours.
    pub share_pct: Decimal,
    pub functions: Vec<FunctionHours>,
}

/// Hours per bucket for one labor listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaborBreakdown {
    pub map_name: String,
    /// Buckets with hours, largest first.
    pub categories: Vec<CategoryTotals>,
    /// Functions no bucket claimed, in input order.
    pub uncategorized: Vec<FunctionHours>,
    pub direct_hours: Decimal,
    pub indirect_hours: Decimal,
    pub returns_hours: Decimal,
    pub uncategorized_hours: Decimal,
    /// Hours the coverage is measured against: the department total when
    /// one was supplied, otherwise every listed hour.
    pub total_hours: Decimal,
    /// `(direct + indirect) / total_hours * 100`. Not clamped.
    pub coverage_pct: Decimal,
    pub direct_pct: Decimal,
    pub indirect_pct: Decimal,
    pub direct_units: Decimal,
    pub direct_transactions: Decimal,
    pub direct_uph: Decimal,
    pub direct_tph: Decimal,
    /// Indirect hours per direct hour.
    pub indirect_to_direct: Decimal,
    pub returns_transactions: Decimal,
    pub returns_tph: Decimal,
}

impl LaborBreakdown {
    /// Sum of hours across all buckets, returns included.
    pub fn bucketed_hours(&self) -> Decimal {
        total(self.categories.iter().map(|c| c.hours))
    }

    pub fn category(&self, name: &str) -> Option<&CategoryTotals> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn category_hours(&self, name: &str) -> Decimal {
        self.category(name).map_or(Decimal::ZERO, |c| c.hours)
    }
}

impl LaborCategorizer {
    /// Bucket every row with hours and total the buckets.
    ///
    /// `department_hours` is the coverage base; without it coverage is
    /// measured against all listed hours.
    pub fn breakdown(&self, rows: &[LaborRow], department_hours: Option<Decimal>) -> LaborBreakdown {
        let mut totals: Vec<CategoryTotals> = self
            .categories()
            .iter()
            .map(|c| CategoryTotals {
                name: c.name.clone(),
                kind: c.kind,
                hours: Decimal::ZERO,
                units: Decimal::ZERO,
                transactions: Decimal::ZERO,
                share_pct: Decimal::ZERO,
                functions: Vec::new(),
            })
            .collect();
        let mut uncategorized = Vec::new();
        let mut listed_hours = Decimal::ZERO;

        for row in rows.iter().filter(|r| !r.hours.is_zero()) {
            listed_hours = listed_hours.saturating_add(row.hours);
            let Some(category) = self.categorize(&row.name) else {
                tracing::debug!(function = %row.name, hours = %row.hours, "uncategorized labor function");
                uncategorized.push(FunctionHours::from(row));
                continue;
            };
            if let Some(t) = totals.iter_mut().find(|t| t.name == category.name) {
                t.hours = t.hours.saturating_add(row.hours);
                t.units = t.units.saturating_add(row.units);
                t.transactions = t.transactions.saturating_add(row.transactions);
                t.functions.push(FunctionHours::from(row));
            }
        }

        totals.retain(|t| !t.hours.is_zero());
        totals.sort_by(|a, b| b.hours.cmp(&a.hours));
        let bucketed = total(totals.iter().map(|t| t.hours));
        for t in &mut totals {
            t.share_pct = percent(t.hours, bucketed);
        }

        let sum_kind = |kind: LaborKind, f: fn(&CategoryTotals) -> Decimal| -> Decimal {
            total(totals.iter().filter(|t| t.kind == kind).map(f))
        };
        let direct_hours = sum_kind(LaborKind::Direct, |t| t.hours);
        let indirect_hours = sum_kind(LaborKind::Indirect, |t| t.hours);
        let returns_hours = sum_kind(LaborKind::Returns, |t| t.hours);
        let direct_units = sum_kind(LaborKind::Direct, |t| t.units);
        let direct_transactions = sum_kind(LaborKind::Direct, |t| t.transactions);
        let returns_transactions = sum_kind(LaborKind::Returns, |t| t.transactions);
        let uncategorized_hours = total(uncategorized.iter().map(|f| f.hours));

        let total_hours = department_hours.unwrap_or(listed_hours);

        LaborBreakdown {
            map_name: self.name().to_string(),
            categories: totals,
            uncategorized,
            direct_hours,
            indirect_hours,
            returns_hours,
            uncategorized_hours,
            total_hours,
            coverage_pct: percent(direct_hours.saturating_add(indirect_hours), total_hours),
            direct_pct: percent(direct_hours, total_hours),
            indirect_pct: percent(indirect_hours, total_hours),
            direct_units,
            direct_transactions,
            direct_uph: ratio(direct_units, direct_hours),
            direct_tph: ratio(direct_transactions, direct_hours),
            indirect_to_direct: ratio(indirect_hours, direct_hours),
            returns_transactions,
            returns_tph: ratio(returns_transactions, returns_hours),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftDirection {
    Increase,
    Decrease,
    Unchanged,
}

/// One bucket's share of hours in two listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareShift {
    pub category: String,
    pub baseline_hours: Decimal,
    pub current_hours: Decimal,
    pub baseline_pct: Decimal,
    pub current_pct: Decimal,
    /// `current_pct - baseline_pct`, in percentage points.
    pub diff_points: Decimal,
    pub direction: ShiftDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareComparison {
    /// Every bucket present in either listing, by name.
    pub shifts: Vec<ShareShift>,
    pub baseline_hours: Decimal,
    pub current_hours: Decimal,
    pub hours_change: PercentChange,
}

/// Compare how bucketed hours are distributed in two listings.
pub fn compare_shares(baseline: &LaborBreakdown, current: &LaborBreakdown) -> ShareComparison {
    let baseline_total = baseline.bucketed_hours();
    let current_total = current.bucketed_hours();

    let names: BTreeSet<&str> = baseline
        .categories
        .iter()
        .chain(&current.categories)
        .map(|c| c.name.as_str())
        .collect();

    let shifts = names
        .into_iter()
        .map(|name| {
            let baseline_hours = baseline.category_hours(name);
            let current_hours = current.category_hours(name);
            let baseline_pct = percent(baseline_hours, baseline_total);
            let current_pct = percent(current_hours, current_total);
            let diff_points = current_pct.saturating_sub(baseline_pct);
            let direction = if diff_points.abs() <= SHARE_DEAD_BAND {
                ShiftDirection::Unchanged
            } else if diff_points.is_sign_positive() {
                ShiftDirection::Increase
            } else {
                ShiftDirection::Decrease
            };
            ShareShift {
                category: name.to_string(),
                baseline_hours,
                current_hours,
                baseline_pct,
                current_pct,
                diff_points,
                direction,
            }
        })
        .collect();

    ShareComparison {
        shifts,
        baseline_hours: baseline_total,
        current_hours: current_total,
        hours_change: percent_change(baseline_total, current_total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::builtin::load_labor_preset;
    use rust_decimal_macros::dec;

    fn categorizer(name: &str) -> LaborCategorizer {
        LaborCategorizer::new(&load_labor_preset(name).unwrap())
    }

    fn row(name: &str, hours: Decimal, units: Decimal, tx: Decimal) -> LaborRow {
        LaborRow {
            name: name.into(),
            hours,
            units,
            transactions: tx,
            ..Default::default()
        }
    }

    #[test]
    fn test_direct_and_uncategorized_coverage() {
        let rows = vec![
            LaborRow::hours_only("Reach-Truck Putaway", dec!(10)),
            LaborRow::hours_only("Mystery Function", dec!(2)),
        ];
        let b = categorizer("labor-hours").breakdown(&rows, None);
        assert_eq!(b.direct_hours, dec!(10));
        assert_eq!(b.uncategorized.len(), 1);
        assert_eq!(b.uncategorized[0].name, "Mystery Function");
        assert_eq!(b.uncategorized[0].hours, dec!(2));
        assert_eq!(b.total_hours, dec!(12));
        assert_eq!(b.coverage_pct.round_dp(1), dec!(83.3));
    }

    #[test]
    fn test_buckets_sorted_and_zero_dropped() {
        let rows = vec![
            LaborRow::hours_only("VAS", dec!(3)),
            LaborRow::hours_only("Heat Shrink", dec!(0)),
            LaborRow::hours_only("Reach-Truck Putaway", dec!(5)),
            LaborRow::hours_only("Putaway - Unknown", dec!(1)),
            LaborRow::hours_only("Inbound Lead", dec!(2)),
        ];
        let b = categorizer("labor-hours").breakdown(&rows, None);
        let names: Vec<&str> = b.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Putaway", "VAS", "Support"]);
        assert_eq!(b.categories[0].hours, dec!(6));
        assert_eq!(b.categories[0].functions.len(), 2);
        assert_eq!(b.categories[0].share_pct.round_dp(2), dec!(54.55));
        assert_eq!(b.category_hours("Heat Shrink"), dec!(0));
    }

    #[test]
    fn test_coverage_against_department_hours() {
        let rows = vec![
            row("Reach-Truck Putaway", dec!(20), dec!(3000), dec!(500)),
            row("Inbound Lead", dec!(10), dec!(0), dec!(0)),
            row("Customer Returns Unloader", dec!(5), dec!(100), dec!(50)),
        ];
        let b = categorizer("labor-snapshot").breakdown(&rows, Some(dec!(40)));
        assert_eq!(b.coverage_pct, dec!(75));
        assert_eq!(b.direct_pct, dec!(50));
        assert_eq!(b.indirect_pct, dec!(25));
        assert_eq!(b.returns_hours, dec!(5));
        assert_eq!(b.direct_uph, dec!(150));
        assert_eq!(b.direct_tph, dec!(25));
        assert_eq!(b.indirect_to_direct, dec!(0.5));
        assert_eq!(b.returns_tph, dec!(10));
    }

    #[test]
    fn test_coverage_not_clamped() {
        let rows = vec![LaborRow::hours_only("Receiving", dec!(15))];
        let b = categorizer("labor-hours").breakdown(&rows, Some(dec!(10)));
        assert_eq!(b.coverage_pct, dec!(150));
    }

    #[test]
    fn test_oversized_hours_saturate() {
        let rows = vec![
            LaborRow::hours_only("Receiving", Decimal::MAX),
            LaborRow::hours_only("Receiving", Decimal::MAX),
            LaborRow::hours_only("Reach-Truck Putaway", dec!(1)),
        ];
        let b = categorizer("labor-hours").breakdown(&rows, None);
        assert_eq!(b.category_hours("Receiving"), Decimal::MAX);
        assert_eq!(b.total_hours, Decimal::MAX);
        assert_eq!(b.bucketed_hours(), Decimal::MAX);
    }

    #[test]
    fn test_empty_listing() {
        let b = categorizer("labor-hours").breakdown(&[], None);
        assert!(b.categories.is_empty());
        assert_eq!(b.coverage_pct, dec!(0));
        assert_eq!(b.direct_uph, dec!(0));
    }

    #[test]
    fn test_share_comparison_dead_band() {
        let c = categorizer("labor-hours");
        let baseline = c.breakdown(
            &[
                LaborRow::hours_only("Receiving", dec!(50)),
                LaborRow::hours_only("VAS", dec!(50)),
            ],
            None,
        );
        let current = c.breakdown(
            &[
                LaborRow::hours_only("Receiving", dec!(60.1)),
                LaborRow::hours_only("VAS", dec!(39.9)),
                LaborRow::hours_only("Unloader", dec!(0.05)),
            ],
            None,
        );
        let cmp = compare_shares(&baseline, &current);
        let names: Vec<&str> = cmp.shifts.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(names, vec!["Receiving", "Unloader", "VAS"]);
        assert_eq!(cmp.shifts[0].direction, ShiftDirection::Increase);
        assert_eq!(cmp.shifts[1].direction, ShiftDirection::Unchanged);
        assert_eq!(cmp.shifts[1].baseline_pct, dec!(0));
        assert_eq!(cmp.shifts[2].direction, ShiftDirection::Decrease);
        assert_eq!(cmp.baseline_hours, dec!(100));
        assert_eq!(cmp.hours_change, PercentChange::Change(dec!(0.05)));
    }
}
