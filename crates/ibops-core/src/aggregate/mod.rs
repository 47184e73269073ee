//! Single-pass aggregation of classified rows.
//!
//! The [`Aggregator`] is the run's only mutable accumulator: it is built at
//! the start of a run, folded over rows in input order, then consumed by
//! [`Aggregator::finalize`], which is the only place rates are computed.

pub mod comparison;

use crate::classify::CompiledRuleSet;
use crate::model::NormalizedRow;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub use comparison::{compare, percent_change, ComparisonResult, MetricSource, PercentChange};

/// Category -> identifiers that lower-priority categories must skip.
pub type ExclusionSets = BTreeMap<String, BTreeSet<String>>;

const SECONDS_PER_MINUTE: Decimal = Decimal::from_parts(60, 0, 0, false, 0);
const SECONDS_PER_HOUR: Decimal = Decimal::from_parts(3600, 0, 0, false, 0);
const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Unit for accumulated elapsed time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    /// Per-row minutes, each rounded to 2 decimals before summing.
    Minutes,
    #[default]
    Hours,
}

impl TimeUnit {
    pub fn from_seconds(self, seconds: Decimal) -> Decimal {
        match self {
            TimeUnit::Minutes => round2(seconds / SECONDS_PER_MINUTE),
            TimeUnit::Hours => seconds / SECONDS_PER_HOUR,
        }
    }

    fn to_hours(self, time: Decimal) -> Decimal {
        match self {
            TimeUnit::Minutes => time / SECONDS_PER_MINUTE,
            TimeUnit::Hours => time,
        }
    }
}

/// Round half away from zero to 2 decimals.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `numerator / denominator`, or zero when the denominator is zero.
/// Quotients past the decimal range clamp to `Decimal::MAX`/`MIN`.
pub fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator.checked_div(denominator).unwrap_or(
        if numerator.is_sign_negative() == denominator.is_sign_negative() {
            Decimal::MAX
        } else {
            Decimal::MIN
        },
    )
}

/// `part / whole * 100`, or zero when the whole is zero.
pub fn percent(part: Decimal, whole: Decimal) -> Decimal {
    ratio(part, whole).saturating_mul(HUNDRED)
}

/// Saturating sum; spreadsheet values can be arbitrarily large.
pub fn total(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values
        .into_iter()
        .fold(Decimal::ZERO, |acc, v| acc.saturating_add(v))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySums {
    /// Elapsed time in the result's [`TimeUnit`].
    pub time: Decimal,
    pub units: Decimal,
    /// Qualifying rows, duplicates included.
    pub transactions: u64,
}

#[derive(Debug, Clone)]
pub struct Aggregator {
    time_unit: TimeUnit,
    identifiers: BTreeMap<String, BTreeSet<String>>,
    sums: BTreeMap<String, CategorySums>,
    exclusive: BTreeSet<String>,
    exclusions: ExclusionSets,
    rows_folded: usize,
}

impl Aggregator {
    /// Seed every category so the result reports zeros for categories that
    /// never matched.
    pub fn new<I, S>(categories: I, time_unit: TimeUnit) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut identifiers = BTreeMap::new();
        let mut sums = BTreeMap::new();
        for cat in categories {
            let cat = cat.into();
            identifiers.insert(cat.clone(), BTreeSet::new());
            sums.insert(cat, CategorySums::default());
        }
        Self {
            time_unit,
            identifiers,
            sums,
            exclusive: BTreeSet::new(),
            exclusions: ExclusionSets::new(),
            rows_folded: 0,
        }
    }

    /// Aggregator for a ruleset; its volume priority category, if any,
    /// records exclusions.
    pub fn for_ruleset(ruleset: &CompiledRuleSet, time_unit: TimeUnit) -> Self {
        let agg = Self::new(ruleset.category_names(), time_unit);
        match ruleset.volume.as_ref().and_then(|v| v.priority.clone()) {
            Some(priority) => agg.exclusive(priority),
            None => agg,
        }
    }

    /// Record identifiers folded into `category` as exclusions for others.
    pub fn exclusive(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        self.exclusions.entry(category.clone()).or_default();
        self.exclusive.insert(category);
        self
    }

    /// Fold one row into every category it was classified into.
    pub fn fold(&mut self, row: &NormalizedRow, categories: &BTreeSet<String>) {
        self.rows_folded += 1;
        let time = self.time_unit.from_seconds(row.elapsed_seconds);

        for cat in categories {
            self.identifiers
                .entry(cat.clone())
                .or_default()
                .insert(row.identifier.clone());

            let sums = self.sums.entry(cat.clone()).or_default();
            sums.time = sums.time.saturating_add(time);
            sums.units = sums.units.saturating_add(row.quantity);
            sums.transactions += 1;

            if self.exclusive.contains(cat) {
                self.exclusions
                    .entry(cat.clone())
                    .or_default()
                    .insert(row.identifier.clone());
            }
        }
    }

    pub fn exclusion_sets(&self) -> &ExclusionSets {
        &self.exclusions
    }

    pub fn rows_folded(&self) -> usize {
        self.rows_folded
    }

    pub fn unique_count(&self, category: &str) -> usize {
        self.identifiers.get(category).map_or(0, BTreeSet::len)
    }

    pub fn finalize(self) -> AggregateResult {
        let category_counts: BTreeMap<String, usize> = self
            .identifiers
            .iter()
            .map(|(cat, ids)| (cat.clone(), ids.len()))
            .collect();
        let total_unique: usize = category_counts.values().sum();
        let rows = Decimal::from(self.rows_folded);

        let mut derived_rates = BTreeMap::new();
        for (cat, sums) in &self.sums {
            let transactions = Decimal::from(sums.transactions);
            let hours = self.time_unit.to_hours(sums.time);
            let count = Decimal::from(category_counts.get(cat).copied().unwrap_or(0));

            derived_rates.insert(format!("{cat}.avg_time"), ratio(sums.time, transactions));
            derived_rates.insert(format!("{cat}.units_per_hour"), ratio(sums.units, hours));
            derived_rates.insert(
                format!("{cat}.transactions_per_hour"),
                ratio(transactions, hours),
            );
            derived_rates.insert(
                format!("{cat}.units_per_transaction"),
                ratio(sums.units, transactions),
            );
            derived_rates.insert(
                format!("{cat}.count_share_pct"),
                percent(count, Decimal::from(total_unique)),
            );
            derived_rates.insert(format!("{cat}.row_share_pct"), percent(transactions, rows));
        }

        AggregateResult {
            time_unit: self.time_unit,
            rows: self.rows_folded,
            category_counts,
            category_sums: self.sums,
            derived_rates,
            exclusion_sets: self.exclusions,
        }
    }
}

/// Finalized totals for one run. Plain data, safe to serialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub time_unit: TimeUnit,
    /// Rows folded, classified or not.
    pub rows: usize,
    /// Distinct identifiers per category.
    pub category_counts: BTreeMap<String, usize>,
    pub category_sums: BTreeMap<String, CategorySums>,
    /// `<category>.<metric>` -> value. Zero wherever a denominator is zero.
    pub derived_rates: BTreeMap<String, Decimal>,
    pub exclusion_sets: ExclusionSets,
}

impl AggregateResult {
    pub fn count(&self, category: &str) -> usize {
        self.category_counts.get(category).copied().unwrap_or(0)
    }

    pub fn sums(&self, category: &str) -> CategorySums {
        self.category_sums.get(category).cloned().unwrap_or_default()
    }

    pub fn rate(&self, category: &str, metric: &str) -> Decimal {
        self.derived_rates
            .get(&format!("{category}.{metric}"))
            .copied()
            .unwrap_or_default()
    }
}

impl MetricSource for AggregateResult {
    fn metrics(&self) -> BTreeMap<String, Decimal> {
        let mut out = self.derived_rates.clone();
        for (cat, count) in &self.category_counts {
            out.insert(format!("{cat}.count"), Decimal::from(*count));
        }
        for (cat, sums) in &self.category_sums {
            out.insert(format!("{cat}.time"), sums.time);
            out.insert(format!("{cat}.units"), sums.units);
            out.insert(format!("{cat}.transactions"), Decimal::from(sums.transactions));
        }
        out
    }
}
