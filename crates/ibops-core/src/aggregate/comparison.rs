use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::percent;

/// Relative change from a baseline to a current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "pct")]
pub enum PercentChange {
    /// `(current - baseline) / baseline * 100`; zero when both are zero.
    Change(Decimal),
    /// Baseline was zero and current is not.
    Unbounded,
}

impl PercentChange {
    pub fn value(&self) -> Option<Decimal> {
        match self {
            PercentChange::Change(v) => Some(*v),
            PercentChange::Unbounded => None,
        }
    }
}

impl fmt::Display for PercentChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PercentChange::Change(v) if v.is_sign_positive() && !v.is_zero() => {
                write!(f, "+{:.2}%", v)
            }
            PercentChange::Change(v) => write!(f, "{:.2}%", v),
            PercentChange::Unbounded => write!(f, "+∞"),
        }
    }
}

pub fn percent_change(baseline: Decimal, current: Decimal) -> PercentChange {
    if baseline.is_zero() {
        if current.is_zero() {
            PercentChange::Change(Decimal::ZERO)
        } else {
            PercentChange::Unbounded
        }
    } else {
        PercentChange::Change(percent(current.saturating_sub(baseline), baseline))
    }
}

/// Anything that exposes named numeric metrics for period comparison.
pub trait MetricSource {
    fn metrics(&self) -> BTreeMap<String, Decimal>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricChange {
    pub baseline: Decimal,
    pub current: Decimal,
    pub change: PercentChange,
}

/// Two finalized results and the per-metric change between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult<T> {
    pub baseline: T,
    pub current: T,
    pub changes: BTreeMap<String, MetricChange>,
}

/// Compare every metric present in either result; a metric missing on one
/// side counts as zero there.
pub fn compare<T: MetricSource>(baseline: T, current: T) -> ComparisonResult<T> {
    let before = baseline.metrics();
    let after = current.metrics();

    let mut changes = BTreeMap::new();
    for name in before.keys().chain(after.keys()) {
        if changes.contains_key(name) {
            continue;
        }
        let b = before.get(name).copied().unwrap_or_default();
        let c = after.get(name).copied().unwrap_or_default();
        changes.insert(
            name.clone(),
            MetricChange {
                baseline: b,
                current: c,
                change: percent_change(b, c),
            },
        );
    }

    ComparisonResult {
        baseline,
        current,
        changes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    struct Fixed(Vec<(&'static str, Decimal)>);

    impl MetricSource for Fixed {
        fn metrics(&self) -> BTreeMap<String, Decimal> {
            self.0.iter().map(|(k, v)| (k.to_string(), *v)).collect()
        }
    }

    #[test]
    fn test_both_zero_is_zero() {
        assert_eq!(percent_change(dec!(0), dec!(0)), PercentChange::Change(dec!(0)));
    }

    #[test]
    fn test_zero_baseline_is_unbounded() {
        assert_eq!(percent_change(dec!(0), dec!(7)), PercentChange::Unbounded);
        assert_eq!(PercentChange::Unbounded.to_string(), "+∞");
    }

    #[test]
    fn test_regular_change() {
        assert_eq!(percent_change(dec!(100), dec!(150)), PercentChange::Change(dec!(50)));
        assert_eq!(percent_change(dec!(100), dec!(75)), PercentChange::Change(dec!(-25)));
        assert_eq!(percent_change(dec!(100), dec!(150)).to_string(), "+50.00%");
        assert_eq!(percent_change(dec!(100), dec!(75)).to_string(), "-25.00%");
    }

    #[test]
    fn test_compare_union_of_metrics() {
        let result = compare(
            Fixed(vec![("air.count", dec!(10)), ("ground.count", dec!(5))]),
            Fixed(vec![("air.count", dec!(15)), ("mod.count", dec!(2))]),
        );
        assert_eq!(result.changes.len(), 3);
        assert_eq!(result.changes["air.count"].change, PercentChange::Change(dec!(50)));
        assert_eq!(result.changes["ground.count"].change, PercentChange::Change(dec!(-100)));
        assert_eq!(result.changes["mod.count"].change, PercentChange::Unbounded);
    }
}
