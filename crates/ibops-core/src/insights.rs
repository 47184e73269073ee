//! Ratings, generated insights and anomaly flags for the snapshot.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::pipelines::snapshot::{LaborSection, SnapshotReport, TransactionSection};

const fn whole(n: u32) -> Decimal {
    Decimal::from_parts(n, 0, 0, false, 0)
}

const TPLH_POOR: Decimal = whole(8);
const TPLH_FAIR: Decimal = whole(12);
const TPLH_GOOD: Decimal = whole(16);
const TPLH_EXCELLENT: Decimal = whole(20);

const TPH_BELOW_TARGET: Decimal = whole(80);
const TPH_ON_TARGET: Decimal = whole(120);
const TPH_ABOVE_TARGET: Decimal = whole(150);

const VARIANCE_EXCELLENT: Decimal = whole(5);
const VARIANCE_ACCEPTABLE: Decimal = whole(15);
const VARIANCE_POOR: Decimal = whole(20);

const RATIO_LOW: Decimal = Decimal::from_parts(9, 0, 0, false, 1);
const RATIO_HIGH: Decimal = Decimal::from_parts(11, 0, 0, false, 1);

/// Areas below this fraction of the department UPH are underperforming.
const AREA_UPH_FLOOR: Decimal = Decimal::from_parts(8, 0, 0, false, 1);

const ANOMALY_TPLH_LOW: Decimal = whole(3);
const ANOMALY_TPLH_HIGH: Decimal = whole(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TplhRating {
    Poor,
    Fair,
    Good,
    VeryGood,
    Excellent,
}

impl TplhRating {
    pub fn rate(tplh: Decimal) -> Self {
        if tplh < TPLH_POOR {
            TplhRating::Poor
        } else if tplh < TPLH_FAIR {
            TplhRating::Fair
        } else if tplh < TPLH_GOOD {
            TplhRating::Good
        } else if tplh < TPLH_EXCELLENT {
            TplhRating::VeryGood
        } else {
            TplhRating::Excellent
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TphRating {
    BelowTarget,
    OnTarget,
    AboveTarget,
    WellAboveTarget,
}

impl TphRating {
    pub fn rate(tph: Decimal) -> Self {
        if tph < TPH_BELOW_TARGET {
            TphRating::BelowTarget
        } else if tph < TPH_ON_TARGET {
            TphRating::OnTarget
        } else if tph <= TPH_ABOVE_TARGET {
            TphRating::AboveTarget
        } else {
            TphRating::WellAboveTarget
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceClass {
    Excellent,
    Acceptable,
    Watch,
    Poor,
}

impl VarianceClass {
    /// Classify on the absolute variance.
    pub fn rate(variance_pct: Decimal) -> Self {
        let v = variance_pct.abs();
        if v <= VARIANCE_EXCELLENT {
            VarianceClass::Excellent
        } else if v <= VARIANCE_ACCEPTABLE {
            VarianceClass::Acceptable
        } else if v <= VARIANCE_POOR {
            VarianceClass::Watch
        } else {
            VarianceClass::Poor
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VasPerformanceClass {
    Excellent,
    Acceptable,
    Poor,
}

impl VasPerformanceClass {
    pub fn rate(performance_pct: Decimal) -> Self {
        if performance_pct >= whole(105) {
            VasPerformanceClass::Excellent
        } else if performance_pct >= whole(95) {
            VasPerformanceClass::Acceptable
        } else {
            VasPerformanceClass::Poor
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ratings {
    pub tplh: Option<TplhRating>,
    pub tph: Option<TphRating>,
    pub variance: Option<VarianceClass>,
    pub vas: Option<VasPerformanceClass>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Success,
    Warning,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl Insight {
    fn new(kind: InsightKind, title: &str, message: String) -> Self {
        Self {
            kind,
            title: title.to_string(),
            message,
            recommendation: None,
        }
    }

    fn recommend(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anomaly {
    pub metric: String,
    pub value: Decimal,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Assessment {
    pub ratings: Ratings,
    pub insights: Vec<Insight>,
    pub anomalies: Vec<Anomaly>,
}

/// Rate, comment on and flag a finished snapshot.
pub fn assess(report: &SnapshotReport) -> Assessment {
    Assessment {
        ratings: ratings(report),
        insights: generate_insights(report),
        anomalies: detect_anomalies(report),
    }
}

pub fn ratings(report: &SnapshotReport) -> Ratings {
    let combined = report.combined.as_ref();
    Ratings {
        tplh: combined.map(|c| TplhRating::rate(c.tplh)),
        tph: combined.map(|c| TphRating::rate(c.tph)),
        variance: combined
            .and_then(|c| c.efficiency_variance_pct)
            .map(VarianceClass::rate),
        vas: report
            .vas
            .as_ref()
            .map(|v| VasPerformanceClass::rate(v.performance_pct)),
    }
}

/// Insights in a fixed order: TPLH, TPH, variance, receipt/put balance,
/// missing department, weak areas. A zero TPLH or TPH means nothing was
/// measured and produces no insight.
pub fn generate_insights(report: &SnapshotReport) -> Vec<Insight> {
    let mut out = Vec::new();

    if let Some(c) = &report.combined {
        let tplh = c.tplh;
        if !tplh.is_zero() {
            if tplh < TPLH_POOR {
                out.push(
                    Insight::new(
                        InsightKind::Warning,
                        "Low TPLH Performance",
                        format!(
                            "TPLH of {:.2} is below optimal range ({TPLH_POOR}-{TPLH_GOOD} transactions/hour).",
                            tplh
                        ),
                    )
                    .recommend("Consider reviewing putaway processes and staff allocation in the Inbound department."),
                );
            } else if tplh > TPLH_EXCELLENT {
                out.push(
                    Insight::new(
                        InsightKind::Success,
                        "Excellent TPLH Performance",
                        format!("TPLH of {:.2} indicates outstanding inbound efficiency.", tplh),
                    )
                    .recommend("Document current best practices to maintain this high performance level."),
                );
            } else if tplh >= TPLH_FAIR {
                out.push(Insight::new(
                    InsightKind::Success,
                    "Good TPLH Performance",
                    format!("TPLH of {:.2} is within the good performance range.", tplh),
                ));
            }
        }

        let tph = c.tph;
        if !tph.is_zero() {
            if tph < TPH_BELOW_TARGET {
                out.push(
                    Insight::new(
                        InsightKind::Warning,
                        "TPH Below Target",
                        format!("TPH of {:.1} units/hour may indicate throughput opportunities.", tph),
                    )
                    .recommend("Analyze putaway efficiency and consider process improvements."),
                );
            } else if tph > TPH_ABOVE_TARGET {
                out.push(Insight::new(
                    InsightKind::Success,
                    "High TPH Performance",
                    format!("TPH of {:.1} units/hour shows excellent throughput.", tph),
                ));
            }
        }

        if let Some(variance) = c.efficiency_variance_pct.map(|v| v.abs()) {
            if variance > VARIANCE_POOR {
                out.push(
                    Insight::new(
                        InsightKind::Warning,
                        "High Variance Between Actual and Labor Data",
                        format!(
                            "{:.1}% variance between actual TPLH and labor-reported TPH.",
                            variance
                        ),
                    )
                    .recommend("Review data collection methods and labor reporting accuracy."),
                );
            } else if variance <= VARIANCE_EXCELLENT {
                out.push(Insight::new(
                    InsightKind::Success,
                    "Excellent Data Alignment",
                    format!("Only {:.1}% variance shows accurate labor reporting.", variance),
                ));
            }
        }
    }

    if let Some(balance) = report.balance.as_ref().filter(|b| !b.balanced) {
        if balance.ratio < RATIO_LOW {
            out.push(
                Insight::new(
                    InsightKind::Info,
                    "More Receipts Than Puts",
                    format!(
                        "Ratio of {:.2} indicates more receipts (151) than puts (152).",
                        balance.ratio
                    ),
                )
                .recommend("Monitor for potential putaway backlog or processing delays."),
            );
        } else if balance.ratio > RATIO_HIGH {
            out.push(
                Insight::new(
                    InsightKind::Info,
                    "More Puts Than Receipts",
                    format!(
                        "Ratio of {:.2} indicates more puts (152) than receipts (151).",
                        balance.ratio
                    ),
                )
                .recommend("Verify data timing; may indicate catch-up putaway processing."),
            );
        }
    }

    if report
        .transactions
        .as_ref()
        .and_then(TransactionSection::kpis)
        .is_some()
        && matches!(report.labor, Some(LaborSection::InsufficientData { .. }))
    {
        out.push(
            Insight::new(
                InsightKind::Error,
                "No Inbound Department Found",
                "Could not locate \"Inbound\" department in labor data.".to_string(),
            )
            .recommend("Verify labor data format and department naming conventions."),
        );
    }

    if let Some(labor) = report.labor.as_ref().and_then(LaborSection::kpis) {
        let floor = labor.department.uph * AREA_UPH_FLOOR;
        let weak: Vec<&str> = labor
            .areas
            .iter()
            .filter(|a| a.area.row.uph < floor)
            .map(|a| a.area.row.name.as_str())
            .collect();
        if !weak.is_empty() {
            out.push(
                Insight::new(
                    InsightKind::Info,
                    "Underperforming Inbound Areas",
                    format!(
                        "{} inbound area(s) performing below department average.",
                        weak.len()
                    ),
                )
                .recommend(format!("Review processes in: {}", weak.join(", "))),
            );
        }
    }

    out
}

pub fn detect_anomalies(report: &SnapshotReport) -> Vec<Anomaly> {
    report
        .combined
        .as_ref()
        .filter(|c| !c.tplh.is_zero())
        .filter(|c| c.tplh < ANOMALY_TPLH_LOW || c.tplh > ANOMALY_TPLH_HIGH)
        .map(|c| Anomaly {
            metric: "tplh".into(),
            value: c.tplh,
            message: "TPLH value appears to be an outlier".into(),
        })
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::pipelines::snapshot::{CombinedKpis, ReceiptPutBalance};
    use rust_decimal_macros::dec;

    fn combined(tplh: Decimal, tph: Decimal, variance: Option<Decimal>) -> CombinedKpis {
        CombinedKpis {
            inbound_hours: dec!(10),
            total_volume: tph * dec!(10),
            total_transactions: 0,
            tph,
            tplh,
            upt: dec!(0),
            department_tph: dec!(10),
            efficiency_variance_pct: variance,
        }
    }

    fn report(combined: Option<CombinedKpis>) -> SnapshotReport {
        SnapshotReport {
            transactions: None,
            labor: None,
            combined,
            balance: None,
            vas: None,
            cart: None,
            assessment: Assessment::default(),
            diagnostics: Diagnostics::default(),
        }
    }

    fn titles(insights: &[Insight]) -> Vec<&str> {
        insights.iter().map(|i| i.title.as_str()).collect()
    }

    #[test]
    fn test_rating_bands() {
        assert_eq!(TplhRating::rate(dec!(7.99)), TplhRating::Poor);
        assert_eq!(TplhRating::rate(dec!(12)), TplhRating::Good);
        assert_eq!(TplhRating::rate(dec!(19.9)), TplhRating::VeryGood);
        assert_eq!(TplhRating::rate(dec!(20)), TplhRating::Excellent);
        assert_eq!(TphRating::rate(dec!(150)), TphRating::AboveTarget);
        assert_eq!(TphRating::rate(dec!(150.1)), TphRating::WellAboveTarget);
        assert_eq!(VarianceClass::rate(dec!(-5)), VarianceClass::Excellent);
        assert_eq!(VarianceClass::rate(dec!(20)), VarianceClass::Watch);
        assert_eq!(VarianceClass::rate(dec!(20.5)), VarianceClass::Poor);
        assert_eq!(VasPerformanceClass::rate(dec!(95)), VasPerformanceClass::Acceptable);
    }

    #[test]
    fn test_tplh_insight_bands() {
        let low = generate_insights(&report(Some(combined(dec!(7), dec!(100), None))));
        assert_eq!(titles(&low), vec!["Low TPLH Performance"]);

        let fair = generate_insights(&report(Some(combined(dec!(10), dec!(100), None))));
        assert!(fair.is_empty());

        let good = generate_insights(&report(Some(combined(dec!(20), dec!(100), None))));
        assert_eq!(titles(&good), vec!["Good TPLH Performance"]);

        let excellent = generate_insights(&report(Some(combined(dec!(21), dec!(100), None))));
        assert_eq!(excellent[0].kind, InsightKind::Success);
        assert_eq!(excellent[0].title, "Excellent TPLH Performance");
    }

    #[test]
    fn test_insight_order() {
        let mut r = report(Some(combined(dec!(7), dec!(200), Some(dec!(-30)))));
        r.balance = Some(ReceiptPutBalance {
            receipts: 100,
            puts: 50,
            ratio: dec!(0.5),
            balanced: false,
        });
        let insights = generate_insights(&r);
        assert_eq!(
            titles(&insights),
            vec![
                "Low TPLH Performance",
                "High TPH Performance",
                "High Variance Between Actual and Labor Data",
                "More Receipts Than Puts",
            ]
        );
        assert_eq!(insights[2].message, "30.0% variance between actual TPLH and labor-reported TPH.");
    }

    #[test]
    fn test_anomalies() {
        assert_eq!(detect_anomalies(&report(Some(combined(dec!(2), dec!(100), None)))).len(), 1);
        assert_eq!(detect_anomalies(&report(Some(combined(dec!(31), dec!(100), None)))).len(), 1);
        assert!(detect_anomalies(&report(Some(combined(dec!(15), dec!(100), None)))).is_empty());
        assert!(detect_anomalies(&report(None)).is_empty());
    }
}
