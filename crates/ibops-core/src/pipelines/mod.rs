//! Page pipelines.
//!
//! Every page runs the same engine: normalize with the page's
//! [`FieldMap`], classify against a compiled rule set, fold into an
//! [`Aggregator`], then optionally run the volume pass. The page modules
//! only differ in configuration and in the report they build from the
//! folded result.

pub mod air_ground;
pub mod hours;
pub mod ppa;
pub mod snapshot;

use std::collections::BTreeSet;

use crate::aggregate::{AggregateResult, Aggregator, ExclusionSets, TimeUnit};
use crate::classify::{classify, CompiledRuleSet};
use crate::diagnostics::{Diagnostics, LookupFallback, RowIssue, RowLookupMiss};
use crate::error::IbopsError;
use crate::item_master::LookupStrategy;
use crate::model::{NormalizedRow, RawRow};
use crate::parsing::normalize::{normalize_all, FieldMap};
use crate::volume::{VolumeDecision, VolumeReclassifier};

/// Rows of one run with the categories each was classified into.
#[derive(Debug, Clone)]
pub struct ClassifiedRows {
    pub rows: Vec<NormalizedRow>,
    /// Parallel to `rows`.
    pub categories: Vec<BTreeSet<String>>,
    pub diagnostics: Diagnostics,
}

impl ClassifiedRows {
    pub fn iter(&self) -> impl Iterator<Item = (&NormalizedRow, &BTreeSet<String>)> {
        self.rows.iter().zip(&self.categories)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keep only rows matching `keep`, preserving order.
    pub fn filtered(&self, keep: impl Fn(&NormalizedRow) -> bool) -> ClassifiedRows {
        let (rows, categories) = self
            .iter()
            .filter(|(row, _)| keep(row))
            .map(|(row, cats)| (row.clone(), cats.clone()))
            .unzip();
        ClassifiedRows {
            rows,
            categories,
            diagnostics: self.diagnostics.clone(),
        }
    }
}

/// Normalize and classify raw rows. Fails only when the input has no rows
/// at all or none survive normalization.
pub fn classify_rows(
    raw_rows: &[RawRow],
    map: &FieldMap,
    ruleset: &CompiledRuleSet,
) -> Result<ClassifiedRows, IbopsError> {
    if raw_rows.is_empty() {
        return Err(IbopsError::NoUsableRows("input has no data rows".into()));
    }

    let normalized = normalize_all(raw_rows, map);
    if normalized.rows.is_empty() {
        return Err(IbopsError::NoUsableRows(format!(
            "all {} row(s) lack an identifier or location",
            raw_rows.len()
        )));
    }

    let categories = normalized
        .rows
        .iter()
        .map(|row| classify(row, ruleset))
        .collect();

    Ok(ClassifiedRows {
        rows: normalized.rows,
        categories,
        diagnostics: Diagnostics {
            skipped_rows: normalized.skipped,
            ..Default::default()
        },
    })
}

/// Fold classified rows in input order.
pub fn fold_rows(
    classified: &ClassifiedRows,
    ruleset: &CompiledRuleSet,
    time_unit: TimeUnit,
) -> AggregateResult {
    let mut aggregator = Aggregator::for_ruleset(ruleset, time_unit);
    for (row, cats) in classified.iter() {
        aggregator.fold(row, cats);
    }
    aggregator.finalize()
}

/// Volume decision for one row in the movement category.
#[derive(Debug, Clone)]
pub struct RowVolume<'r> {
    pub row: &'r NormalizedRow,
    pub categories: &'r BTreeSet<String>,
    pub decision: VolumeDecision,
}

/// Second pass: reclassify every movement row against the finished
/// exclusion sets, recording unusable rows and lookup misses.
pub fn volume_pass<'r>(
    classified: &'r ClassifiedRows,
    reclassifier: &VolumeReclassifier<'_>,
    exclusions: &ExclusionSets,
    diagnostics: &mut Diagnostics,
) -> Vec<RowVolume<'r>> {
    let mut out = Vec::new();

    for (row, cats) in classified.iter() {
        let decision = reclassifier.reclassify(row, cats, exclusions);
        match &decision {
            VolumeDecision::NotApplicable => continue,
            VolumeDecision::Excluded => {}
            VolumeDecision::Unusable(kind) => diagnostics.row_issues.push(RowIssue {
                index: row.index,
                identifier: row.identifier.clone(),
                location: row.location.clone(),
                kind: *kind,
            }),
            VolumeDecision::Miss(miss) => {
                tracing::warn!(row = row.index, item = %miss.item, reason = ?miss.reason, "item master miss");
                diagnostics.lookup_misses.push(RowLookupMiss {
                    index: row.index,
                    identifier: row.identifier.clone(),
                    location: row.location.clone(),
                    miss: miss.clone(),
                });
            }
            VolumeDecision::Measured(m) => {
                if m.strategy != LookupStrategy::Direct {
                    diagnostics.lookup_fallbacks.push(LookupFallback {
                        index: row.index,
                        item: row.item.as_ref().map(|i| i.raw.to_string()).unwrap_or_default(),
                        strategy: m.strategy,
                    });
                }
            }
        }
        out.push(RowVolume {
            row,
            categories: cats,
            decision,
        });
    }

    out
}
