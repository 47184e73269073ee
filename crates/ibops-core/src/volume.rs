//! Volume-based reclassification.
//!
//! A row in the movement category (reach-truck put-away, MOD-format
//! transaction) is "small volume" when its item's unit cubic volume times
//! its quantity is strictly below [`VOLUME_THRESHOLD`]. Identifiers already
//! counted in the priority category are never considered.

use crate::aggregate::ExclusionSets;
use crate::diagnostics::IssueKind;
use crate::item_master::{ItemMaster, LookupMiss, LookupStrategy};
use crate::model::NormalizedRow;
use crate::rules::schema::VolumeRuleDef;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Total cubic volume below which a movement could have gone by cart.
pub const VOLUME_THRESHOLD: Decimal = Decimal::from_parts(5000, 0, 0, false, 0);

/// Strict comparison: exactly 5000 is not eligible.
pub fn is_volume_eligible(total_volume: Decimal) -> bool {
    total_volume < VOLUME_THRESHOLD
}

/// Distribution buckets for eligible volumes, as (upper bound, label).
/// Lower bound inclusive, upper exclusive.
pub const VOLUME_RANGES: [(Decimal, &str); 5] = [
    (Decimal::from_parts(100, 0, 0, false, 0), "0-100"),
    (Decimal::from_parts(500, 0, 0, false, 0), "100-500"),
    (Decimal::from_parts(1000, 0, 0, false, 0), "500-1000"),
    (Decimal::from_parts(2500, 0, 0, false, 0), "1000-2500"),
    (VOLUME_THRESHOLD, "2500-5000"),
];

/// Distribution bucket for an eligible volume.
pub fn volume_range(total_volume: Decimal) -> &'static str {
    VOLUME_RANGES
        .iter()
        .find(|(upper, _)| total_volume < *upper)
        .map(|(_, label)| *label)
        .unwrap_or("2500-5000")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeMeasurement {
    pub cubic_volume: Decimal,
    pub quantity: Decimal,
    pub total_volume: Decimal,
    pub eligible: bool,
    pub strategy: LookupStrategy,
}

/// Outcome of volume reclassification for one row.
#[derive(Debug, Clone, PartialEq)]
pub enum VolumeDecision {
    /// Row is not in the movement category.
    NotApplicable,
    /// Identifier already counted under the priority category.
    Excluded,
    /// Item number missing, quantity not positive, or a total volume too
    /// large to represent.
    Unusable(IssueKind),
    /// Item master has no usable volume for the item.
    Miss(LookupMiss),
    Measured(VolumeMeasurement),
}

impl VolumeDecision {
    pub fn is_eligible(&self) -> bool {
        matches!(self, VolumeDecision::Measured(m) if m.eligible)
    }

    /// Whether the row counts in the "share of non-excluded items"
    /// denominator: it was a usable candidate and not excluded by priority.
    pub fn counts_as_candidate(&self) -> bool {
        matches!(self, VolumeDecision::Measured(_) | VolumeDecision::Miss(_))
    }
}

pub struct VolumeReclassifier<'a> {
    item_master: &'a ItemMaster,
    movement: String,
    priority: Option<String>,
}

impl<'a> VolumeReclassifier<'a> {
    pub fn new(
        item_master: &'a ItemMaster,
        movement: impl Into<String>,
        priority: Option<String>,
    ) -> Self {
        Self {
            item_master,
            movement: movement.into(),
            priority,
        }
    }

    pub fn from_rule(item_master: &'a ItemMaster, rule: &VolumeRuleDef) -> Self {
        Self::new(item_master, rule.movement.clone(), rule.priority.clone())
    }

    pub fn movement(&self) -> &str {
        &self.movement
    }

    /// Category name given to rows that are volume-eligible.
    pub fn eligible_category(&self) -> String {
        format!("{}_small_volume", self.movement)
    }

    pub fn reclassify(
        &self,
        row: &NormalizedRow,
        categories: &BTreeSet<String>,
        exclusions: &ExclusionSets,
    ) -> VolumeDecision {
        if !categories.contains(&self.movement) {
            return VolumeDecision::NotApplicable;
        }

        if let Some(ref priority) = self.priority {
            if exclusions
                .get(priority)
                .is_some_and(|ids| ids.contains(&row.identifier))
            {
                return VolumeDecision::Excluded;
            }
        }

        let Some(item) = row.item.as_ref().filter(|i| i.number.is_some()) else {
            return VolumeDecision::Unusable(IssueKind::MissingItem);
        };
        if row.quantity <= Decimal::ZERO {
            return VolumeDecision::Unusable(IssueKind::InvalidQuantity);
        }

        match self.item_master.lookup(item) {
            Ok(hit) => {
                let Some(total_volume) = hit.cubic_volume.checked_mul(row.quantity) else {
                    tracing::warn!(
                        row = row.index,
                        cubic_volume = %hit.cubic_volume,
                        quantity = %row.quantity,
                        "total volume overflows"
                    );
                    return VolumeDecision::Unusable(IssueKind::VolumeOverflow);
                };
                VolumeDecision::Measured(VolumeMeasurement {
                    cubic_volume: hit.cubic_volume,
                    quantity: row.quantity,
                    total_volume,
                    eligible: is_volume_eligible(total_volume),
                    strategy: hit.strategy,
                })
            }
            Err(miss) => {
                tracing::debug!(
                    row = row.index,
                    item = %miss.item,
                    reason = ?miss.reason,
                    "no usable item volume"
                );
                VolumeDecision::Miss(miss)
            }
        }
    }
}
