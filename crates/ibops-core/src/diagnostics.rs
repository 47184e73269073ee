use crate::item_master::{LookupMiss, LookupStrategy, MissReason};
use serde::{Deserialize, Serialize};

/// An input row dropped before classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub index: usize,
    pub reason: String,
}

impl SkippedRow {
    pub fn new(index: usize, reason: impl Into<String>) -> Self {
        Self {
            index,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingItem,
    InvalidQuantity,
    /// Cubic volume times quantity does not fit in a decimal.
    VolumeOverflow,
}

/// A row kept for counting but left out of volume analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowIssue {
    pub index: usize,
    pub identifier: String,
    pub location: String,
    pub kind: IssueKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowLookupMiss {
    pub index: usize,
    pub identifier: String,
    pub location: String,
    #[serde(flatten)]
    pub miss: LookupMiss,
}

/// A lookup that only succeeded through a fallback strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupFallback {
    pub index: usize,
    pub item: String,
    pub strategy: LookupStrategy,
}

/// Everything a run skipped or could not resolve. Never an error by itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_rows: Vec<SkippedRow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub row_issues: Vec<RowIssue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lookup_misses: Vec<RowLookupMiss>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lookup_fallbacks: Vec<LookupFallback>,
}

impl Diagnostics {
    pub fn is_clean(&self) -> bool {
        self.skipped_rows.is_empty()
            && self.row_issues.is_empty()
            && self.lookup_misses.is_empty()
    }

    pub fn items_not_found(&self) -> usize {
        self.count_misses(MissReason::NotFound)
    }

    pub fn invalid_volumes(&self) -> usize {
        self.count_misses(MissReason::InvalidVolume)
    }

    fn count_misses(&self, reason: MissReason) -> usize {
        self.lookup_misses
            .iter()
            .filter(|m| m.miss.reason == reason)
            .count()
    }

    /// One-line tally for logs and table output.
    pub fn summary(&self) -> String {
        format!(
            "{} skipped row(s), {} row issue(s), {} item(s) not found, {} invalid volume(s)",
            self.skipped_rows.len(),
            self.row_issues.len(),
            self.items_not_found(),
            self.invalid_volumes()
        )
    }
}
