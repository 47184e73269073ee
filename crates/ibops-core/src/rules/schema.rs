use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named, ordered set of row categories and how to recognize them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSetDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    /// Evaluated independently; a row may land in several categories.
    pub categories: Vec<CategoryRuleDef>,
    /// Volume reclassification settings, for rule sets that use it.
    #[serde(default)]
    pub volume: Option<VolumeRuleDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRuleDef {
    pub name: String,
    /// Display name; defaults to `name`.
    #[serde(default)]
    pub label: Option<String>,
    pub matcher: MatcherDef,
}

impl CategoryRuleDef {
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatcherDef {
    /// Location code is one of `values` (compared upper-cased).
    LocationIn { values: Vec<String> },
    /// Location matches a case-insensitive regex.
    LocationPattern { pattern: String },
    /// The `index`-th dash-separated location segment (empty when absent)
    /// contains a match for `pattern`, or does not when `negate` is set.
    LocationSegment {
        index: usize,
        pattern: String,
        #[serde(default)]
        negate: bool,
    },
    /// Transaction-type code equality, optionally restricted to From
    /// Locations starting with a prefix.
    TransactionType {
        code: String,
        #[serde(default)]
        from_location_prefix: Option<String>,
    },
}

/// Which category feeds volume reclassification, and which category's
/// identifiers are excluded from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeRuleDef {
    pub movement: String,
    #[serde(default)]
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Function name must equal a listed name.
    #[default]
    Exact,
    /// Exact matches across all buckets first; otherwise the first bucket
    /// (in declaration order) with a listed name contained in the function
    /// name.
    ExactThenContains,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaborKind {
    Direct,
    Indirect,
    /// Customer returns; reported apart from inbound coverage.
    Returns,
}

/// Labor-function buckets for a pasted labor report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaborMapDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    #[serde(default)]
    pub match_mode: MatchMode,
    pub categories: Vec<LaborCategoryDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaborCategoryDef {
    pub name: String,
    pub kind: LaborKind,
    /// Labor-function names, case-sensitive.
    pub functions: Vec<String>,
}

/// Productivity targets for the snapshot view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetsDef {
    pub name: String,
    pub version: String,
    /// VAS From Location -> target units per hour.
    pub vas_target_uph: BTreeMap<String, Decimal>,
    pub cart_target_tplh: Decimal,
}
