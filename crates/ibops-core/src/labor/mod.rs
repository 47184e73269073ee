//! Labor-function categorization.
//!
//! Free-text labor-function names from a pasted report are mapped onto the
//! buckets of a [`LaborMapDef`]. Matching is case-sensitive. In
//! [`MatchMode::ExactThenContains`] an exact name anywhere in the map beats
//! any substring match; substring ties go to the bucket declared first.

pub mod breakdown;

use crate::rules::schema::{LaborCategoryDef, LaborKind, LaborMapDef, MatchMode};

pub use breakdown::{
    compare_shares, CategoryTotals, FunctionHours, LaborBreakdown, ShareComparison, ShareShift,
    ShiftDirection,
};

#[derive(Debug, Clone)]
pub struct LaborCategorizer {
    name: String,
    mode: MatchMode,
    categories: Vec<LaborCategoryDef>,
}

impl LaborCategorizer {
    pub fn new(map: &LaborMapDef) -> Self {
        Self {
            name: map.name.clone(),
            mode: map.match_mode,
            categories: map.categories.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn categories(&self) -> &[LaborCategoryDef] {
        &self.categories
    }

    pub fn kind_of(&self, category: &str) -> Option<LaborKind> {
        self.categories
            .iter()
            .find(|c| c.name == category)
            .map(|c| c.kind)
    }

    /// Bucket for a labor-function name, or `None` when unmatched.
    ///
    /// An exact name in any bucket beats a substring hit in an earlier one,
    /// so "Customer Returns Unloader" lands in Customer Returns even though
    /// an earlier bucket lists "Unloader". Substring hits then go by
    /// declaration order.
    pub fn categorize(&self, function_name: &str) -> Option<&LaborCategoryDef> {
        let exact = self
            .categories
            .iter()
            .find(|c| c.functions.iter().any(|f| f == function_name));
        if exact.is_some() || self.mode == MatchMode::Exact {
            return exact;
        }

        self.categories.iter().find(|c| {
            c.functions
                .iter()
                .any(|f| function_name.contains(f.as_str()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::builtin::load_labor_preset;

    fn snapshot() -> LaborCategorizer {
        LaborCategorizer::new(&load_labor_preset("labor-snapshot").unwrap())
    }

    fn hours() -> LaborCategorizer {
        LaborCategorizer::new(&load_labor_preset("labor-hours").unwrap())
    }

    #[test]
    fn test_exact_match() {
        let c = hours();
        assert_eq!(c.categorize("Reach-Truck Putaway").unwrap().name, "Putaway");
        assert_eq!(c.categorize("Breakdown Receiver").unwrap().name, "Breakdown");
    }

    #[test]
    fn test_exact_mode_ignores_substrings() {
        assert!(hours().categorize("Reach-Truck Putaway Trainee").is_none());
        assert!(hours().categorize("reach-truck putaway").is_none());
    }

    #[test]
    fn test_exact_beats_earlier_substring() {
        // contains "Unloader" (Receiving Support) but is listed exactly under returns
        let c = snapshot();
        let cat = c.categorize("Customer Returns Unloader").unwrap();
        assert_eq!(cat.name, "Customer Returns");
        assert_eq!(cat.kind, LaborKind::Returns);
    }

    #[test]
    fn test_substring_first_declared_wins() {
        // "Receiving" (Direct Receiving) is declared before "VAS" (VAS Functions)
        let c = snapshot();
        assert_eq!(c.categorize("VAS Receiving Lead").unwrap().name, "Direct Receiving");
        assert_eq!(c.categorize("VAS Kitting").unwrap().name, "VAS Functions");
    }

    #[test]
    fn test_unmatched() {
        assert!(snapshot().categorize("Mystery Function").is_none());
    }
}
