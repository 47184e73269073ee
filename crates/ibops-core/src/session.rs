//! Everything one analysis run reads but never changes.

use std::path::Path;

use crate::classify::CompiledRuleSet;
use crate::error::IbopsError;
use crate::item_master::ItemMaster;
use crate::labor::LaborCategorizer;
use crate::rules::builtin::{load_labor_preset, load_preset, load_targets};
use crate::rules::schema::{LaborMapDef, RuleSetDef, TargetsDef};

/// Reference data and rules for a run, passed explicitly into every
/// pipeline.
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    item_master: Option<ItemMaster>,
    ppa: CompiledRuleSet,
    air_ground: CompiledRuleSet,
    transactions: CompiledRuleSet,
    hours_labor: LaborCategorizer,
    snapshot_labor: LaborCategorizer,
    targets: TargetsDef,
}

impl AnalysisSession {
    /// Session built from the embedded rule presets, without an item
    /// master.
    pub fn with_builtin_rules() -> Result<Self, IbopsError> {
        Ok(Self {
            item_master: None,
            ppa: CompiledRuleSet::compile(&load_preset("ppa")?)?,
            air_ground: CompiledRuleSet::compile(&load_preset("air-ground")?)?,
            transactions: CompiledRuleSet::compile(&load_preset("transactions")?)?,
            hours_labor: LaborCategorizer::new(&load_labor_preset("labor-hours")?),
            snapshot_labor: LaborCategorizer::new(&load_labor_preset("labor-snapshot")?),
            targets: load_targets()?,
        })
    }

    pub fn with_item_master(mut self, item_master: ItemMaster) -> Self {
        self.item_master = Some(item_master);
        self
    }

    /// Load the item master JSON resource from disk.
    pub fn load_item_master(self, path: &Path) -> Result<Self, IbopsError> {
        let json = std::fs::read_to_string(path)?;
        Ok(self.with_item_master(ItemMaster::from_json(&json)?))
    }

    pub fn with_ppa_rules(mut self, def: &RuleSetDef) -> Result<Self, IbopsError> {
        self.ppa = CompiledRuleSet::compile(def)?;
        Ok(self)
    }

    pub fn with_air_ground_rules(mut self, def: &RuleSetDef) -> Result<Self, IbopsError> {
        let compiled = CompiledRuleSet::compile(def)?;
        crate::pipelines::air_ground::check_ruleset(&compiled)?;
        self.air_ground = compiled;
        Ok(self)
    }

    pub fn with_hours_labor_map(mut self, map: &LaborMapDef) -> Self {
        self.hours_labor = LaborCategorizer::new(map);
        self
    }

    pub fn with_snapshot_labor_map(mut self, map: &LaborMapDef) -> Self {
        self.snapshot_labor = LaborCategorizer::new(map);
        self
    }

    pub fn item_master(&self) -> Option<&ItemMaster> {
        self.item_master.as_ref()
    }

    pub fn ppa_rules(&self) -> &CompiledRuleSet {
        &self.ppa
    }

    pub fn air_ground_rules(&self) -> &CompiledRuleSet {
        &self.air_ground
    }

    pub fn transaction_rules(&self) -> &CompiledRuleSet {
        &self.transactions
    }

    pub fn hours_labor(&self) -> &LaborCategorizer {
        &self.hours_labor
    }

    pub fn snapshot_labor(&self) -> &LaborCategorizer {
        &self.snapshot_labor
    }

    pub fn targets(&self) -> &TargetsDef {
        &self.targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_session() {
        let session = AnalysisSession::with_builtin_rules().unwrap();
        assert!(session.item_master().is_none());
        assert_eq!(session.ppa_rules().categories.len(), 3);
        assert_eq!(session.targets().vas_target_uph.len(), 14);
    }

    #[test]
    fn test_air_ground_rules_need_air_and_ground() {
        let ppa = load_preset("ppa").unwrap();
        let err = AnalysisSession::with_builtin_rules()
            .unwrap()
            .with_air_ground_rules(&ppa)
            .unwrap_err();
        assert!(matches!(err, IbopsError::RulesetInvalid(_)));
    }
}
