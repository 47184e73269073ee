use crate::error::IbopsError;
use crate::rules::schema::{LaborMapDef, RuleSetDef, TargetsDef};
use crate::rules::{parse_labor_map_str, parse_ruleset_str, parse_targets_str};

const PPA_LOCATIONS_JSON: &str = include_str!("../../../../rules/ppa-locations.json");
const AIR_GROUND_JSON: &str = include_str!("../../../../rules/air-ground.json");
const TRANSACTION_FILTERS_JSON: &str = include_str!("../../../../rules/transaction-filters.json");
const LABOR_HOURS_JSON: &str = include_str!("../../../../rules/labor-hours.json");
const LABOR_SNAPSHOT_JSON: &str = include_str!("../../../../rules/labor-snapshot.json");
const VAS_TARGETS_JSON: &str = include_str!("../../../../rules/vas-targets.json");

/// Available predefined classification rulesets.
pub const PRESETS: &[&str] = &["ppa", "air-ground", "transactions"];

/// Available predefined labor-function maps.
pub const LABOR_PRESETS: &[&str] = &["labor-hours", "labor-snapshot"];

/// Check if a preset name refers to a labor-function map.
pub fn is_labor_preset(name: &str) -> bool {
    LABOR_PRESETS.contains(&name)
}

/// Load a predefined classification ruleset by name.
pub fn load_preset(name: &str) -> Result<RuleSetDef, IbopsError> {
    match name {
        "ppa" => parse_ruleset_str(PPA_LOCATIONS_JSON),
        "air-ground" => parse_ruleset_str(AIR_GROUND_JSON),
        "transactions" => parse_ruleset_str(TRANSACTION_FILTERS_JSON),
        _ if is_labor_preset(name) => Err(IbopsError::RulesetInvalid(format!(
            "'{}' is a labor-function map. Use load_labor_preset instead.",
            name
        ))),
        _ => Err(IbopsError::RulesetInvalid(format!(
            "unknown preset '{}'. Available: {}",
            name,
            PRESETS
                .iter()
                .chain(LABOR_PRESETS)
                .copied()
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}

/// Load a predefined labor-function map by name.
pub fn load_labor_preset(name: &str) -> Result<LaborMapDef, IbopsError> {
    match name {
        "labor-hours" => parse_labor_map_str(LABOR_HOURS_JSON),
        "labor-snapshot" => parse_labor_map_str(LABOR_SNAPSHOT_JSON),
        _ => Err(IbopsError::RulesetInvalid(format!(
            "unknown labor preset '{}'. Available: {}",
            name,
            LABOR_PRESETS.join(", ")
        ))),
    }
}

/// VAS target UPH table and cart TPLH target.
pub fn load_targets() -> Result<TargetsDef, IbopsError> {
    parse_targets_str(VAS_TARGETS_JSON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::schema::{LaborKind, MatchMode};
    use rust_decimal_macros::dec;

    #[test]
    fn test_all_presets_load() {
        for name in PRESETS {
            assert!(load_preset(name).is_ok(), "preset {name}");
        }
        for name in LABOR_PRESETS {
            assert!(load_labor_preset(name).is_ok(), "labor preset {name}");
        }
    }

    #[test]
    fn test_ppa_preset_shape() {
        let rs = load_preset("ppa").unwrap();
        let names: Vec<&str> = rs.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["vas", "reach", "cart"]);
        let volume = rs.volume.unwrap();
        assert_eq!(volume.movement, "reach");
        assert_eq!(volume.priority.as_deref(), Some("cart"));
    }

    #[test]
    fn test_snapshot_labor_preset() {
        let map = load_labor_preset("labor-snapshot").unwrap();
        assert_eq!(map.match_mode, MatchMode::ExactThenContains);
        assert_eq!(
            map.categories
                .iter()
                .filter(|c| c.kind == LaborKind::Returns)
                .count(),
            1
        );
    }

    #[test]
    fn test_targets() {
        let t = load_targets().unwrap();
        assert_eq!(t.vas_target_uph.len(), 14);
        assert_eq!(t.vas_target_uph["SM.SHRNKWRP"], dec!(150));
        assert_eq!(t.cart_target_tplh, dec!(19));
    }

    #[test]
    fn test_unknown_preset() {
        assert!(load_preset("xyz").is_err());
        assert!(load_preset("labor-hours").is_err());
        assert!(load_labor_preset("ppa").is_err());
    }
}
