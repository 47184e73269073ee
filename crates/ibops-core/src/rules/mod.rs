pub mod builtin;
pub mod schema;

use crate::error::IbopsError;
use schema::{LaborMapDef, MatcherDef, RuleSetDef, TargetsDef};
use std::collections::BTreeSet;
use std::path::Path;

/// Load a ruleset from a JSON file.
pub fn load_ruleset(path: &Path) -> Result<RuleSetDef, IbopsError> {
    let content = read_rule_file(path)?;
    parse_ruleset(&content, path)
}

/// Parse a ruleset from a JSON string.
pub fn parse_ruleset(json: &str, source: &Path) -> Result<RuleSetDef, IbopsError> {
    let ruleset: RuleSetDef = serde_json::from_str(json).map_err(|e| IbopsError::RulesetLoad {
        path: source.to_path_buf(),
        reason: e.to_string(),
    })?;
    validate_ruleset(&ruleset)?;
    Ok(ruleset)
}

/// Parse a ruleset from a JSON string (no file path context).
pub fn parse_ruleset_str(json: &str) -> Result<RuleSetDef, IbopsError> {
    let ruleset: RuleSetDef = serde_json::from_str(json).map_err(IbopsError::Json)?;
    validate_ruleset(&ruleset)?;
    Ok(ruleset)
}

/// Validate that a ruleset is well-formed.
pub fn validate_ruleset(ruleset: &RuleSetDef) -> Result<(), IbopsError> {
    if ruleset.categories.is_empty() {
        return Err(IbopsError::RulesetInvalid(
            "categories must not be empty".into(),
        ));
    }

    let mut seen = BTreeSet::new();
    for cat in &ruleset.categories {
        if cat.name.trim().is_empty() {
            return Err(IbopsError::RulesetInvalid(
                "category name must not be empty".into(),
            ));
        }
        if !seen.insert(cat.name.as_str()) {
            return Err(IbopsError::RulesetInvalid(format!(
                "duplicate category '{}'",
                cat.name
            )));
        }

        match &cat.matcher {
            MatcherDef::LocationIn { values } => {
                if values.is_empty() {
                    return Err(IbopsError::RulesetInvalid(format!(
                        "category '{}' has an empty location list",
                        cat.name
                    )));
                }
            }
            MatcherDef::LocationPattern { pattern }
            | MatcherDef::LocationSegment { pattern, .. } => {
                regex::Regex::new(pattern).map_err(|e| {
                    IbopsError::RulesetInvalid(format!(
                        "category '{}' has an invalid pattern '{}': {}",
                        cat.name, pattern, e
                    ))
                })?;
            }
            MatcherDef::TransactionType { code, .. } => {
                if code.trim().is_empty() {
                    return Err(IbopsError::RulesetInvalid(format!(
                        "category '{}' has an empty transaction code",
                        cat.name
                    )));
                }
            }
        }
    }

    if let Some(ref volume) = ruleset.volume {
        let referenced = std::iter::once(&volume.movement).chain(volume.priority.as_ref());
        for name in referenced {
            if !seen.contains(name.as_str()) {
                return Err(IbopsError::RulesetInvalid(format!(
                    "volume rule references unknown category '{}'",
                    name
                )));
            }
        }
        if volume.priority.as_deref() == Some(volume.movement.as_str()) {
            return Err(IbopsError::RulesetInvalid(
                "volume movement and priority categories must differ".into(),
            ));
        }
    }

    Ok(())
}

/// Load a labor-function map from a JSON file.
pub fn load_labor_map(path: &Path) -> Result<LaborMapDef, IbopsError> {
    let content = read_rule_file(path)?;
    let map: LaborMapDef =
        serde_json::from_str(&content).map_err(|e| IbopsError::RulesetLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_labor_map(&map)?;
    Ok(map)
}

pub fn parse_labor_map_str(json: &str) -> Result<LaborMapDef, IbopsError> {
    let map: LaborMapDef = serde_json::from_str(json)?;
    validate_labor_map(&map)?;
    Ok(map)
}

pub fn validate_labor_map(map: &LaborMapDef) -> Result<(), IbopsError> {
    if map.categories.is_empty() {
        return Err(IbopsError::RulesetInvalid(
            "labor categories must not be empty".into(),
        ));
    }
    let mut seen = BTreeSet::new();
    for cat in &map.categories {
        if !seen.insert(cat.name.as_str()) {
            return Err(IbopsError::RulesetInvalid(format!(
                "duplicate labor category '{}'",
                cat.name
            )));
        }
        if cat.functions.iter().any(|f| f.trim().is_empty()) {
            return Err(IbopsError::RulesetInvalid(format!(
                "labor category '{}' lists an empty function name",
                cat.name
            )));
        }
    }
    Ok(())
}

pub fn parse_targets_str(json: &str) -> Result<TargetsDef, IbopsError> {
    let targets: TargetsDef = serde_json::from_str(json)?;
    if targets
        .vas_target_uph
        .values()
        .any(|v| *v <= rust_decimal::Decimal::ZERO)
    {
        return Err(IbopsError::RulesetInvalid(
            "VAS target UPH values must be positive".into(),
        ));
    }
    Ok(targets)
}

fn read_rule_file(path: &Path) -> Result<String, IbopsError> {
    std::fs::read_to_string(path).map_err(|e| IbopsError::RulesetLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
