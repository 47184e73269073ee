use crate::error::IbopsError;
use crate::model::NormalizedRow;
use crate::rules::schema::{MatcherDef, RuleSetDef, VolumeRuleDef};
use crate::rules::validate_ruleset;
use regex::{Regex, RegexBuilder};
use std::collections::BTreeSet;

/// A matcher with its regexes compiled and location lists indexed.
#[derive(Debug, Clone)]
pub enum Matcher {
    LocationIn(BTreeSet<String>),
    LocationPattern(Regex),
    LocationSegment {
        index: usize,
        regex: Regex,
        negate: bool,
    },
    TransactionType {
        code: String,
        from_location_prefix: Option<String>,
    },
}

impl Matcher {
    fn compile(def: &MatcherDef) -> Result<Self, IbopsError> {
        Ok(match def {
            MatcherDef::LocationIn { values } => Matcher::LocationIn(
                values.iter().map(|v| v.trim().to_uppercase()).collect(),
            ),
            MatcherDef::LocationPattern { pattern } => {
                Matcher::LocationPattern(case_insensitive(pattern)?)
            }
            MatcherDef::LocationSegment {
                index,
                pattern,
                negate,
            } => Matcher::LocationSegment {
                index: *index,
                regex: case_insensitive(pattern)?,
                negate: *negate,
            },
            MatcherDef::TransactionType {
                code,
                from_location_prefix,
            } => Matcher::TransactionType {
                code: code.trim().to_string(),
                from_location_prefix: from_location_prefix
                    .as_ref()
                    .map(|p| p.trim().to_uppercase()),
            },
        })
    }

    /// Pure predicate over the row's location and transaction fields.
    pub fn matches(&self, row: &NormalizedRow) -> bool {
        match self {
            Matcher::LocationIn(values) => values.contains(&row.location),
            Matcher::LocationPattern(regex) => regex.is_match(&row.location),
            Matcher::LocationSegment {
                index,
                regex,
                negate,
            } => regex.is_match(location_segment(&row.location, *index)) != *negate,
            Matcher::TransactionType {
                code,
                from_location_prefix,
            } => {
                if row.transaction_type.as_deref() != Some(code.as_str()) {
                    return false;
                }
                match from_location_prefix {
                    Some(prefix) => row
                        .from_location
                        .as_deref()
                        .is_some_and(|from| from.starts_with(prefix.as_str())),
                    None => true,
                }
            }
        }
    }
}

fn case_insensitive(pattern: &str) -> Result<Regex, IbopsError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| IbopsError::RulesetInvalid(format!("invalid pattern '{}': {}", pattern, e)))
}

/// The `index`-th dash-separated segment of a location, or "" when the
/// location has fewer segments.
pub fn location_segment(location: &str, index: usize) -> &str {
    location.split('-').nth(index).unwrap_or("")
}

#[derive(Debug, Clone)]
pub struct CompiledCategory {
    pub name: String,
    pub label: String,
    pub matcher: Matcher,
}

/// A validated ruleset ready to classify rows. Read-only once built.
#[derive(Debug, Clone)]
pub struct CompiledRuleSet {
    pub name: String,
    pub version: String,
    pub categories: Vec<CompiledCategory>,
    pub volume: Option<VolumeRuleDef>,
}

impl CompiledRuleSet {
    pub fn compile(def: &RuleSetDef) -> Result<Self, IbopsError> {
        validate_ruleset(def)?;
        let categories = def
            .categories
            .iter()
            .map(|c| {
                Ok(CompiledCategory {
                    name: c.name.clone(),
                    label: c.display_name().to_string(),
                    matcher: Matcher::compile(&c.matcher)?,
                })
            })
            .collect::<Result<Vec<_>, IbopsError>>()?;

        Ok(Self {
            name: def.name.clone(),
            version: def.version.clone(),
            categories,
            volume: def.volume.clone(),
        })
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    pub fn label(&self, category: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.name == category)
            .map(|c| c.label.as_str())
    }
}

/// Every category whose matcher accepts the row. May be empty.
pub fn classify(row: &NormalizedRow, ruleset: &CompiledRuleSet) -> BTreeSet<String> {
    ruleset
        .categories
        .iter()
        .filter(|c| c.matcher.matches(row))
        .map(|c| c.name.clone())
        .collect()
}
