use ibops_core::error::IbopsError;
use ibops_core::rules::builtin;
use ibops_core::rules::schema::{LaborMapDef, MatchMode, MatcherDef, RuleSetDef};
use std::path::Path;

pub fn list() -> Result<(), IbopsError> {
    println!("Available predefined rule sets:\n");
    for name in builtin::PRESETS {
        let rs = builtin::load_preset(name)?;
        println!("  {:<16} {} (v{})", name, rs.name, rs.version);
        if let Some(ref desc) = rs.description {
            println!("                   {}", desc);
        }
        println!();
    }

    println!("Available labor-function maps:\n");
    for name in builtin::LABOR_PRESETS {
        let map = builtin::load_labor_preset(name)?;
        println!(
            "  {:<16} {} (v{}, {} buckets)",
            name,
            map.name,
            map.version,
            map.categories.len()
        );
        if let Some(ref desc) = map.description {
            println!("                   {}", desc);
        }
        println!();
    }
    Ok(())
}

pub fn explain(preset: &str) -> Result<(), IbopsError> {
    if builtin::is_labor_preset(preset) {
        explain_labor(&builtin::load_labor_preset(preset)?);
        return Ok(());
    }
    explain_ruleset(&builtin::load_preset(preset)?);
    Ok(())
}

fn describe_matcher(matcher: &MatcherDef) -> String {
    match matcher {
        MatcherDef::LocationIn { values } => format!("location is one of: {}", values.join(", ")),
        MatcherDef::LocationPattern { pattern } => format!("location matches /{}/", pattern),
        MatcherDef::LocationSegment {
            index,
            pattern,
            negate,
        } => format!(
            "location segment {} {} /{}/",
            index + 1,
            if *negate { "does not contain" } else { "contains" },
            pattern
        ),
        MatcherDef::TransactionType {
            code,
            from_location_prefix,
        } => match from_location_prefix {
            Some(prefix) => format!("transaction type {} from a {}* location", code, prefix),
            None => format!("transaction type {}", code),
        },
    }
}

fn explain_ruleset(rs: &RuleSetDef) {
    println!("{} (version {})\n", rs.name, rs.version);
    if let Some(ref desc) = rs.description {
        println!("{}\n", desc);
    }

    println!(
        "Each row is tested against {} categories independently:\n",
        rs.categories.len()
    );
    for cat in &rs.categories {
        println!("  {} [{}]", cat.display_name(), cat.name);
        println!("    {}", describe_matcher(&cat.matcher));
        println!();
    }

    if let Some(ref volume) = rs.volume {
        println!(
            "Rows in '{}' are looked up in the item master; quantity x cubic volume",
            volume.movement
        );
        println!("below 5000 marks the row as small enough for a cart.");
        if let Some(ref priority) = volume.priority {
            println!(
                "Identifiers already counted in '{}' are left out of that check.",
                priority
            );
        }
        println!();
    }
}

fn explain_labor(map: &LaborMapDef) {
    println!("{} (version {})\n", map.name, map.version);
    if let Some(ref desc) = map.description {
        println!("{}\n", desc);
    }
    match map.match_mode {
        MatchMode::Exact => println!("Function names must match exactly.\n"),
        MatchMode::ExactThenContains => println!(
            "Exact function names win; otherwise the first bucket whose name list\n\
             is contained in the function name.\n"
        ),
    }

    let width = map
        .categories
        .iter()
        .map(|c| c.name.len())
        .max()
        .unwrap_or(10);
    for cat in &map.categories {
        println!(
            "  {:<width$}  {:<9} {}",
            cat.name,
            format!("{:?}", cat.kind).to_lowercase(),
            cat.functions.join(", "),
            width = width
        );
    }
    println!();
}

pub fn schema() -> Result<(), IbopsError> {
    print!(
        r#"JSON Rule Schema
================

A rule file defines the categories rows are counted into. Every category
is tested independently, so a row can land in several of them.

Top-level fields:
  name          (string, required)  Human-readable name of the rule set
  description   (string, optional)  What this rule set is for
  version       (string, required)  Version identifier (e.g., "2024.1")
  categories    (array, required)   Category definitions (see below)
  volume        (object, optional)  Volume reclassification settings

Each category:
  name          (string, required)  Unique key used in reports
  label         (string, optional)  Display name
  matcher       (object, required)  One of:
    {{"kind": "location_in", "values": ["REC6701", ...]}}
    {{"kind": "location_pattern", "pattern": "^\\d{{2}}-\\d{{2}}-[A-Z0-9]{{3}}$"}}
    {{"kind": "location_segment", "index": 2, "pattern": "[ABC]", "negate": false}}
    {{"kind": "transaction_type", "code": "212", "from_location_prefix": "MOVEXX"}}

volume:
  movement      (string, required)  Category whose rows are volume-checked
  priority      (string, optional)  Category whose identifiers are skipped

Example:
{{
  "name": "Dock doors",
  "version": "1.0",
  "categories": [
    {{
      "name": "reach",
      "label": "Reach Truck",
      "matcher": {{ "kind": "location_in", "values": ["REC6701", "REC7401"] }}
    }},
    {{
      "name": "cart",
      "matcher": {{ "kind": "location_in", "values": ["REC6702"] }}
    }}
  ],
  "volume": {{ "movement": "reach", "priority": "cart" }}
}}

Labor-function maps use "match_mode" ("exact" or "exact_then_contains")
and categories of {{"name", "kind": "direct|indirect|returns", "functions"}}.
Run `ibops rules explain labor-hours` for an example.
"#
    );
    Ok(())
}

/// Labor maps list function names per bucket; rule sets carry matchers.
fn is_labor_map(content: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(content)
        .ok()
        .and_then(|v| {
            v.get("categories")?
                .as_array()?
                .first()
                .map(|c| c.get("functions").is_some())
        })
        .unwrap_or(false)
}

pub fn validate(file: &Path) -> Result<(), IbopsError> {
    let content = std::fs::read_to_string(file)?;

    if is_labor_map(&content) {
        let map = ibops_core::rules::load_labor_map(file)?;
        println!("Labor map '{}' (v{}) is valid.", map.name, map.version);
        println!("  Buckets: {}", map.categories.len());
        let empty: Vec<&str> = map
            .categories
            .iter()
            .filter(|c| c.functions.is_empty())
            .map(|c| c.name.as_str())
            .collect();
        if !empty.is_empty() {
            println!("\nWarnings:");
            println!("  - buckets without functions: {}", empty.join(", "));
        }
        return Ok(());
    }

    let rs = ibops_core::rules::load_ruleset(file)?;
    println!("Rule set '{}' (v{}) is valid.", rs.name, rs.version);
    let names: Vec<&str> = rs.categories.iter().map(|c| c.name.as_str()).collect();
    println!("  Categories: {}", names.join(", "));
    if let Some(ref volume) = rs.volume {
        println!("  Volume movement: {}", volume.movement);
    }
    Ok(())
}
