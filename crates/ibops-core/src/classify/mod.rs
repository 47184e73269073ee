pub mod engine;

pub use engine::{classify, location_segment, CompiledRuleSet, Matcher};
