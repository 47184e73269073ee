pub mod labor;
pub mod normalize;
pub mod values;

use serde::Serialize;

/// A pasted-text line that was not used, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    pub line_text: String,
    pub reason: String,
}

impl SkippedLine {
    pub fn new(line_text: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            line_text: line_text.into(),
            reason: reason.into(),
        }
    }
}
