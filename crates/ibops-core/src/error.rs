use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum IbopsError {
    #[error("failed to read spreadsheet: {0}")]
    Spreadsheet(String),

    #[error("cannot read rule file {}: {reason}", path.display())]
    RulesetLoad { path: PathBuf, reason: String },

    #[error("rule set rejected: {0}")]
    RulesetInvalid(String),

    #[error("failed to load item master: {0}")]
    ItemMasterLoad(String),

    #[error("no usable rows: {0}")]
    NoUsableRows(String),

    #[error("invalid comparison period '{period}': {reason}")]
    InvalidPeriod { period: String, reason: String },

    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}
