pub mod json_rows;
pub mod xlsx;

use crate::error::IbopsError;
use crate::model::RawRow;

pub use json_rows::JsonRowsReader;
pub use xlsx::XlsxReader;

/// Trait for tabular input backends: turns file bytes into raw rows keyed
/// by column header.
pub trait RowSource {
    fn read_rows(&self, bytes: &[u8]) -> Result<Vec<RawRow>, IbopsError>;

    /// Name of this backend (for diagnostics).
    fn backend_name(&self) -> &str;
}
