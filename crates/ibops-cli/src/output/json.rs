use ibops_core::error::IbopsError;
use serde::Serialize;

pub fn print<T: Serialize>(result: &T) -> Result<(), IbopsError> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}
