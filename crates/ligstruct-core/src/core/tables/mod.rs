//! Element-keyed reference tables: standard bond lengths and van der Waals radii.

pub mod bond_lengths;
pub mod vdw;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid value for '{key}' in '{path}': {value}")]
    InvalidValue { path: String, key: String, value: f64 },
}
