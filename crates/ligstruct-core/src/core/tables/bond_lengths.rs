use super::TableLoadError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct BondLengthRecord {
    first: String,
    second: String,
    length: f64,
}

/// Standard bond lengths keyed by the concatenated element pair (`"CO"`, `"CH"`).
#[derive(Debug, Clone, Default)]
pub struct BondLengthTable {
    lengths: HashMap<String, f64>,
}

impl BondLengthTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(first: &str, second: &str) -> String {
        format!("{}{}", first, second)
    }

    pub fn insert(&mut self, first: &str, second: &str, length: f64) {
        self.lengths.insert(Self::key(first, second), length);
    }

    /// Looks up the pair in the requested order, then reversed.
    pub fn get(&self, first: &str, second: &str) -> Option<f64> {
        self.lengths
            .get(&Self::key(first, second))
            .or_else(|| self.lengths.get(&Self::key(second, first)))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// Loads a table from a CSV file with the header `first,second,length`.
    pub fn load_csv(path: &Path) -> Result<Self, TableLoadError> {
        let path_str = path.to_string_lossy().to_string();
        let mut reader = csv::Reader::from_path(path).map_err(|e| TableLoadError::Csv {
            path: path_str.clone(),
            source: e,
        })?;

        let mut table = Self::new();
        for result in reader.deserialize::<BondLengthRecord>() {
            let record = result.map_err(|e| TableLoadError::Csv {
                path: path_str.clone(),
                source: e,
            })?;
            if !(record.length.is_finite() && record.length > 0.0) {
                return Err(TableLoadError::InvalidValue {
                    path: path_str,
                    key: Self::key(&record.first, &record.second),
                    value: record.length,
                });
            }
            table.insert(&record.first, &record.second, record.length);
        }
        Ok(table)
    }
}

impl<'a> FromIterator<(&'a str, &'a str, f64)> for BondLengthTable {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str, f64)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (first, second, length) in iter {
            table.insert(first, second, length);
        }
        table
    }
}
