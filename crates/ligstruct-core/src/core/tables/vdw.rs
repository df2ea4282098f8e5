use super::TableLoadError;
use phf::{Map, phf_map};
use std::collections::HashMap;
use std::path::Path;

// Bondi (1964), with Mantina et al. (2009) for elements Bondi leaves out.
#[rustfmt::skip]
static BONDI_RADII: Map<&'static str, f64> = phf_map! {
    "H"  => 1.20, "He" => 1.40,
    "B"  => 1.92, "C"  => 1.70, "N"  => 1.55, "O"  => 1.52, "F"  => 1.47,
    "Si" => 2.10, "P"  => 1.80, "S"  => 1.80, "Cl" => 1.75,
    "As" => 1.85, "Se" => 1.90, "Br" => 1.85,
    "I"  => 1.98,
};

/// Van der Waals radius per element symbol.
#[derive(Debug, Clone, Default)]
pub struct VdwRadii {
    radii: HashMap<String, f64>,
}

impl VdwRadii {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bondi() -> Self {
        Self {
            radii: BONDI_RADII
                .entries()
                .map(|(element, radius)| (element.to_string(), *radius))
                .collect(),
        }
    }

    pub fn insert(&mut self, element: &str, radius: f64) {
        self.radii.insert(element.to_string(), radius);
    }

    pub fn get(&self, element: &str) -> Option<f64> {
        self.radii.get(element).copied()
    }

    pub fn len(&self) -> usize {
        self.radii.len()
    }

    pub fn is_empty(&self) -> bool {
        self.radii.is_empty()
    }

    /// Loads radii from a flat TOML table such as `C = 1.7`.
    pub fn load(path: &Path) -> Result<Self, TableLoadError> {
        let path_str = path.to_string_lossy().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| TableLoadError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        let radii: HashMap<String, f64> =
            toml::from_str(&content).map_err(|e| TableLoadError::Toml {
                path: path_str.clone(),
                source: e,
            })?;

        if let Some((element, radius)) = radii
            .iter()
            .find(|(_, radius)| !(radius.is_finite() && **radius > 0.0))
        {
            return Err(TableLoadError::InvalidValue {
                path: path_str,
                key: element.clone(),
                value: *radius,
            });
        }
        Ok(Self { radii })
    }
}

impl<'a> FromIterator<(&'a str, f64)> for VdwRadii {
    fn from_iter<I: IntoIterator<Item = (&'a str, f64)>>(iter: I) -> Self {
        Self {
            radii: iter
                .into_iter()
                .map(|(element, radius)| (element.to_string(), radius))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn bondi_defaults_cover_organic_elements() {
        let radii = VdwRadii::bondi();
        for element in ["H", "C", "N", "O", "S", "P", "Cl"] {
            assert!(radii.get(element).is_some(), "missing {element}");
        }
        assert_eq!(radii.get("C"), Some(1.70));
        assert_eq!(radii.get("Xx"), None);
    }

    #[test]
    fn load_reads_flat_toml_table() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("vdw.toml");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "C = 1.7\nO = 1.52\nCl = 1.75").unwrap();

        let radii = VdwRadii::load(&file_path).unwrap();
        assert_eq!(radii.len(), 3);
        assert_eq!(radii.get("Cl"), Some(1.75));
    }

    #[test]
    fn load_rejects_negative_radius() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("vdw.toml");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "C = -1.0").unwrap();

        let result = VdwRadii::load(&file_path);
        assert!(matches!(result, Err(TableLoadError::InvalidValue { .. })));
    }

    #[test]
    fn load_fails_for_missing_file() {
        let result = VdwRadii::load(Path::new("non_existent_vdw.toml"));
        assert!(matches!(result, Err(TableLoadError::Io { .. })));
    }

    #[test]
    fn load_fails_for_malformed_toml() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("vdw.toml");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "C = \"big\"").unwrap();

        let result = VdwRadii::load(&file_path);
        assert!(matches!(result, Err(TableLoadError::Toml { .. })));
    }
}
