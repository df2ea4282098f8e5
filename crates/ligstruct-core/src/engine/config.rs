use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct AlignmentConfig {
    /// Distance within which every transformed site atom must find a template atom
    /// during the exhaustive search.
    pub coverage_epsilon: f64,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            coverage_epsilon: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ClashConfig {
    /// Scale on the vdW radius sum for whole-molecule detection.
    pub tolerance: f64,
    /// Scale on the vdW radius sum across a freshly formed bridge.
    pub connection_tolerance: f64,
    pub angle_steps: usize,
    pub max_rotors: usize,
    pub connection_max_rotors: usize,
    /// Upper bound on search nodes visited by one backtracking run.
    pub max_search_nodes: usize,
    pub resolve_connections: bool,
}

impl Default for ClashConfig {
    fn default() -> Self {
        Self {
            tolerance: 1.2,
            connection_tolerance: 1.3,
            angle_steps: 24,
            max_rotors: 20,
            connection_max_rotors: 2,
            max_search_nodes: 100_000,
            resolve_connections: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct AssemblyConfig {
    pub alignment: AlignmentConfig,
    pub clash: ClashConfig,
    pub resolve_clashes: bool,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            alignment: AlignmentConfig::default(),
            clash: ClashConfig::default(),
            resolve_clashes: true,
        }
    }
}

fn ensure_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            reason: format!("must be a positive number, got {}", value),
        })
    }
}

impl AssemblyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("coverage_epsilon", self.alignment.coverage_epsilon)?;
        ensure_positive("tolerance", self.clash.tolerance)?;
        ensure_positive("connection_tolerance", self.clash.connection_tolerance)?;
        if self.clash.angle_steps == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "angle_steps",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.clash.max_search_nodes == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "max_search_nodes",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Reads a kebab-case TOML file; omitted fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let path_str = path.to_string_lossy().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigLoadError::Toml {
            path: path_str,
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Default)]
pub struct AssemblyConfigBuilder {
    coverage_epsilon: Option<f64>,
    tolerance: Option<f64>,
    connection_tolerance: Option<f64>,
    angle_steps: Option<usize>,
    max_rotors: Option<usize>,
    connection_max_rotors: Option<usize>,
    max_search_nodes: Option<usize>,
    resolve_connections: Option<bool>,
    resolve_clashes: Option<bool>,
}

impl AssemblyConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn coverage_epsilon(mut self, epsilon: f64) -> Self {
        self.coverage_epsilon = Some(epsilon);
        self
    }
    pub fn tolerance(mut self, factor: f64) -> Self {
        self.tolerance = Some(factor);
        self
    }
    pub fn connection_tolerance(mut self, factor: f64) -> Self {
        self.connection_tolerance = Some(factor);
        self
    }
    pub fn angle_steps(mut self, steps: usize) -> Self {
        self.angle_steps = Some(steps);
        self
    }
    pub fn max_rotors(mut self, n: usize) -> Self {
        self.max_rotors = Some(n);
        self
    }
    pub fn connection_max_rotors(mut self, n: usize) -> Self {
        self.connection_max_rotors = Some(n);
        self
    }
    pub fn max_search_nodes(mut self, n: usize) -> Self {
        self.max_search_nodes = Some(n);
        self
    }
    pub fn resolve_connections(mut self, enabled: bool) -> Self {
        self.resolve_connections = Some(enabled);
        self
    }
    pub fn resolve_clashes(mut self, enabled: bool) -> Self {
        self.resolve_clashes = Some(enabled);
        self
    }

    pub fn build(self) -> Result<AssemblyConfig, ConfigError> {
        let defaults = AssemblyConfig::default();
        let config = AssemblyConfig {
            alignment: AlignmentConfig {
                coverage_epsilon: self
                    .coverage_epsilon
                    .unwrap_or(defaults.alignment.coverage_epsilon),
            },
            clash: ClashConfig {
                tolerance: self.tolerance.unwrap_or(defaults.clash.tolerance),
                connection_tolerance: self
                    .connection_tolerance
                    .unwrap_or(defaults.clash.connection_tolerance),
                angle_steps: self.angle_steps.unwrap_or(defaults.clash.angle_steps),
                max_rotors: self.max_rotors.unwrap_or(defaults.clash.max_rotors),
                connection_max_rotors: self
                    .connection_max_rotors
                    .unwrap_or(defaults.clash.connection_max_rotors),
                max_search_nodes: self
                    .max_search_nodes
                    .unwrap_or(defaults.clash.max_search_nodes),
                resolve_connections: self
                    .resolve_connections
                    .unwrap_or(defaults.clash.resolve_connections),
            },
            resolve_clashes: self.resolve_clashes.unwrap_or(defaults.resolve_clashes),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_documented_values() {
        let config = AssemblyConfig::default();
        assert_eq!(config.alignment.coverage_epsilon, 0.8);
        assert_eq!(config.clash.tolerance, 1.2);
        assert_eq!(config.clash.connection_tolerance, 1.3);
        assert_eq!(config.clash.angle_steps, 24);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_overrides_selected_fields() {
        let config = AssemblyConfigBuilder::new()
            .angle_steps(12)
            .max_rotors(4)
            .resolve_clashes(false)
            .build()
            .unwrap();
        assert_eq!(config.clash.angle_steps, 12);
        assert_eq!(config.clash.max_rotors, 4);
        assert!(!config.resolve_clashes);
        assert_eq!(config.clash.connection_max_rotors, 2);
    }

    #[test]
    fn builder_rejects_zero_angle_steps() {
        let result = AssemblyConfigBuilder::new().angle_steps(0).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter {
                name: "angle_steps",
                ..
            })
        ));
    }

    #[test]
    fn builder_rejects_non_positive_tolerance() {
        let result = AssemblyConfigBuilder::new().tolerance(0.0).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter { name: "tolerance", .. })
        ));
        let result = AssemblyConfigBuilder::new().coverage_epsilon(-0.5).build();
        assert!(result.is_err());
    }

    #[test]
    fn load_reads_partial_kebab_case_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("assembly.toml");
        let mut file = File::create(&file_path).unwrap();
        writeln!(
            file,
            r#"
            resolve-clashes = false

            [alignment]
            coverage-epsilon = 0.5

            [clash]
            angle-steps = 36
            max-search-nodes = 500
            "#
        )
        .unwrap();

        let config = AssemblyConfig::load(&file_path).unwrap();
        assert!(!config.resolve_clashes);
        assert_eq!(config.alignment.coverage_epsilon, 0.5);
        assert_eq!(config.clash.angle_steps, 36);
        assert_eq!(config.clash.max_search_nodes, 500);
        assert_eq!(config.clash.tolerance, 1.2);
    }

    #[test]
    fn load_rejects_unknown_fields() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("assembly.toml");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "[clash]\nangle_step = 12").unwrap();

        let result = AssemblyConfig::load(&file_path);
        assert!(matches!(result, Err(ConfigLoadError::Toml { .. })));
    }

    #[test]
    fn load_validates_values() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("assembly.toml");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "[clash]\nangle-steps = 0").unwrap();

        let result = AssemblyConfig::load(&file_path);
        assert!(matches!(result, Err(ConfigLoadError::Invalid(_))));
    }

    #[test]
    fn load_fails_for_missing_file() {
        let result = AssemblyConfig::load(Path::new("non_existent_assembly.toml"));
        assert!(matches!(result, Err(ConfigLoadError::Io { .. })));
    }
}
