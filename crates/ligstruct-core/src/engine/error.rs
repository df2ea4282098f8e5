use std::fmt;
use thiserror::Error;

use super::config::ConfigError;
use crate::core::canon::CanonicalizationError;
use crate::core::models::ids::{AtomId, FragmentId};

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("Canonicalization of fragment '{fragment}' failed: {source}")]
    Canonicalization {
        fragment: String,
        source: CanonicalizationError,
    },

    #[error("Connection #{index} ({atom1:?} - {atom2:?}) failed: {source}")]
    Connection {
        index: usize,
        atom1: AtomId,
        atom2: AtomId,
        source: ConnectionError,
    },

    #[error("No van der Waals radius for element '{element}'")]
    MissingVdwRadius { element: String },

    #[error("Fragment not found in system: {0:?}")]
    FragmentNotFound(FragmentId),

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },
}

/// Failure of a single connection. Aborts the assembly.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConnectionError {
    #[error("No junction template for site key '{key}'")]
    MissingTemplate { key: String },

    #[error("Junction template '{key}' has {found} atoms, site requires {expected}")]
    TemplateMismatch {
        key: String,
        expected: usize,
        found: usize,
    },

    #[error("Placeholder index {index} is outside a junction template of {len} atoms")]
    PlaceholderOutOfRange { index: usize, len: usize },

    #[error("No superposition of site '{key}' covers the template after {trials} trials")]
    FatalAlignment { key: String, trials: usize },

    #[error("No standard bond length for element pair '{key}'")]
    MissingBondLength { key: String },

    #[error("Both atoms already belong to the same fragment")]
    SameFragment,

    #[error("Atom not found in system: {0:?}")]
    AtomNotFound(AtomId),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RotationError {
    #[error("Atoms {atom1:?} and {atom2:?} are not bonded")]
    NotBonded { atom1: AtomId, atom2: AtomId },

    #[error("Bond {atom1:?} - {atom2:?} is part of a ring")]
    RingBond { atom1: AtomId, atom2: AtomId },

    #[error("Atom not found in system: {0:?}")]
    AtomNotFound(AtomId),
}

/// Non-fatal conditions collected during assembly.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    MissingTemplate {
        fragment: String,
        key: String,
    },
    TemplateSizeMismatch {
        fragment: String,
        key: String,
        expected: usize,
        found: usize,
    },
    DisconnectedFragment {
        fragment: String,
    },
    ResidualClash {
        count: usize,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MissingTemplate { fragment, key } => {
                write!(f, "no coordinate template '{}' for fragment '{}'", key, fragment)
            }
            Warning::TemplateSizeMismatch {
                fragment,
                key,
                expected,
                found,
            } => write!(
                f,
                "coordinate template '{}' has {} atoms, fragment '{}' has {}",
                key, found, fragment, expected
            ),
            Warning::DisconnectedFragment { fragment } => {
                write!(f, "fragment '{}' is not reached by any connection", fragment)
            }
            Warning::ResidualClash { count } => {
                write!(f, "{} clashes remain after resolution", count)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_error_message_names_the_key() {
        let err = ConnectionError::FatalAlignment {
            key: "CC1H1H1".to_string(),
            trials: 3,
        };
        assert_eq!(
            err.to_string(),
            "No superposition of site 'CC1H1H1' covers the template after 3 trials"
        );
    }

    #[test]
    fn config_error_converts_into_assembly_error() {
        let err: AssemblyError = ConfigError::InvalidParameter {
            name: "angle_steps",
            reason: "must be at least 1".to_string(),
        }
        .into();
        assert!(matches!(err, AssemblyError::Config { .. }));
    }

    #[test]
    fn warning_display_is_human_readable() {
        let warning = Warning::TemplateSizeMismatch {
            fragment: "ring".to_string(),
            key: "c1ccccc1".to_string(),
            expected: 6,
            found: 5,
        };
        assert_eq!(
            warning.to_string(),
            "coordinate template 'c1ccccc1' has 5 atoms, fragment 'ring' has 6"
        );
        assert_eq!(
            Warning::ResidualClash { count: 2 }.to_string(),
            "2 clashes remain after resolution"
        );
    }
}
