//! Steric clash detection and resolution by rotation about single bonds.
//!
//! Detection flags atom pairs at least three bonds apart whose distance falls below the
//! tolerance-scaled sum of their van der Waals radii. Resolution only ever changes
//! dihedral angles: a discretized scan of one bond first, then a bounded depth-first
//! search over an ordered list of rotors.

pub mod detector;
pub mod resolver;
pub mod rotor;
pub mod search;

use crate::core::models::ids::AtomId;

/// Two clashing atoms, smaller ID first.
pub type ClashPair = (AtomId, AtomId);
