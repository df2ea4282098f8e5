use super::detector::ClashDetector;
use super::rotor::{Rotor, downstream_atoms};
use super::search::RotorSearch;
use crate::core::models::ids::AtomId;
use crate::core::models::system::MolecularSystem;
use crate::engine::config::ClashConfig;
use crate::engine::connect::Bridge;
use std::slice;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolution {
    pub clashes_before: usize,
    pub clashes_after: usize,
    pub nodes: usize,
    pub exhausted: bool,
}

impl Resolution {
    fn unchanged(clashes: usize) -> Self {
        Self {
            clashes_before: clashes,
            clashes_after: clashes,
            ..Self::default()
        }
    }
}

/// Resolves clashes across one freshly formed bridge.
///
/// The larger side of the bridge stays put. Only clashes between the two sides count.
pub struct ConnectionClashResolver<'a> {
    detector: ClashDetector,
    config: &'a ClashConfig,
}

impl<'a> ConnectionClashResolver<'a> {
    pub fn new(detector: &ClashDetector, config: &'a ClashConfig) -> Self {
        Self {
            detector: detector.with_tolerance(config.connection_tolerance),
            config,
        }
    }

    #[instrument(skip_all, name = "resolve_bridge")]
    pub fn resolve(&self, system: &mut MolecularSystem, bridge: &Bridge) -> Resolution {
        let bridge_rotor = match Rotor::smaller_side(system, bridge.atom1, bridge.atom2) {
            Ok(rotor) => rotor,
            Err(e) => {
                debug!(error = %e, "Bridge cannot be rotated.");
                return Resolution::default();
            }
        };
        let moving = bridge_rotor.moving_atoms().to_vec();
        let fixed = match downstream_atoms(system, bridge_rotor.moving(), bridge_rotor.pivot()) {
            Ok(atoms) => atoms,
            Err(e) => {
                debug!(error = %e, "Bridge cannot be rotated.");
                return Resolution::default();
            }
        };
        let clash_pairs = |s: &MolecularSystem| self.detector.clash_pairs_between(s, &moving, &fixed);

        let before = clash_pairs(system).len();
        if before == 0 {
            return Resolution::unchanged(0);
        }

        let scan = RotorSearch::new(system, slice::from_ref(&bridge_rotor), self.config.angle_steps)
            .scan_first(system, clash_pairs);
        let mut resolution = Resolution {
            clashes_before: before,
            clashes_after: scan.clashes,
            nodes: scan.nodes,
            exhausted: false,
        };
        if scan.clashes == 0 || self.config.connection_max_rotors < 2 {
            return resolution;
        }

        let mut rotors = vec![bridge_rotor.clone()];
        for bond in system.bonds().iter().filter(|b| {
            b.rotatable
                && bridge_rotor.moves(b.atom1_id)
                && bridge_rotor.moves(b.atom2_id)
        }) {
            if rotors.len() >= self.config.connection_max_rotors {
                break;
            }
            match Rotor::keeping(system, bond.atom1_id, bond.atom2_id, bridge_rotor.moving()) {
                Ok(rotor) => rotors.push(rotor),
                Err(e) => debug!(error = %e, "Skipping rotor."),
            }
        }
        if rotors.len() < 2 {
            return resolution;
        }

        let search = RotorSearch::new(system, &rotors, self.config.angle_steps)
            .backtrack(system, self.config.max_search_nodes, clash_pairs);
        resolution.clashes_after = search.clashes;
        resolution.nodes += search.nodes;
        resolution.exhausted = search.exhausted;
        resolution
    }
}

/// Resolves clashes anywhere inside a set of atoms using an ordered rotor list.
pub struct ClashResolver<'a> {
    detector: ClashDetector,
    config: &'a ClashConfig,
}

impl<'a> ClashResolver<'a> {
    pub fn new(detector: &ClashDetector, config: &'a ClashConfig) -> Self {
        Self {
            detector: detector.with_tolerance(config.tolerance),
            config,
        }
    }

    /// Scans the first rotor alone, then searches over the first `max_rotors` usable
    /// bonds of `rotor_bonds` if clashes remain.
    #[instrument(skip_all, name = "resolve_clashes")]
    pub fn resolve(
        &self,
        system: &mut MolecularSystem,
        atoms: &[AtomId],
        rotor_bonds: &[(AtomId, AtomId)],
    ) -> Resolution {
        let clash_pairs = |s: &MolecularSystem| self.detector.clash_pairs_within(s, atoms);
        let before = clash_pairs(system).len();
        if before == 0 {
            return Resolution::unchanged(0);
        }

        let mut rotors = Vec::new();
        for &(atom1, atom2) in rotor_bonds {
            if rotors.len() >= self.config.max_rotors {
                break;
            }
            match Rotor::smaller_side(system, atom1, atom2) {
                Ok(rotor) => rotors.push(rotor),
                Err(e) => debug!(error = %e, "Skipping rotor."),
            }
        }
        info!(clashes = before, rotors = rotors.len(), "Resolving clashes.");
        if rotors.is_empty() {
            return Resolution::unchanged(before);
        }

        let scan = RotorSearch::new(system, &rotors[..1], self.config.angle_steps)
            .scan_first(system, clash_pairs);
        let mut resolution = Resolution {
            clashes_before: before,
            clashes_after: scan.clashes,
            nodes: scan.nodes,
            exhausted: false,
        };
        if scan.clashes == 0 || rotors.len() < 2 {
            return resolution;
        }

        let search = RotorSearch::new(system, &rotors, self.config.angle_steps)
            .backtrack(system, self.config.max_search_nodes, clash_pairs);
        resolution.clashes_after = search.clashes;
        resolution.nodes += search.nodes;
        resolution.exhausted = search.exhausted;
        resolution
    }
}
