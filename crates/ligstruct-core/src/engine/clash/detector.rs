use super::ClashPair;
use crate::core::models::ids::AtomId;
use crate::core::models::system::MolecularSystem;
use crate::core::tables::vdw::VdwRadii;
use crate::engine::error::AssemblyError;
use itertools::Itertools;
use std::collections::{HashMap, HashSet};

/// Atoms separated by fewer bonds than this never clash.
pub const MIN_GRAPH_DISTANCE: usize = 3;

fn ordered(a: AtomId, b: AtomId) -> ClashPair {
    if a <= b { (a, b) } else { (b, a) }
}

/// Clash predicate over a fixed topology.
///
/// Radii and the pairs closer than [`MIN_GRAPH_DISTANCE`] bonds are gathered once at
/// construction; rotations never change either, so detection itself cannot fail.
#[derive(Debug, Clone)]
pub struct ClashDetector {
    radii: HashMap<AtomId, f64>,
    near_pairs: HashSet<ClashPair>,
    tolerance: f64,
}

impl ClashDetector {
    pub fn new(system: &MolecularSystem, radii: &VdwRadii, tolerance: f64) -> Result<Self, AssemblyError> {
        let mut atom_radii = HashMap::new();
        let mut near_pairs = HashSet::new();
        for (atom_id, atom) in system.atoms_iter() {
            let radius = radii
                .get(&atom.element)
                .ok_or_else(|| AssemblyError::MissingVdwRadius {
                    element: atom.element.clone(),
                })?;
            atom_radii.insert(atom_id, radius);
            for other in system.neighbors_within(atom_id, MIN_GRAPH_DISTANCE - 1) {
                near_pairs.insert(ordered(atom_id, other));
            }
        }
        Ok(Self {
            radii: atom_radii,
            near_pairs,
            tolerance,
        })
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Same topology, different tolerance factor.
    pub fn with_tolerance(&self, tolerance: f64) -> Self {
        Self {
            tolerance,
            ..self.clone()
        }
    }

    pub fn is_clash(&self, system: &MolecularSystem, a: AtomId, b: AtomId) -> bool {
        if a == b || self.near_pairs.contains(&ordered(a, b)) {
            return false;
        }
        let (Some(ra), Some(rb)) = (self.radii.get(&a), self.radii.get(&b)) else {
            return false;
        };
        let (Some(atom_a), Some(atom_b)) = (system.atom(a), system.atom(b)) else {
            return false;
        };
        (atom_a.position - atom_b.position).norm() < (ra + rb) * self.tolerance
    }

    /// All clashing pairs inside one atom set.
    pub fn clash_pairs_within(&self, system: &MolecularSystem, atoms: &[AtomId]) -> Vec<ClashPair> {
        atoms
            .iter()
            .tuple_combinations()
            .filter(|&(&a, &b)| self.is_clash(system, a, b))
            .map(|(&a, &b)| ordered(a, b))
            .collect()
    }

    pub fn count_within(&self, system: &MolecularSystem, atoms: &[AtomId]) -> usize {
        self.clash_pairs_within(system, atoms).len()
    }

    /// Clashing pairs with one atom from each side. Clashes inside a side are ignored.
    pub fn clash_pairs_between(
        &self,
        system: &MolecularSystem,
        side1: &[AtomId],
        side2: &[AtomId],
    ) -> Vec<ClashPair> {
        side1
            .iter()
            .cartesian_product(side2)
            .filter(|&(&a, &b)| self.is_clash(system, a, b))
            .map(|(&a, &b)| ordered(a, b))
            .collect()
    }

    pub fn count_between(&self, system: &MolecularSystem, side1: &[AtomId], side2: &[AtomId]) -> usize {
        self.clash_pairs_between(system, side1, side2).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::topology::BondOrder;
    use crate::test_utils::{build_fragment_at, cis_chain, test_radii};
    use nalgebra::Point3;

    #[test]
    fn atoms_within_two_bonds_never_clash() {
        let mut system = MolecularSystem::new();
        let (_, ids) = build_fragment_at(
            &mut system,
            "tight",
            &[
                ("S", Point3::origin()),
                ("S", Point3::new(0.1, 0.0, 0.0)),
                ("S", Point3::new(0.2, 0.0, 0.0)),
            ],
            &[(0, 1, BondOrder::Single), (1, 2, BondOrder::Single)],
        );
        let detector = ClashDetector::new(&system, &test_radii(), 1.2).unwrap();

        assert_eq!(detector.count_within(&system, &ids), 0);
    }

    #[test]
    fn atoms_three_bonds_apart_can_clash() {
        let mut system = MolecularSystem::new();
        let chain = cis_chain(&mut system);
        let detector = ClashDetector::new(&system, &test_radii(), 1.2).unwrap();

        assert_eq!(
            detector.clash_pairs_within(&system, &chain),
            vec![ordered(chain[0], chain[3])]
        );
    }

    #[test]
    fn unbonded_atoms_from_different_fragments_clash() {
        let mut system = MolecularSystem::new();
        let (_, a) = build_fragment_at(&mut system, "a", &[("S", Point3::origin())], &[]);
        let (_, b) = build_fragment_at(&mut system, "b", &[("S", Point3::new(1.0, 0.0, 0.0))], &[]);
        let detector = ClashDetector::new(&system, &test_radii(), 1.2).unwrap();

        assert!(detector.is_clash(&system, a[0], b[0]));
        assert!(!detector.with_tolerance(0.5).is_clash(&system, a[0], b[0]));
    }

    #[test]
    fn between_counts_cross_pairs_only() {
        let mut system = MolecularSystem::new();
        let (_, left) = build_fragment_at(
            &mut system,
            "left",
            &[("S", Point3::origin()), ("S", Point3::new(0.5, 0.0, 0.0))],
            &[],
        );
        let (_, right) = build_fragment_at(&mut system, "right", &[("S", Point3::new(5.0, 0.0, 0.0))], &[]);
        let detector = ClashDetector::new(&system, &test_radii(), 1.2).unwrap();

        assert_eq!(detector.count_within(&system, &left), 1);
        assert_eq!(detector.count_between(&system, &left, &right), 0);
    }

    #[test]
    fn missing_radius_is_an_error() {
        let mut system = MolecularSystem::new();
        build_fragment_at(&mut system, "x", &[("Xx", Point3::origin())], &[]);

        let result = ClashDetector::new(&system, &test_radii(), 1.2);

        assert!(matches!(
            result,
            Err(AssemblyError::MissingVdwRadius { ref element }) if element == "Xx"
        ));
    }
}
