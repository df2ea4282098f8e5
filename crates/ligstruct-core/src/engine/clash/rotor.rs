use crate::core::models::ids::AtomId;
use crate::core::models::system::MolecularSystem;
use crate::core::utils::geometry::rotation_from_axis_angle;
use crate::engine::error::RotationError;
use std::collections::{HashSet, VecDeque};

const AXIS_EPSILON: f64 = 1e-8;

/// Atoms on the `moving` side of the `pivot - moving` bond, `moving` included.
///
/// Fails if the two atoms aren't bonded, or if the flood fill reaches `pivot` through
/// another path (the bond is in a ring).
pub fn downstream_atoms(
    system: &MolecularSystem,
    pivot: AtomId,
    moving: AtomId,
) -> Result<Vec<AtomId>, RotationError> {
    for id in [pivot, moving] {
        if system.atom(id).is_none() {
            return Err(RotationError::AtomNotFound(id));
        }
    }
    if system.bond_between(pivot, moving).is_none() {
        return Err(RotationError::NotBonded {
            atom1: pivot,
            atom2: moving,
        });
    }

    let mut seen = HashSet::from([moving]);
    let mut order = vec![moving];
    let mut queue = VecDeque::from([moving]);
    while let Some(current) = queue.pop_front() {
        for &next in system.get_bonded_neighbors(current).unwrap_or_default() {
            if next == pivot {
                if current != moving {
                    return Err(RotationError::RingBond {
                        atom1: pivot,
                        atom2: moving,
                    });
                }
                continue;
            }
            if seen.insert(next) {
                order.push(next);
                queue.push_back(next);
            }
        }
    }
    Ok(order)
}

/// Rotates everything downstream of `atom2` about the `atom1 -> atom2` axis.
pub fn rotate(
    system: &mut MolecularSystem,
    atom1: AtomId,
    atom2: AtomId,
    angle_degrees: f64,
) -> Result<(), RotationError> {
    Rotor::new(system, atom1, atom2)?.apply(system, angle_degrees);
    Ok(())
}

/// A rotatable bond with its moving side resolved.
#[derive(Debug, Clone)]
pub struct Rotor {
    pivot: AtomId,
    moving: AtomId,
    moving_atoms: Vec<AtomId>,
    moving_set: HashSet<AtomId>,
}

impl Rotor {
    pub fn new(system: &MolecularSystem, pivot: AtomId, moving: AtomId) -> Result<Self, RotationError> {
        let moving_atoms = downstream_atoms(system, pivot, moving)?;
        let moving_set = moving_atoms.iter().copied().collect();
        Ok(Self {
            pivot,
            moving,
            moving_atoms,
            moving_set,
        })
    }

    /// Orients the rotor so the side with fewer atoms moves. On a tie the side of
    /// `atom2` moves.
    pub fn smaller_side(system: &MolecularSystem, atom1: AtomId, atom2: AtomId) -> Result<Self, RotationError> {
        let forward = Self::new(system, atom1, atom2)?;
        let backward = Self::new(system, atom2, atom1)?;
        if backward.moving_atoms.len() < forward.moving_atoms.len() {
            Ok(backward)
        } else {
            Ok(forward)
        }
    }

    /// Orients the rotor so that `fixed` stays in place.
    pub fn keeping(system: &MolecularSystem, atom1: AtomId, atom2: AtomId, fixed: AtomId) -> Result<Self, RotationError> {
        let forward = Self::new(system, atom1, atom2)?;
        if forward.moves(fixed) {
            Self::new(system, atom2, atom1)
        } else {
            Ok(forward)
        }
    }

    pub fn pivot(&self) -> AtomId {
        self.pivot
    }

    pub fn moving(&self) -> AtomId {
        self.moving
    }

    pub fn moving_atoms(&self) -> &[AtomId] {
        &self.moving_atoms
    }

    #[inline]
    pub fn moves(&self, atom_id: AtomId) -> bool {
        self.moving_set.contains(&atom_id)
    }

    /// Rotates the moving side about the current `pivot -> moving` axis.
    pub fn apply(&self, system: &mut MolecularSystem, angle_degrees: f64) {
        let (Some(origin), Some(tip)) = (
            system.atom(self.pivot).map(|a| a.position),
            system.atom(self.moving).map(|a| a.position),
        ) else {
            return;
        };
        let axis = tip - origin;
        if axis.norm() < AXIS_EPSILON {
            return;
        }
        let rotation = rotation_from_axis_angle(&axis, angle_degrees);
        for &atom_id in &self.moving_atoms {
            if let Some(atom) = system.atom_mut(atom_id) {
                atom.position = origin + rotation * (atom.position - origin);
            }
        }
    }
}
