use super::atom::Atom;
use super::fragment::Fragment;
use super::ids::{AtomId, FragmentId};
use super::topology::{Bond, BondOrder};
use crate::core::utils::geometry::RigidTransform;
use nalgebra::Point3;
use slotmap::{SecondaryMap, SlotMap};
use std::collections::{HashSet, VecDeque};

/// Saved coordinates of a set of atoms, restorable with [`MolecularSystem::restore`].
pub type CoordinateSnapshot = Vec<(AtomId, Point3<f64>)>;

/// Arena holding every atom, fragment and bond of an assembly job.
///
/// Fragments hold atom IDs rather than atoms, and every atom records its owning fragment.
/// Ownership changes only through [`MolecularSystem::add_atom_to_fragment`] and
/// [`MolecularSystem::transfer_atoms`], which update both sides together so an atom
/// always belongs to exactly one fragment.
#[derive(Debug, Clone, Default)]
pub struct MolecularSystem {
    /// Primary storage for atoms using a slot map for efficient ID management.
    atoms: SlotMap<AtomId, Atom>,
    /// Primary storage for fragments.
    fragments: SlotMap<FragmentId, Fragment>,
    /// List of all bonds in the system.
    bonds: Vec<Bond>,
    /// Cached adjacency list for bond connectivity, indexed by atom ID.
    bond_adjacency: SecondaryMap<AtomId, Vec<AtomId>>,
}

impl MolecularSystem {
    /// Creates a new, empty molecular system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieves an immutable reference to an atom by its ID.
    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    /// Retrieves a mutable reference to an atom by its ID.
    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id)
    }

    /// Returns an iterator over all atoms in the system.
    pub fn atoms_iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms.iter()
    }

    /// Retrieves an immutable reference to a fragment by its ID.
    pub fn fragment(&self, id: FragmentId) -> Option<&Fragment> {
        self.fragments.get(id)
    }

    /// Returns an iterator over all fragments in the system.
    pub fn fragments_iter(&self) -> impl Iterator<Item = (FragmentId, &Fragment)> {
        self.fragments.iter()
    }

    /// Returns the IDs of all fragments, in slot order.
    pub fn fragment_ids(&self) -> Vec<FragmentId> {
        self.fragments.keys().collect()
    }

    /// Returns the ID of the fragment currently owning `atom_id`.
    pub fn fragment_of(&self, atom_id: AtomId) -> Option<FragmentId> {
        self.atoms.get(atom_id).map(|atom| atom.fragment_id)
    }

    /// Returns a slice of all bonds in the system.
    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    /// Adds a new, empty fragment.
    pub fn add_fragment(&mut self, name: &str) -> FragmentId {
        self.fragments.insert(Fragment::new(name))
    }

    /// Adds an atom to a specific fragment.
    ///
    /// The atom's `fragment_id` is overwritten with `fragment_id`.
    ///
    /// # Return
    ///
    /// Returns `Some(AtomId)` if successful, otherwise `None` (the fragment doesn't exist).
    pub fn add_atom_to_fragment(&mut self, fragment_id: FragmentId, mut atom: Atom) -> Option<AtomId> {
        if !self.fragments.contains_key(fragment_id) {
            return None;
        }
        atom.fragment_id = fragment_id;

        let atom_id = self.atoms.insert(atom);
        self.bond_adjacency.insert(atom_id, Vec::new());
        self.fragments[fragment_id].push(atom_id);

        Some(atom_id)
    }

    /// Adds a bond between two atoms.
    ///
    /// Adding an existing bond succeeds without creating a duplicate.
    ///
    /// # Return
    ///
    /// Returns `Some(())` if successful, otherwise `None` (missing atom or self-bond).
    pub fn add_bond(&mut self, atom1_id: AtomId, atom2_id: AtomId, order: BondOrder) -> Option<()> {
        if atom1_id == atom2_id
            || !self.atoms.contains_key(atom1_id)
            || !self.atoms.contains_key(atom2_id)
        {
            return None;
        }

        if let Some(neighbors) = self.bond_adjacency.get(atom1_id) {
            if neighbors.contains(&atom2_id) {
                return Some(());
            }
        }

        self.bonds.push(Bond::new(atom1_id, atom2_id, order));
        self.bond_adjacency[atom1_id].push(atom2_id);
        self.bond_adjacency[atom2_id].push(atom1_id);
        Some(())
    }

    /// Returns the bond joining two atoms, in either direction.
    pub fn bond_between(&self, atom1_id: AtomId, atom2_id: AtomId) -> Option<&Bond> {
        self.bonds.iter().find(|bond| bond.connects(atom1_id, atom2_id))
    }

    /// Marks or unmarks the bond between two atoms as a rotatable axis.
    pub fn set_rotatable(&mut self, atom1_id: AtomId, atom2_id: AtomId, rotatable: bool) -> Option<()> {
        let bond = self
            .bonds
            .iter_mut()
            .find(|bond| bond.connects(atom1_id, atom2_id))?;
        bond.rotatable = rotatable;
        Some(())
    }

    /// Removes every bond joining an atom of `fragment_id` to an atom outside it.
    ///
    /// # Return
    ///
    /// Returns the number of bonds removed, or `None` if the fragment doesn't exist.
    pub fn clear_external_bonds(&mut self, fragment_id: FragmentId) -> Option<usize> {
        let fragment = self.fragments.get(fragment_id)?;
        let inside: HashSet<AtomId> = fragment.atoms().iter().copied().collect();
        let before = self.bonds.len();
        self.bonds
            .retain(|bond| inside.contains(&bond.atom1_id) == inside.contains(&bond.atom2_id));
        let removed = before - self.bonds.len();
        if removed > 0 {
            self.rebuild_adjacency();
        }
        Some(removed)
    }

    fn rebuild_adjacency(&mut self) {
        for neighbors in self.bond_adjacency.values_mut() {
            neighbors.clear();
        }
        for bond in &self.bonds {
            if let Some(neighbors) = self.bond_adjacency.get_mut(bond.atom1_id) {
                neighbors.push(bond.atom2_id);
            }
            if let Some(neighbors) = self.bond_adjacency.get_mut(bond.atom2_id) {
                neighbors.push(bond.atom1_id);
            }
        }
    }

    /// Retrieves the bonded neighbors of an atom, in bond insertion order.
    pub fn get_bonded_neighbors(&self, atom_id: AtomId) -> Option<&[AtomId]> {
        self.bond_adjacency.get(atom_id).map(|v| v.as_slice())
    }

    /// Replaces the atom order of a fragment.
    ///
    /// # Return
    ///
    /// Returns `None` and leaves the fragment untouched unless `order` is a permutation of
    /// the fragment's current atoms.
    pub fn reorder_fragment(&mut self, fragment_id: FragmentId, order: Vec<AtomId>) -> Option<()> {
        let fragment = self.fragments.get_mut(fragment_id)?;
        if order.len() != fragment.len() {
            return None;
        }
        let current: HashSet<AtomId> = fragment.atoms().iter().copied().collect();
        let proposed: HashSet<AtomId> = order.iter().copied().collect();
        if current != proposed {
            return None;
        }
        fragment.set_atoms(order);
        Some(())
    }

    /// Moves every atom of `from` into `into` and discards the emptied `from` fragment.
    ///
    /// Atom order is preserved: the donor's atoms are appended after the receiver's.
    ///
    /// # Return
    ///
    /// Returns the number of atoms moved, or `None` if either fragment is missing or both
    /// IDs are the same.
    pub fn transfer_atoms(&mut self, from: FragmentId, into: FragmentId) -> Option<usize> {
        if from == into || !self.fragments.contains_key(into) {
            return None;
        }
        let mut donor = self.fragments.remove(from)?;
        let moved = donor.take_atoms();
        for &atom_id in &moved {
            if let Some(atom) = self.atoms.get_mut(atom_id) {
                atom.fragment_id = into;
            }
        }
        let receiver = &mut self.fragments[into];
        for &atom_id in &moved {
            receiver.push(atom_id);
        }
        Some(moved.len())
    }

    /// Moves a single atom into another fragment, discarding its old fragment if it empties.
    pub fn move_atom(&mut self, atom_id: AtomId, into: FragmentId) -> Option<()> {
        if !self.fragments.contains_key(into) {
            return None;
        }
        let from = self.fragment_of(atom_id)?;
        if from == into {
            return Some(());
        }
        if let Some(old) = self.fragments.get_mut(from) {
            old.remove(atom_id);
            if old.is_empty() {
                self.fragments.remove(from);
            }
        }
        self.atoms[atom_id].fragment_id = into;
        self.fragments[into].push(atom_id);
        Some(())
    }

    /// Applies a rigid transform to every atom of a fragment.
    pub fn transform_fragment(&mut self, fragment_id: FragmentId, transform: &RigidTransform) -> Option<()> {
        let fragment = self.fragments.get(fragment_id)?;
        for &atom_id in fragment.atoms() {
            if let Some(atom) = self.atoms.get_mut(atom_id) {
                atom.position = transform.apply(&atom.position);
            }
        }
        Some(())
    }

    /// Returns the positions of a fragment's atoms in fragment order.
    pub fn fragment_positions(&self, fragment_id: FragmentId) -> Option<Vec<Point3<f64>>> {
        let fragment = self.fragments.get(fragment_id)?;
        fragment
            .atoms()
            .iter()
            .map(|&id| self.atoms.get(id).map(|atom| atom.position))
            .collect()
    }

    /// Records the current coordinates of `atom_ids`.
    pub fn snapshot(&self, atom_ids: &[AtomId]) -> CoordinateSnapshot {
        atom_ids
            .iter()
            .filter_map(|&id| self.atoms.get(id).map(|atom| (id, atom.position)))
            .collect()
    }

    /// Writes back coordinates recorded by [`MolecularSystem::snapshot`].
    pub fn restore(&mut self, snapshot: &CoordinateSnapshot) {
        for &(id, position) in snapshot {
            if let Some(atom) = self.atoms.get_mut(id) {
                atom.position = position;
            }
        }
    }

    /// Collects all atoms reachable from `atom_id` within `max_bonds` bonds, excluding itself.
    pub fn neighbors_within(&self, atom_id: AtomId, max_bonds: usize) -> HashSet<AtomId> {
        let mut seen = HashSet::from([atom_id]);
        let mut queue = VecDeque::from([(atom_id, 0usize)]);
        while let Some((current, depth)) = queue.pop_front() {
            if depth == max_bonds {
                continue;
            }
            for &next in self.get_bonded_neighbors(current).unwrap_or_default() {
                if seen.insert(next) {
                    queue.push_back((next, depth + 1));
                }
            }
        }
        seen.remove(&atom_id);
        seen
    }

    /// Returns the shortest bond-count path between two atoms, searching at most `limit` bonds.
    pub fn graph_distance(&self, from: AtomId, to: AtomId, limit: usize) -> Option<usize> {
        if from == to {
            return Some(0);
        }
        let mut seen = HashSet::from([from]);
        let mut queue = VecDeque::from([(from, 0usize)]);
        while let Some((current, depth)) = queue.pop_front() {
            if depth == limit {
                continue;
            }
            for &next in self.get_bonded_neighbors(current).unwrap_or_default() {
                if next == to {
                    return Some(depth + 1);
                }
                if seen.insert(next) {
                    queue.push_back((next, depth + 1));
                }
            }
        }
        None
    }
}
