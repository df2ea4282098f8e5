use super::ids::AtomId;

/// An ordered group of atoms treated as one assembly unit.
///
/// The order of `atoms` is significant: after canonicalization it is the canonical
/// order used to transfer coordinates from whole-fragment templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    pub name: String,
    atoms: Vec<AtomId>,
}

impl Fragment {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            atoms: Vec::new(),
        }
    }

    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn contains(&self, atom_id: AtomId) -> bool {
        self.atoms.contains(&atom_id)
    }

    pub(crate) fn push(&mut self, atom_id: AtomId) {
        self.atoms.push(atom_id);
    }

    pub(crate) fn remove(&mut self, atom_id: AtomId) {
        self.atoms.retain(|&id| id != atom_id);
    }

    pub(crate) fn take_atoms(&mut self) -> Vec<AtomId> {
        std::mem::take(&mut self.atoms)
    }

    pub(crate) fn set_atoms(&mut self, atoms: Vec<AtomId>) {
        self.atoms = atoms;
    }
}
