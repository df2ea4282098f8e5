use super::ids::FragmentId;
use nalgebra::Point3;

/// Represents an atom taking part in fragment assembly.
///
/// Atoms are owned by the [`MolecularSystem`](super::system::MolecularSystem) arena.
/// The `fragment_id` back-link names the fragment that currently owns the atom and is
/// rewritten by the arena whenever ownership is transferred during a merge.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Optional atom label (e.g., "C1", "O2"); not used by any algorithm.
    pub name: String,
    /// The element symbol (e.g., "C", "Cl").
    pub element: String,
    /// The ID of the fragment that owns this atom.
    pub fragment_id: FragmentId,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
}

impl Atom {
    /// Creates a new `Atom` with an empty name.
    ///
    /// # Arguments
    ///
    /// * `element` - The element symbol of the atom.
    /// * `fragment_id` - The ID of the fragment this atom belongs to.
    /// * `position` - The 3D coordinates of the atom.
    pub fn new(element: &str, fragment_id: FragmentId, position: Point3<f64>) -> Self {
        Self {
            name: String::new(),
            element: element.to_string(),
            fragment_id,
            position,
        }
    }

    /// Sets the atom label, builder style.
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_atom_has_expected_fields() {
        let fragment_id = FragmentId::default();
        let atom = Atom::new("C", fragment_id, Point3::new(1.0, 2.0, 3.0));

        assert_eq!(atom.element, "C");
        assert_eq!(atom.name, "");
        assert_eq!(atom.fragment_id, fragment_id);
        assert_eq!(atom.position, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn with_name_sets_label_only() {
        let atom = Atom::new("O", FragmentId::default(), Point3::origin()).with_name("O1");
        assert_eq!(atom.name, "O1");
        assert_eq!(atom.element, "O");
    }
}
