//! Template entries consumed by the assembler and the lookup seam in front of them.
//!
//! Two kinds of entries exist:
//!
//! - [`CoordinateTemplate`]: full 3D coordinates of a rigid fragment, in canonical atom
//!   order, keyed by the fragment's structural fingerprint.
//! - [`JunctionTemplate`]: the local geometry around a bond-forming atom (central atom at
//!   index 0 followed by its sorted neighbors, one of which is the placeholder for the
//!   partner atom), keyed by the connection-site signature.
//!
//! Storage is external; any keyed store implementing [`TemplateSource`] can be plugged in.

use super::models::ids::FragmentId;
use super::models::system::MolecularSystem;
use super::utils::geometry::RigidTransform;
use nalgebra::{Point3, Vector3};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateTemplate {
    positions: Vec<Point3<f64>>,
}

impl CoordinateTemplate {
    pub fn new(positions: Vec<Point3<f64>>) -> Self {
        Self { positions }
    }

    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Copies the template coordinates positionally onto the atoms of a fragment.
    ///
    /// # Return
    ///
    /// Returns `None` and changes nothing if the fragment is missing or its size differs.
    pub fn transfer_coordinates(&self, system: &mut MolecularSystem, fragment_id: FragmentId) -> Option<()> {
        let atom_ids = system.fragment(fragment_id)?.atoms().to_vec();
        if atom_ids.len() != self.positions.len() {
            return None;
        }
        for (atom_id, position) in atom_ids.into_iter().zip(&self.positions) {
            system.atom_mut(atom_id)?.position = *position;
        }
        Some(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateAtom {
    pub element: String,
    pub position: Point3<f64>,
}

impl TemplateAtom {
    pub fn new(element: &str, position: Point3<f64>) -> Self {
        Self {
            element: element.to_string(),
            position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct JunctionTemplate {
    atoms: Vec<TemplateAtom>,
}

impl JunctionTemplate {
    pub fn new(atoms: Vec<TemplateAtom>) -> Self {
        Self { atoms }
    }

    pub fn atoms(&self) -> &[TemplateAtom] {
        &self.atoms
    }

    pub fn atom(&self, index: usize) -> Option<&TemplateAtom> {
        self.atoms.get(index)
    }

    /// The bonding atom, stored first.
    pub fn central(&self) -> Option<&TemplateAtom> {
        self.atoms.first()
    }

    pub fn position(&self, index: usize) -> Option<Point3<f64>> {
        self.atoms.get(index).map(|atom| atom.position)
    }

    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.atoms.iter().map(|atom| atom.position).collect()
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn remove(&mut self, index: usize) -> Option<TemplateAtom> {
        (index < self.atoms.len()).then(|| self.atoms.remove(index))
    }

    pub fn transform(&mut self, transform: &RigidTransform) {
        for atom in &mut self.atoms {
            atom.position = transform.apply(&atom.position);
        }
    }

    pub fn translate(&mut self, offset: &Vector3<f64>) {
        for atom in &mut self.atoms {
            atom.position += offset;
        }
    }
}

/// Keyed, read-only template store.
pub trait TemplateSource<T> {
    fn lookup(&self, key: &str) -> Option<&T>;
}

impl<T> TemplateSource<T> for HashMap<String, T> {
    fn lookup(&self, key: &str) -> Option<&T> {
        self.get(key)
    }
}

/// In-memory template library.
#[derive(Debug, Clone)]
pub struct TemplateLibrary<T> {
    entries: HashMap<String, T>,
}

impl<T> Default for TemplateLibrary<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> TemplateLibrary<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a template, returning the entry previously stored under `key`.
    pub fn insert(&mut self, key: impl Into<String>, template: T) -> Option<T> {
        self.entries.insert(key.into(), template)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> TemplateSource<T> for TemplateLibrary<T> {
    fn lookup(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }
}

impl<K: Into<String>, T> FromIterator<(K, T)> for TemplateLibrary<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, t)| (k.into(), t)).collect(),
        }
    }
}
