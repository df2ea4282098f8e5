//! Interface to the external canonical-labeling capability.
//!
//! Fragment canonicalization and structural fingerprinting are delegated to an injected
//! [`Canonicalizer`]. This module only defines the graph handed to it, the expected shape of
//! the answer, and validation of that answer.

use super::models::ids::{AtomId, FragmentId};
use super::models::system::MolecularSystem;
use super::models::topology::BondOrder;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CanonicalizationError {
    #[error("Cannot canonicalize an empty fragment")]
    EmptyGraph,
    #[error("Fragment graph is disconnected ({components} components)")]
    Disconnected { components: usize },
    #[error("Canonical labels are not a permutation of 0..{expected}")]
    InvalidLabels { expected: usize },
    #[error("Canonicalization oracle failed: {0}")]
    Oracle(String),
}

/// Labeled molecular graph of one fragment, ignoring bonds that leave the fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentGraph {
    /// Element symbol per vertex, in the fragment's current atom order.
    pub elements: Vec<String>,
    /// Internal bonds as `(vertex, vertex, order)`, in system bond order.
    pub edges: Vec<(usize, usize, BondOrder)>,
    atom_ids: Vec<AtomId>,
}

impl FragmentGraph {
    /// Builds the graph of a fragment. Returns `None` if the fragment doesn't exist.
    pub fn from_fragment(system: &MolecularSystem, fragment_id: FragmentId) -> Option<Self> {
        let fragment = system.fragment(fragment_id)?;
        let atom_ids = fragment.atoms().to_vec();
        let index: HashMap<AtomId, usize> = atom_ids
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, i))
            .collect();

        let elements = atom_ids
            .iter()
            .map(|&id| system.atom(id).map(|atom| atom.element.clone()))
            .collect::<Option<Vec<_>>>()?;

        let edges = system
            .bonds()
            .iter()
            .filter_map(|bond| {
                let i = *index.get(&bond.atom1_id)?;
                let j = *index.get(&bond.atom2_id)?;
                Some((i, j, bond.order))
            })
            .collect();

        Some(Self {
            elements,
            edges,
            atom_ids,
        })
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The atom IDs behind the vertices, in vertex order.
    pub fn atom_ids(&self) -> &[AtomId] {
        &self.atom_ids
    }

    /// Counts connected components; useful for oracles rejecting disconnected input.
    pub fn component_count(&self) -> usize {
        let n = self.len();
        let mut parent: Vec<usize> = (0..n).collect();
        fn find(parent: &mut [usize], mut x: usize) -> usize {
            while parent[x] != x {
                parent[x] = parent[parent[x]];
                x = parent[x];
            }
            x
        }
        for &(i, j, _) in &self.edges {
            let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
            if ri != rj {
                parent[ri] = rj;
            }
        }
        (0..n).filter(|&x| find(&mut parent, x) == x).count()
    }
}

/// The oracle's answer for one fragment graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalForm {
    /// `labels[i]` is the canonical position of input vertex `i`.
    pub labels: Vec<usize>,
    /// Order-independent structural fingerprint of the graph.
    pub key: String,
}

impl CanonicalForm {
    /// Maps the labels onto atom IDs, yielding the atoms in canonical order.
    pub fn canonical_order(&self, graph: &FragmentGraph) -> Result<Vec<AtomId>, CanonicalizationError> {
        let n = graph.len();
        let invalid = || CanonicalizationError::InvalidLabels { expected: n };
        if self.labels.len() != n {
            return Err(invalid());
        }
        let mut slots: Vec<Option<AtomId>> = vec![None; n];
        for (vertex, &label) in self.labels.iter().enumerate() {
            let Some(slot) = slots.get_mut(label) else {
                return Err(invalid());
            };
            if slot.is_some() {
                return Err(invalid());
            }
            *slot = Some(graph.atom_ids[vertex]);
        }
        slots.into_iter().collect::<Option<Vec<_>>>().ok_or_else(invalid)
    }
}

/// Canonical labeling and fingerprinting.
///
/// Implementations must return the same `key` for isomorphic graphs (elements and bond
/// orders included) regardless of vertex order, and labels that order the vertices of
/// isomorphic graphs identically up to automorphism.
pub trait Canonicalizer {
    fn canonicalize(&self, graph: &FragmentGraph) -> Result<CanonicalForm, CanonicalizationError>;
}

impl<F> Canonicalizer for F
where
    F: Fn(&FragmentGraph) -> Result<CanonicalForm, CanonicalizationError>,
{
    fn canonicalize(&self, graph: &FragmentGraph) -> Result<CanonicalForm, CanonicalizationError> {
        self(graph)
    }
}
