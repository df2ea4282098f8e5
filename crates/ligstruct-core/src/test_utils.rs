//! Fixtures shared by the unit tests.

use crate::core::canon::{CanonicalForm, CanonicalizationError, Canonicalizer, FragmentGraph};
use crate::core::models::atom::Atom;
use crate::core::models::ids::{AtomId, FragmentId};
use crate::core::models::system::MolecularSystem;
use crate::core::models::topology::BondOrder;
use crate::core::tables::vdw::VdwRadii;
use crate::core::templates::{JunctionTemplate, TemplateAtom};
use itertools::Itertools;
use nalgebra::Point3;

const MAX_EXHAUSTIVE_ATOMS: usize = 8;

/// Reference oracle: the lexicographically smallest encoding over all vertex orders.
pub(crate) struct ExhaustiveCanonicalizer;

impl Canonicalizer for ExhaustiveCanonicalizer {
    fn canonicalize(&self, graph: &FragmentGraph) -> Result<CanonicalForm, CanonicalizationError> {
        let n = graph.len();
        if n == 0 {
            return Err(CanonicalizationError::EmptyGraph);
        }
        let components = graph.component_count();
        if components > 1 {
            return Err(CanonicalizationError::Disconnected { components });
        }
        if n > MAX_EXHAUSTIVE_ATOMS {
            return Err(CanonicalizationError::Oracle(format!(
                "{} atoms exceed the exhaustive limit of {}",
                n, MAX_EXHAUSTIVE_ATOMS
            )));
        }

        let mut best: Option<(String, Vec<usize>)> = None;
        for order in (0..n).permutations(n) {
            let mut position = vec![0; n];
            for (p, &v) in order.iter().enumerate() {
                position[v] = p;
            }
            let encoding = encode(graph, &order, &position);
            if best.as_ref().is_none_or(|(key, _)| encoding < *key) {
                best = Some((encoding, position));
            }
        }
        let (key, labels) = best.ok_or(CanonicalizationError::EmptyGraph)?;
        Ok(CanonicalForm { labels, key })
    }
}

fn encode(graph: &FragmentGraph, order: &[usize], position: &[usize]) -> String {
    let elements = order.iter().map(|&v| graph.elements[v].as_str()).join(",");
    let edges = graph
        .edges
        .iter()
        .map(|&(i, j, bond_order)| {
            let (a, b) = (position[i], position[j]);
            (a.min(b), a.max(b), bond_order.numeric())
        })
        .sorted()
        .map(|(a, b, o)| format!("{}-{}:{}", a, b, o))
        .join(";");
    format!("{}|{}", elements, edges)
}

pub(crate) fn build_fragment_at(
    system: &mut MolecularSystem,
    name: &str,
    atoms: &[(&str, Point3<f64>)],
    bonds: &[(usize, usize, BondOrder)],
) -> (FragmentId, Vec<AtomId>) {
    let fragment_id = system.add_fragment(name);
    let ids: Vec<AtomId> = atoms
        .iter()
        .map(|&(element, position)| {
            system
                .add_atom_to_fragment(fragment_id, Atom::new(element, fragment_id, position))
                .unwrap()
        })
        .collect();
    for &(i, j, order) in bonds {
        system.add_bond(ids[i], ids[j], order).unwrap();
    }
    (fragment_id, ids)
}

pub(crate) fn build_fragment(
    system: &mut MolecularSystem,
    name: &str,
    elements: &[&str],
    bonds: &[(usize, usize)],
) -> FragmentId {
    let atoms: Vec<_> = elements.iter().map(|&e| (e, Point3::origin())).collect();
    let bonds: Vec<_> = bonds
        .iter()
        .map(|&(i, j)| (i, j, BondOrder::Single))
        .collect();
    build_fragment_at(system, name, &atoms, &bonds).0
}

/// Trigonal CH2 unit: carbon at the origin, hydrogens at 120 degrees from +x.
pub(crate) fn methylene_positions() -> [Point3<f64>; 3] {
    let h = |degrees: f64| {
        let radians = degrees.to_radians();
        Point3::new(1.09 * radians.cos(), 1.09 * radians.sin(), 0.0)
    };
    [Point3::origin(), h(120.0), h(240.0)]
}

/// Junction for a CH2 carbon whose pending partner sorts first (placeholder at index 1,
/// on +x at `length`).
pub(crate) fn methylene_junction(partner: &str, length: f64) -> JunctionTemplate {
    let [c, h1, h2] = methylene_positions();
    JunctionTemplate::new(vec![
        TemplateAtom::new("C", c),
        TemplateAtom::new(partner, Point3::new(length, 0.0, 0.0)),
        TemplateAtom::new("H", h1),
        TemplateAtom::new("H", h2),
    ])
}

pub(crate) fn test_radii() -> VdwRadii {
    [("S", 0.9), ("C", 0.3), ("H", 0.5), ("N", 0.6), ("O", 0.6)]
        .into_iter()
        .collect()
}

/// S-C-C-S with both sulfurs on the same side of the C-C bond, 1.5 apart.
pub(crate) fn cis_chain(system: &mut MolecularSystem) -> Vec<AtomId> {
    build_fragment_at(
        system,
        "chain",
        &[
            ("S", Point3::new(0.0, 1.0, 0.0)),
            ("C", Point3::origin()),
            ("C", Point3::new(1.5, 0.0, 0.0)),
            ("S", Point3::new(1.5, 1.0, 0.0)),
        ],
        &[
            (0, 1, BondOrder::Single),
            (1, 2, BondOrder::Single),
            (2, 3, BondOrder::Single),
        ],
    )
    .1
}

/// [`cis_chain`] plus a two-carbon branch on the second atom, pointing away from the
/// clash.
pub(crate) fn branched_cis_chain(system: &mut MolecularSystem) -> (Vec<AtomId>, Vec<AtomId>) {
    let (_, ids) = build_fragment_at(
        system,
        "branched",
        &[
            ("S", Point3::new(0.0, 1.0, 0.0)),
            ("C", Point3::origin()),
            ("C", Point3::new(1.5, 0.0, 0.0)),
            ("S", Point3::new(1.5, 1.0, 0.0)),
            ("C", Point3::new(-1.0, -0.5, -0.5)),
            ("C", Point3::new(-2.0, -1.0, -1.0)),
        ],
        &[
            (0, 1, BondOrder::Single),
            (1, 2, BondOrder::Single),
            (2, 3, BondOrder::Single),
            (1, 4, BondOrder::Single),
            (4, 5, BondOrder::Single),
        ],
    );
    (ids[..4].to_vec(), ids[4..].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhaustive_canonicalizer_labels_are_a_permutation() {
        let mut system = MolecularSystem::new();
        let fid = build_fragment(&mut system, "f", &["N", "C", "O", "C"], &[(0, 1), (1, 2), (2, 3)]);
        let graph = FragmentGraph::from_fragment(&system, fid).unwrap();

        let form = ExhaustiveCanonicalizer.canonicalize(&graph).unwrap();

        assert_eq!(form.labels.iter().copied().sorted().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert!(form.canonical_order(&graph).is_ok());
    }
}
