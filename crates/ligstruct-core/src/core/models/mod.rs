//! # Core Models Module
//!
//! Data structures describing the molecule being assembled: atoms, bonds and the
//! fragments that own them.
//!
//! All atoms and fragments live in one arena, [`system::MolecularSystem`], and refer
//! to each other by slot-map keys ([`ids`]). Merging two fragments is a single arena
//! operation that rewrites the owner of every moved atom and drops the donor, so no
//! stale fragment reference survives a merge.
//!
//! ```
//! use ligstruct::core::models::{atom::Atom, system::MolecularSystem, topology::BondOrder};
//! use nalgebra::Point3;
//!
//! let mut system = MolecularSystem::new();
//! let frag = system.add_fragment("carbonyl");
//! let c = system.add_atom_to_fragment(frag, Atom::new("C", frag, Point3::origin())).unwrap();
//! let o = system.add_atom_to_fragment(frag, Atom::new("O", frag, Point3::new(1.2, 0.0, 0.0))).unwrap();
//! system.add_bond(c, o, BondOrder::Double);
//! assert_eq!(system.fragment(frag).unwrap().len(), 2);
//! ```

pub mod atom;
pub mod fragment;
pub mod ids;
pub mod system;
pub mod topology;
