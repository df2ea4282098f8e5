//! # Core Module
//!
//! Stateless building blocks of the assembler: the atom/fragment arena, the injected
//! canonicalization interface, template entries and the reference tables the engine
//! consumes.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atoms, fragments and bonds stored in a slotmap arena
//! - **Canonical Ordering** ([`canon`]) - Fragment graphs and the pluggable labelling oracle
//! - **Templates** ([`templates`]) - Whole-fragment coordinate templates and junction templates
//! - **Reference Tables** ([`tables`]) - Standard bond lengths and van der Waals radii
//! - **Geometry** ([`utils`]) - Rigid transforms, three-point superposition and dihedral rotation

pub mod canon;
pub mod models;
pub mod tables;
pub mod templates;
pub mod utils;
