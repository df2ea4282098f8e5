//! # LigStruct Core Library
//!
//! Three-dimensional assembly of ligands from rigid fragments.
//!
//! A molecule arrives split into fragments together with the bonds that must be formed
//! between them. Each fragment is put into canonical atom order, receives coordinates from
//! a stored template, and is then joined to its neighbors by superposing the bonding sites
//! onto junction templates. Steric clashes introduced along the way are relieved by
//! rotating about the new bonds.
//!
//! ## Architectural Philosophy
//!
//! - **[`core`]: The Foundation.** Stateless data: the atom/fragment arena
//!   (`MolecularSystem`), template entries, reference tables, geometry helpers and the
//!   interface to the external canonicalization oracle.
//!
//! - **[`engine`]: The Logic Core.** The individual algorithms: site location, rigid
//!   alignment, fragment connection and clash resolution, along with configuration,
//!   errors and progress reporting.
//!
//! - **[`workflows`]: The Public API.** [`workflows::assemble::run`] drives the whole
//!   pipeline and returns the assembled molecule with its warnings.

pub mod core;
pub mod engine;
pub mod workflows;

#[cfg(test)]
mod test_utils;
