//! # Workflows Module
//!
//! High-level entry points that run the complete assembly pipeline.
//!
//! ## Architecture
//!
//! - **Assembly Workflow** ([`assemble`]) - Canonical ordering, template matching, fragment
//!   connection and clash resolution, in that order, over one input molecule.
//!
//! Reference data (templates and tables) is borrowed from the caller, so a single set of
//! libraries can serve many assemblies.

pub mod assemble;
