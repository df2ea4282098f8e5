//! # Engine Module
//!
//! The assembly algorithms, from canonical ordering of a single fragment up to clash
//! resolution on the finished molecule.
//!
//! ## Architecture
//!
//! - **Canonical Ordering** ([`canonicalize`]) - Reorders fragment atoms via the injected oracle
//! - **Template Matching** ([`matcher`]) - Copies whole-fragment coordinates from templates
//! - **Connection Sites** ([`site`]) - Describes the local environment of a bond-to-be
//! - **Rigid Alignment** ([`align`]) - Superposes a site onto junction template positions
//! - **Fragment Connection** ([`connect`]) - Merges junction templates and joins fragments
//! - **Clash Handling** ([`clash`]) - Detection plus single-bond scan and bounded backtracking
//! - **Configuration** ([`config`]) - Tolerances, angle steps and search budgets
//! - **Error Handling** ([`error`]) - Fatal errors and the soft warnings collected on the way
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events

pub mod align;
pub mod canonicalize;
pub mod clash;
pub mod config;
pub mod connect;
pub mod error;
pub mod matcher;
pub mod progress;
pub mod site;
