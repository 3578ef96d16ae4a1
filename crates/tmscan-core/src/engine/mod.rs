//! # Engine Module
//!
//! The stateful search layer of tmscan: it looks for the membrane placement
//! that best explains a structure and then labels residues relative to it.
//!
//! ## Overview
//!
//! A search starts from a set of candidate normals produced by the
//! [`sampler`]. For each normal the [`scorer`] slices the structure
//! perpendicular to it, scores every slice for membrane-likeness and fits a
//! slab (or, for curved membranes, a spherical shell) over the best run of
//! slices. The [`optimizer`] keeps the best candidate, commits it to the
//! structure and optionally looks for a second membrane. Finally the
//! [`sides`] detector classifies residues and the [`regions`] rules clean up
//! the resulting topology.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Search parameters and region rule settings
//! - **Candidate Normals** ([`sampler`]) - Deterministic quasi-uniform direction sampling
//! - **Search Space** ([`cache`]) - Per-residue features and per-candidate distance caches
//! - **Scoring** ([`scorer`]) - Slice profiles, run detection and boundary fitting
//! - **Optimization** ([`optimizer`], [`state`]) - Candidate evaluation and best tracking
//! - **Chain Selection** ([`selection`]) - Deciding which chains take part in the search
//! - **Topology** ([`sides`], [`regions`]) - Residue side labels and region segments
//! - **Progress Monitoring** ([`progress`]) - Callbacks for long sweeps
//! - **Error Handling** ([`error`]) - Engine-specific error types

pub mod cache;
pub mod config;
pub mod error;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod optimizer;
pub mod progress;
pub mod regions;
pub mod sampler;
pub mod scorer;
pub mod selection;
pub mod sides;
pub mod state;
