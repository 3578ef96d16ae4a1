//! # tmscan Core Library
//!
//! Membrane placement search and residue topology classification for
//! protein structures that are already annotated with solvent exposure and
//! secondary structure.
//!
//! ## Architectural Philosophy
//!
//! The library keeps the same three-layer split throughout:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Structure`, chains,
//!   residues, membranes, region segments), amino-acid reference tables,
//!   geometry helpers and the annotated-table I/O.
//!
//! - **[`engine`]: The Logic Core.** The stateful search: candidate normal
//!   sampling, slice scoring of planar and curved membrane models, the
//!   optimizer that keeps the best candidate, and the side detector with
//!   its pluggable region rules.
//!
//! - **[`workflows`]: The Public API.** One-call detection that ties `engine`
//!   and `core` together, from chain selection to the final report.

pub mod core;
pub mod engine;
pub mod workflows;
