//! # Core Module
//!
//! Stateless building blocks of tmscan: the in-memory structural model that the
//! membrane search operates on, the reference tables it scores against, and
//! the annotated-table I/O used to get structures in and results out.
//!
//! ## Architecture
//!
//! - **Structural Model** ([`models`]) - Atoms, residues, chains, secondary-structure
//!   elements, committed membranes and region segments, stored in slot-map arenas
//! - **File I/O** ([`io`]) - Reading and writing the per-atom annotation table and
//!   per-chain region tables
//! - **Reference Data and Geometry** ([`utils`]) - Amino-acid property tables and
//!   small vector helpers
//!
//! Nothing in this layer knows about candidate search; the [`crate::engine`] layer
//! borrows these types read-only during a search and writes back only the final
//! committed geometry and labels.

pub mod io;
pub mod models;
pub mod utils;
