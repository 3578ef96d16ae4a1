//! # Core Models Module
//!
//! Data structures describing an annotated protein structure and the membrane
//! geometry committed onto it.
//!
//! ## Key Components
//!
//! - [`structure`] - The [`structure::Structure`] arena owning chains, residues and atoms
//! - [`chain`] / [`residue`] / [`atom`] - The structural hierarchy
//! - [`secondary`] - Per-residue secondary-structure classes and straight elements
//! - [`membrane`] - Candidate geometries (planar slab, spherical shell) and committed membranes
//! - [`region`] - Region labels and the contiguous segments built from them
//! - [`ids`] - Stable arena handles
//!
//! ## Usage
//!
//! ```ignore
//! use tmscan::core::models::{atom::Atom, chain::ChainType, structure::Structure};
//!
//! let mut structure = Structure::new("1abc");
//! let chain_id = structure.add_chain("A", ChainType::Protein);
//! let residue_id = structure.add_residue(chain_id, 1, 1, "LEU").unwrap();
//! structure.add_atom_to_residue(residue_id, Atom::new("CA", residue_id, Point3::origin()));
//! ```

pub mod atom;
pub mod chain;
pub mod ids;
pub mod membrane;
pub mod region;
pub mod residue;
pub mod secondary;
pub mod structure;
