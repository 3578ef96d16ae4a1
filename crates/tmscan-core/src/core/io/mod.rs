//! Reading and writing of the tabular formats tmscan exchanges with its collaborators.
//!
//! The structure itself comes in as a per-atom CSV annotated with exposure and
//! secondary structure ([`atom_table`]); region segments can be written back
//! out as a per-segment CSV ([`region_table`]).

pub mod atom_table;
pub mod error;
pub mod region_table;
pub mod traits;
