//! # Workflows Module
//!
//! High-level entry points that run a complete membrane detection on a
//! structure in one call.
//!
//! ## Overview
//!
//! A workflow sequences the [`crate::engine`] components: it selects the
//! chains that take part in the search, runs symmetry-seeded and exhaustive
//! normal searches, commits the winning membrane(s) to the structure and
//! labels every residue relative to them. Progress is reported through a
//! [`crate::engine::progress::ProgressReporter`] and the outcome is returned
//! as a serializable report.
//!
//! - **Detection Workflow** ([`detect`]) - Membrane search, commit and topology annotation

pub mod detect;
