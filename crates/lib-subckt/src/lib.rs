//! # lib-subckt
//!
//! SPICE subcircuit emitter for converted IBIS buffer models.
//!
//! Documents are assembled from small string-returning sections with a
//! line builder. Rendering is pure; only [`generate_spice_model`] touches
//! the filesystem.

pub mod builder;
pub mod report;
pub mod sections;
pub mod stimulus;
pub mod document;
pub mod writer;

pub use builder::{num, si, TextBuilder};
pub use document::{render, render_document, subckt_name};
pub use report::{EmitReport, EmitWarning};
pub use stimulus::{crossover_offsets, GapOffsets, MIN_GAP};
pub use writer::generate_spice_model;
