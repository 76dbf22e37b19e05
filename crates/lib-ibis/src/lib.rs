//! # lib-ibis
//!
//! IBIS file parser for ibis2spice.
//!
//! This crate turns `.ibs` text into the typed model consumed by the
//! conversion pipeline: components with their package parasitics and pin
//! lists, and buffer models with parameter triples, I-V tables and V-T
//! waveforms. Numeric fields are parsed with the `nom` parser combinator
//! library so IBIS scale suffixes and trailing units are handled uniformly.

pub mod error;
pub mod ibs_parser;

pub use error::ParseError;
pub use ibs_parser::{
    parse_ibs_file, parse_ibs_path, Component, IbisFile, IbisHeader, Model, ModelType, Package,
    Pin,
};
