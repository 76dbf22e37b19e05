//! # lib-types
//!
//! Core type definitions shared across the ibis2spice workspace.
//!
//! This crate provides the data model the conversion pipeline operates on:
//! - Physical units with compile-time safety
//! - Typical/minimum/maximum parameter triples and the corner selector
//! - I-V tables for pullup, pulldown and clamp devices
//! - V-T switching waveforms and the derived k-parameter waveforms

pub mod units;
pub mod triple;
pub mod curve;
pub mod waveform;

pub use units::*;
pub use triple::*;
pub use curve::*;
pub use waveform::*;
