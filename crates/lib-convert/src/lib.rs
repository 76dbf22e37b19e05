//! # lib-convert
//!
//! Conversion core for ibis2spice.
//!
//! This crate turns a parsed IBIS buffer model into the numbers a behavioral
//! SPICE subcircuit needs:
//!
//! - **Model assembly**: component package plus model data as one [`DataModel`]
//! - **Parameter resolution**: per-corner scalars and reference fallbacks
//! - **Curve handling**: I-V interpolation and clamp adjustment
//! - **Current synthesis**: die-node currents from a V-T waveform
//! - **K-parameter solve**: per-sample drive multipliers via small linear solves
//! - **Compression**: removal of redundant k-parameter samples

pub mod error;
pub mod model;
pub mod resolve;
pub mod curve;
pub mod synth;
pub mod kparam;
pub mod compress;
pub mod request;
pub mod pipeline;

pub use error::{ConvertError, ConvertResult};
pub use model::{BufferKind, DataModel};
pub use resolve::{resolve_parameters, resolve_reference, Fallback, ResolvedParameters};
pub use kparam::{solve_k_params, SampleFailure, SingularPolicy, SolveOutcome};
pub use compress::{compress, DEFAULT_THRESHOLD};
pub use request::{ConversionRequest, Dialect, PinDirection, StimulusMode, StimulusSettings};
pub use pipeline::{convert, Conversion, EdgePair};
