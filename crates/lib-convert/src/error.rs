//! Error types for conversion operations.

use lib_types::{Corner, Edge};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while converting an IBIS model.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Requested component or model does not exist in the file.
    #[error("{kind} '{name}' not found")]
    MissingModel { kind: &'static str, name: String },

    /// Model type outside the supported set.
    #[error("Unsupported model type: {0}")]
    UnsupportedModelType(String),

    /// Requested pin direction is incompatible with the model type.
    #[error("Cannot build a {direction} model from a '{model_type}' buffer")]
    IoTypeMismatch { direction: String, model_type: String },

    /// A structurally required value is absent.
    #[error("Missing data: {0}")]
    MissingData(String),

    /// Not enough V-T waveforms for the solve.
    #[error("Need at least {needed} {edge} waveforms, got {got}")]
    InsufficientWaveforms { edge: Edge, needed: usize, got: usize },

    /// The 2x2 system was numerically singular at one or more samples.
    #[error("Singular k-parameter system for {edge} edge at {corner} corner ({} samples, first at t={first_time:e})", .samples.len())]
    SingularSystem {
        edge: Edge,
        corner: Corner,
        samples: Vec<usize>,
        first_time: f64,
    },

    /// Open-drain pulldown current was zero at one or more samples.
    #[error("Zero pulldown current for {edge} edge at {corner} corner ({} samples, first at t={first_time:e})", .samples.len())]
    DegenerateDivision {
        edge: Edge,
        corner: Corner,
        samples: Vec<usize>,
        first_time: f64,
    },

    /// Invalid caller-supplied input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Writing the output document failed.
    #[error("Failed to write {}: {source}", .path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub fn missing_data(what: impl Into<String>) -> Self {
        Self::MissingData(what.into())
    }
}

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;
