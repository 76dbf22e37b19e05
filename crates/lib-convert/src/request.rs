//! What the caller wants generated, validated against the model before any
//! output is produced.

use crate::compress::DEFAULT_THRESHOLD;
use crate::error::{ConvertError, ConvertResult};
use crate::kparam::SingularPolicy;
use crate::model::DataModel;
use lib_ibis::ModelType;
use lib_types::{Corner, Hertz, Seconds};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the pin the generated model represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinDirection {
    /// Receiver: package, die capacitance and clamps.
    Input,
    /// Driver with k-parameter stimulus sources.
    Output,
}

impl fmt::Display for PinDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinDirection::Input => f.write_str("input"),
            PinDirection::Output => f.write_str("output"),
        }
    }
}

/// Netlist flavour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Portable syntax, fixed oscillation stimulus.
    #[default]
    Generic,
    /// LTspice syntax with selectable stimulus.
    #[serde(alias = "lt-spice")]
    LtSpice,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Generic => f.write_str("Generic"),
            Dialect::LtSpice => f.write_str("LTspice"),
        }
    }
}

/// Drive pattern selected by the `stimulus` instance parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StimulusMode {
    #[default]
    Oscillate,
    InvertedOscillate,
    RisingEdge,
    FallingEdge,
    StuckHigh,
    StuckLow,
}

impl StimulusMode {
    pub const ALL: [StimulusMode; 6] = [
        StimulusMode::Oscillate,
        StimulusMode::InvertedOscillate,
        StimulusMode::RisingEdge,
        StimulusMode::FallingEdge,
        StimulusMode::StuckHigh,
        StimulusMode::StuckLow,
    ];

    /// Value of the `stimulus` parameter selecting this mode.
    pub fn index(self) -> u8 {
        match self {
            StimulusMode::Oscillate => 0,
            StimulusMode::InvertedOscillate => 1,
            StimulusMode::RisingEdge => 2,
            StimulusMode::FallingEdge => 3,
            StimulusMode::StuckHigh => 4,
            StimulusMode::StuckLow => 5,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            StimulusMode::Oscillate => "Oscillate",
            StimulusMode::InvertedOscillate => "Inverted Oscillate",
            StimulusMode::RisingEdge => "Rising Edge",
            StimulusMode::FallingEdge => "Falling Edge",
            StimulusMode::StuckHigh => "Stuck High",
            StimulusMode::StuckLow => "Stuck Low",
        }
    }
}

/// Default instance parameters of the generated output subcircuit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StimulusSettings {
    pub mode: StimulusMode,

    /// Delay before a single edge starts.
    pub delay: Seconds,

    /// Oscillation frequency.
    pub freq: Hertz,

    /// Fraction of the period spent high, exclusive of 0 and 1.
    pub duty: f64,
}

impl Default for StimulusSettings {
    fn default() -> Self {
        Self {
            mode: StimulusMode::Oscillate,
            delay: Seconds::from_ns(10.0),
            freq: Hertz::from_mhz(10.0),
            duty: 0.5,
        }
    }
}

impl StimulusSettings {
    pub fn validate(&self) -> ConvertResult<()> {
        if !(self.freq.0 > 0.0 && self.freq.0.is_finite()) {
            return Err(ConvertError::InvalidInput(format!(
                "frequency must be positive, got {}",
                self.freq.0
            )));
        }
        if !(self.duty > 0.0 && self.duty < 1.0) {
            return Err(ConvertError::InvalidInput(format!(
                "duty cycle must be between 0 and 1, got {}",
                self.duty
            )));
        }
        if !(self.delay.0 >= 0.0 && self.delay.0.is_finite()) {
            return Err(ConvertError::InvalidInput(format!(
                "delay must be non-negative, got {}",
                self.delay.0
            )));
        }
        Ok(())
    }
}

/// One subcircuit to generate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConversionRequest {
    pub direction: PinDirection,
    pub dialect: Dialect,
    pub corner: Corner,
    pub stimulus: StimulusSettings,
    pub compression_threshold: f64,
    pub singular_policy: SingularPolicy,
}

impl ConversionRequest {
    pub fn new(direction: PinDirection, dialect: Dialect, corner: Corner) -> Self {
        Self {
            direction,
            dialect,
            corner,
            stimulus: StimulusSettings::default(),
            compression_threshold: DEFAULT_THRESHOLD,
            singular_policy: SingularPolicy::default(),
        }
    }

    /// Check the request against `model` without computing anything.
    pub fn validate(&self, model: &DataModel) -> ConvertResult<()> {
        let mismatch = || ConvertError::IoTypeMismatch {
            direction: self.direction.to_string(),
            model_type: model.model_type_name.clone(),
        };

        match self.direction {
            PinDirection::Output if !model.kind.is_driver() => return Err(mismatch()),
            PinDirection::Input
                if matches!(
                    model.model_type,
                    ModelType::Output | ModelType::OpenDrain | ModelType::OpenSink
                ) =>
            {
                return Err(mismatch())
            }
            _ => {}
        }

        if !(self.compression_threshold >= 0.0) {
            return Err(ConvertError::InvalidInput(format!(
                "compression threshold must be non-negative, got {}",
                self.compression_threshold
            )));
        }

        if self.direction == PinDirection::Output {
            self.stimulus.validate()?;
            if self.dialect == Dialect::Generic && self.stimulus.mode != StimulusMode::Oscillate {
                return Err(ConvertError::InvalidInput(format!(
                    "{} dialect only drives the Oscillate stimulus, got {}",
                    self.dialect,
                    self.stimulus.mode.description()
                )));
            }
        }
        Ok(())
    }
}
