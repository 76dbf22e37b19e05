//! Non-fatal findings collected while rendering a document.

use lib_convert::SampleFailure;
use lib_types::Edge;
use serde::Serialize;
use std::fmt;

/// Something the emitter changed or dropped; also written into the netlist
/// as a comment where it affects the text.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum EmitWarning {
    /// A package parameter was exactly zero.
    ZeroValuedParameter { name: &'static str, substitute: f64 },
    /// A package parameter was not given in the file.
    MissingParameter { name: &'static str, substitute: f64 },
    /// The requested frequency and duty cycle leave no room for a gap.
    ClampedGap { name: &'static str, computed: f64 },
}

impl fmt::Display for EmitWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmitWarning::ZeroValuedParameter { name, substitute } => {
                write!(f, "{} is zero, using {:e}", name, substitute)
            }
            EmitWarning::MissingParameter { name, substitute } => {
                write!(f, "{} not specified, using {:e}", name, substitute)
            }
            EmitWarning::ClampedGap { name, computed } => {
                write!(f, "{} evaluates to {:e} s at the default frequency and duty, clamped to 0.1p", name, computed)
            }
        }
    }
}

/// Outcome of a successful render.
#[derive(Clone, Debug, Default, Serialize)]
pub struct EmitReport {
    pub warnings: Vec<EmitWarning>,

    /// K-parameter samples left out because they could not be solved.
    pub skipped: Vec<(Edge, SampleFailure)>,
}

impl EmitReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.skipped.is_empty()
    }
}
