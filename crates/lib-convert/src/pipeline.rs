//! Conversion pipeline: validate, resolve, solve and compress.

use crate::compress::compress_or_endpoints;
use crate::error::{ConvertError, ConvertResult};
use crate::kparam::{solve_k_params, SampleFailure};
use crate::model::DataModel;
use crate::request::{ConversionRequest, PinDirection};
use crate::resolve::{resolve_parameters, ResolvedParameters};
use lib_types::{Edge, KParameterWaveform};

/// Compressed k-parameters for both edges of one corner.
#[derive(Clone, Debug)]
pub struct EdgePair {
    pub rising: KParameterWaveform,
    pub falling: KParameterWaveform,
}

impl EdgePair {
    pub fn get(&self, edge: Edge) -> &KParameterWaveform {
        match edge {
            Edge::Rising => &self.rising,
            Edge::Falling => &self.falling,
        }
    }

    pub fn is_open_drain(&self) -> bool {
        self.rising.is_open_drain()
    }
}

/// Everything the emitter needs for one request.
#[derive(Clone, Debug)]
pub struct Conversion {
    pub params: ResolvedParameters,

    /// Present for output requests only.
    pub k_params: Option<EdgePair>,

    /// Samples dropped under [`SingularPolicy::Skip`](crate::SingularPolicy::Skip).
    pub skipped: Vec<(Edge, SampleFailure)>,
}

/// Run every numeric stage for `request`.
///
/// Output requests always solve both edges, since the oscillating stimulus
/// needs both. A driver without a `[Falling Waveform]` (or without a
/// `[Rising Waveform]`) therefore fails with
/// [`ConvertError::InsufficientWaveforms`], open-drain models included.
pub fn convert(model: &DataModel, request: &ConversionRequest) -> ConvertResult<Conversion> {
    request.validate(model)?;
    let params = resolve_parameters(model, request.corner)?;

    if request.direction == PinDirection::Input {
        return Ok(Conversion {
            params,
            k_params: None,
            skipped: Vec::new(),
        });
    }

    let mut skipped = Vec::new();
    let mut solve = |edge: Edge| -> ConvertResult<KParameterWaveform> {
        let outcome = solve_k_params(model, request.corner, edge)?.checked(request.singular_policy)?;
        if outcome.waveform.is_empty() {
            return Err(ConvertError::missing_data(format!(
                "no solvable {} samples at {} corner",
                edge, request.corner
            )));
        }
        skipped.extend(outcome.failures.iter().map(|f| (edge, *f)));
        Ok(compress_or_endpoints(&outcome.waveform, request.compression_threshold))
    };

    let rising = solve(Edge::Rising)?;
    let falling = solve(Edge::Falling)?;

    tracing::info!(
        "Converted {} at {} corner: {} rising / {} falling breakpoints",
        model.model_name,
        request.corner,
        rising.len(),
        falling.len()
    );

    Ok(Conversion {
        params,
        k_params: Some(EdgePair { rising, falling }),
        skipped,
    })
}
