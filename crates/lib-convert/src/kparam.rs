//! K-parameter extraction.
//!
//! An IBIS pullup or pulldown table describes the device fully on. During a
//! transition the buffer is somewhere in between, and the measured V-T
//! waveforms tell us where: at every instant the device currents, scaled by
//! `k_u` and `k_d`, must balance the clamp, fixture and die-capacitance
//! currents at the die node.
//!
//! Push-pull buffers have two unknowns per sample, so two waveforms measured
//! into different fixtures are needed and each sample is a 2x2 solve.
//! Open-drain buffers only have `k_d`, which one waveform determines.

use crate::error::{ConvertError, ConvertResult};
use crate::model::{BufferKind, DataModel};
use crate::synth::{synthesize, CurrentSet};
use lib_types::{Corner, Edge, KParameterWaveform, VtWaveform};
use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};

/// Relative determinant below which a 2x2 sample counts as singular.
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// What to do with samples whose system could not be solved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SingularPolicy {
    /// Any failed sample fails the whole solve.
    #[default]
    Reject,
    /// Failed samples are dropped from the waveform and reported.
    Skip,
}

/// A sample that could not be solved.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SampleFailure {
    /// Index into the common time base.
    pub index: usize,
    pub time: f64,
}

/// Result of solving one (corner, edge) pair.
#[derive(Clone, Debug)]
pub struct SolveOutcome {
    pub edge: Edge,
    pub corner: Corner,

    /// Solved samples only; failed samples are absent, never zero-filled.
    pub waveform: KParameterWaveform,
    pub failures: Vec<SampleFailure>,
}

impl SolveOutcome {
    /// Apply `policy` to the failure list.
    pub fn checked(self, policy: SingularPolicy) -> ConvertResult<Self> {
        let Some(first) = self.failures.first().copied() else {
            return Ok(self);
        };

        match policy {
            SingularPolicy::Reject => {
                let samples = self.failures.iter().map(|f| f.index).collect();
                Err(if self.waveform.is_open_drain() {
                    ConvertError::DegenerateDivision {
                        edge: self.edge,
                        corner: self.corner,
                        samples,
                        first_time: first.time,
                    }
                } else {
                    ConvertError::SingularSystem {
                        edge: self.edge,
                        corner: self.corner,
                        samples,
                        first_time: first.time,
                    }
                })
            }
            SingularPolicy::Skip => {
                for failure in &self.failures {
                    tracing::warn!(
                        "Skipping unsolvable {} sample {} at t={:e} ({} corner)",
                        self.edge,
                        failure.index,
                        failure.time,
                        self.corner
                    );
                }
                Ok(self)
            }
        }
    }
}

/// Sorted, duplicate-free union of the waveforms' time axes.
pub fn common_time_base(waveforms: &[&VtWaveform]) -> Vec<f64> {
    let mut time: Vec<f64> = waveforms.iter().flat_map(|w| w.times()).collect();
    time.sort_by(|a, b| a.total_cmp(b));
    time.dedup();
    time
}

/// Solve the k-parameters of `model` for one corner and edge.
///
/// Push-pull models use the first two waveforms of the edge, open-drain
/// models the first one. Unsolvable samples are collected in
/// [`SolveOutcome::failures`]; use [`SolveOutcome::checked`] to turn them
/// into an error.
pub fn solve_k_params(model: &DataModel, corner: Corner, edge: Edge) -> ConvertResult<SolveOutcome> {
    let waveforms = model.waveforms(edge);
    let needed = model.kind.waveforms_needed();

    match model.kind {
        BufferKind::Input => {
            return Err(ConvertError::IoTypeMismatch {
                direction: "output".to_string(),
                model_type: model.model_type_name.clone(),
            })
        }
        _ if waveforms.len() < needed => {
            return Err(ConvertError::InsufficientWaveforms {
                edge,
                needed,
                got: waveforms.len(),
            })
        }
        _ => {}
    }

    let outcome = match model.kind {
        BufferKind::OpenDrain => solve_open_drain(model, corner, edge, &waveforms[0])?,
        _ => solve_push_pull(model, corner, edge, &waveforms[0], &waveforms[1])?,
    };

    tracing::debug!(
        "Solved {} {} k-parameters for {}: {} samples, {} failed",
        corner,
        edge,
        model.model_name,
        outcome.waveform.len(),
        outcome.failures.len()
    );

    Ok(outcome)
}

fn solve_push_pull(
    model: &DataModel,
    corner: Corner,
    edge: Edge,
    first: &VtWaveform,
    second: &VtWaveform,
) -> ConvertResult<SolveOutcome> {
    let time = common_time_base(&[first, second]);
    let set1 = synthesize(model, &time, corner, first)?;
    let set2 = synthesize(model, &time, corner, second)?;

    let mut solved_time = Vec::with_capacity(time.len());
    let mut k_u = Vec::with_capacity(time.len());
    let mut k_d = Vec::with_capacity(time.len());
    let mut failures = Vec::new();

    for (n, &t) in time.iter().enumerate() {
        match solve_sample(&set1, &set2, n) {
            Some((ku, kd)) => {
                solved_time.push(t);
                k_u.push(ku);
                k_d.push(kd);
            }
            None => failures.push(SampleFailure { index: n, time: t }),
        }
    }

    Ok(SolveOutcome {
        edge,
        corner,
        waveform: KParameterWaveform::push_pull(solved_time, k_u, k_d),
        failures,
    })
}

/// Solve `[[pu1, pd1], [pu2, pd2]] * [k_u, k_d] = [known1, known2]`.
fn solve_sample(set1: &CurrentSet, set2: &CurrentSet, n: usize) -> Option<(f64, f64)> {
    let a = Matrix2::new(
        set1.i_pullup[n],
        set1.i_pulldown[n],
        set2.i_pullup[n],
        set2.i_pulldown[n],
    );
    let b = Vector2::new(set1.known(n), set2.known(n));

    let scale = a.amax();
    let det = a.determinant();
    if !det.is_finite() || scale == 0.0 || det.abs() <= SINGULAR_TOLERANCE * scale * scale {
        return None;
    }

    let x = a.lu().solve(&b)?;
    if x[0].is_finite() && x[1].is_finite() {
        Some((x[0], x[1]))
    } else {
        None
    }
}

fn solve_open_drain(
    model: &DataModel,
    corner: Corner,
    edge: Edge,
    waveform: &VtWaveform,
) -> ConvertResult<SolveOutcome> {
    let time = common_time_base(&[waveform]);
    let set = synthesize(model, &time, corner, waveform)?;

    let mut solved_time = Vec::with_capacity(time.len());
    let mut k_d = Vec::with_capacity(time.len());
    let mut failures = Vec::new();

    for (n, &t) in time.iter().enumerate() {
        let pd = set.i_pulldown[n];
        let k = set.known(n) / pd;
        if pd != 0.0 && k.is_finite() {
            solved_time.push(t);
            k_d.push(k);
        } else {
            failures.push(SampleFailure { index: n, time: t });
        }
    }

    Ok(SolveOutcome {
        edge,
        corner,
        waveform: KParameterWaveform::pulldown_only(solved_time, k_d),
        failures,
    })
}
