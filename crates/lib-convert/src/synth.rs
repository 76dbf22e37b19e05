//! Per-device current synthesis from a switching waveform.

use crate::curve::{get_current, interp};
use crate::error::{ConvertError, ConvertResult};
use crate::model::DataModel;
use crate::resolve::{resolve_reference, Fallback};
use lib_types::{Corner, ParameterTriple, VtWaveform};

/// Currents at the die node over a common time base, one entry per sample.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CurrentSet {
    pub i_pullup: Vec<f64>,
    pub i_pulldown: Vec<f64>,
    pub i_pwr_clamp: Vec<f64>,
    pub i_gnd_clamp: Vec<f64>,
    pub i_fixture: Vec<f64>,
    pub i_die_cap: Vec<f64>,
}

impl CurrentSet {
    /// Current not carried by the pullup or pulldown device at sample `n`.
    #[inline]
    pub fn known(&self, n: usize) -> f64 {
        self.i_gnd_clamp[n] + self.i_pwr_clamp[n] + self.i_fixture[n] - self.i_die_cap[n]
    }

    pub fn len(&self) -> usize {
        self.i_fixture.len()
    }

    pub fn is_empty(&self) -> bool {
        self.i_fixture.is_empty()
    }
}

/// Piecewise derivative `dy/dx`, same length as the input.
///
/// The slope of the last interval is repeated for the final sample. Fewer
/// than two samples give a zero derivative.
pub fn differentiate(y: &[f64], x: &[f64]) -> Vec<f64> {
    let n = y.len().min(x.len());
    if n < 2 {
        return vec![0.0; n];
    }

    let mut out: Vec<f64> = (1..n).map(|i| (y[i] - y[i - 1]) / (x[i] - x[i - 1])).collect();
    out.push(out[n - 2]);
    out
}

/// Synthesize every die-node current for `waveform` at `time_samples`.
///
/// The pullup is adjusted against the power clamp and the pulldown against
/// the ground clamp. References are only resolved for tables that exist, so a
/// model without a pullup needs no pullup reference.
pub fn synthesize(
    model: &DataModel,
    time_samples: &[f64],
    corner: Corner,
    waveform: &VtWaveform,
) -> ConvertResult<CurrentSet> {
    let v = interp(time_samples, &waveform.times(), &waveform.voltages(corner));

    let rail = Fallback::Triple(model.v_range.as_ref());
    let ground = Fallback::Scalar(0.0);
    let reference = |curve_present: bool,
                     explicit: Option<&ParameterTriple>,
                     fallback: Fallback<'_>|
     -> ConvertResult<f64> {
        if curve_present {
            resolve_reference(explicit, fallback, corner)
        } else {
            Ok(0.0)
        }
    };

    let pullup_ref = reference(model.iv_pullup.is_some(), model.pullup_ref.as_ref(), rail)?;
    let pulldown_ref = reference(model.iv_pulldown.is_some(), model.pulldown_ref.as_ref(), ground)?;
    let pwr_clamp_ref = reference(model.iv_pwr_clamp.is_some(), model.pwr_clamp_ref.as_ref(), rail)?;
    let gnd_clamp_ref = reference(model.iv_gnd_clamp.is_some(), model.gnd_clamp_ref.as_ref(), ground)?;

    let i_pullup = get_current(
        &v,
        model.iv_pullup.as_ref(),
        pullup_ref,
        corner,
        model.iv_pwr_clamp.as_ref(),
    );
    let i_pulldown = get_current(
        &v,
        model.iv_pulldown.as_ref(),
        pulldown_ref,
        corner,
        model.iv_gnd_clamp.as_ref(),
    );
    let i_pwr_clamp = get_current(&v, model.iv_pwr_clamp.as_ref(), pwr_clamp_ref, corner, None);
    let i_gnd_clamp = get_current(&v, model.iv_gnd_clamp.as_ref(), gnd_clamp_ref, corner, None);

    let v_fixture = waveform
        .v_fixture
        .at(corner)
        .ok_or_else(|| ConvertError::missing_data(format!("V_fixture for {} corner", corner)))?;
    if waveform.r_fixture == 0.0 || !waveform.r_fixture.is_finite() {
        return Err(ConvertError::InvalidInput(format!(
            "R_fixture must be non-zero, got {}",
            waveform.r_fixture
        )));
    }
    let i_fixture = v.iter().map(|&vt| (v_fixture - vt) / waveform.r_fixture).collect();

    let c_comp = model
        .c_comp
        .as_ref()
        .and_then(|t| t.at(corner))
        .ok_or_else(|| ConvertError::missing_data(format!("C_comp for model {}", model.model_name)))?;
    let i_die_cap = differentiate(&v, time_samples)
        .into_iter()
        .map(|dv| c_comp * dv)
        .collect();

    Ok(CurrentSet {
        i_pullup,
        i_pulldown,
        i_pwr_clamp,
        i_gnd_clamp,
        i_fixture,
        i_die_cap,
    })
}
