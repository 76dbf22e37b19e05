//! PWL stimulus rendering for k-parameter control sources.
//!
//! An oscillating output is a rising k-parameter edge, a flat gap, a falling
//! edge and a second gap, repeated. The gaps are sized inside the netlist
//! from the `freq` and `duty` instance parameters so a placed instance can
//! change them; the edge shape itself is fixed by the solved waveforms.

use crate::builder::num;
use crate::report::EmitWarning;
use lib_convert::EdgePair;
use lib_types::{Hertz, KParameterWaveform};

/// Smallest gap emitted, substituted for non-positive computed gaps.
pub const MIN_GAP: f64 = 0.1e-12;

/// Step used to leave the first breakpoint of a segment.
const START_STEP: &str = "0.01p";

/// Which k column a source drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KColumn {
    Pullup,
    Pulldown,
}

impl KColumn {
    pub fn node(self) -> &'static str {
        match self {
            KColumn::Pullup => "KU",
            KColumn::Pulldown => "KD",
        }
    }

    fn values(self, k: &KParameterWaveform) -> &[f64] {
        match self {
            KColumn::Pullup => k.k_u.as_deref().unwrap_or(&[]),
            KColumn::Pulldown => &k.k_d,
        }
    }
}

/// Time from the start of `k` to its crossover, and from the crossover to
/// its end.
///
/// The crossover of a push-pull waveform is where `k_u` and `k_d` are
/// closest; an open-drain waveform uses the sample nearest the midpoint of
/// its first and last values.
pub fn crossover_offsets(k: &KParameterWaveform) -> (f64, f64) {
    let Some((&first_t, &last_t)) = k.time.first().zip(k.time.last()) else {
        return (0.0, 0.0);
    };

    let distance: Vec<f64> = match &k.k_u {
        Some(k_u) => k_u.iter().zip(&k.k_d).map(|(u, d)| (u - d).abs()).collect(),
        None => {
            let (Some(first), Some(last)) = (k.k_d.first(), k.k_d.last()) else {
                return (0.0, 0.0);
            };
            let mid = (first + last) / 2.0;
            k.k_d.iter().map(|d| (d - mid).abs()).collect()
        }
    };

    // First minimum wins on ties
    let index = distance
        .iter()
        .enumerate()
        .fold(0, |best, (i, d)| if *d < distance[best] { i } else { best });

    let x_t = k.time[index];
    (x_t - first_t, last_t - x_t)
}

/// Gap expressions (without clamping) for the given edges.
#[derive(Clone, Debug, PartialEq)]
pub struct GapOffsets {
    /// Subtracted from `duty/freq`.
    pub high: f64,
    /// Subtracted from `(1-duty)/freq`.
    pub low: f64,
}

impl GapOffsets {
    pub fn from_edges(edges: &EdgePair) -> Self {
        let (rise_start, rise_end) = crossover_offsets(&edges.rising);
        let (fall_start, fall_end) = crossover_offsets(&edges.falling);
        Self {
            high: rise_end + fall_start,
            low: fall_end + rise_start,
        }
    }

    /// `(gap_pos, gap_neg)` before clamping.
    pub fn durations(&self, freq: Hertz, duty: f64) -> (f64, f64) {
        let period = freq.to_period();
        ((period * duty).0 - self.high, (period * (1.0 - duty)).0 - self.low)
    }

    /// Warnings for gaps that the netlist will clamp at these settings.
    pub fn check(&self, freq: Hertz, duty: f64) -> Vec<EmitWarning> {
        let (pos, neg) = self.durations(freq, duty);
        let mut warnings = Vec::new();
        for (name, computed) in [("gap_pos", pos), ("gap_neg", neg)] {
            if computed <= 0.0 {
                let warning = EmitWarning::ClampedGap { name, computed };
                tracing::warn!("{}", warning);
                warnings.push(warning);
            }
        }
        warnings
    }

    /// `.param calc_gap_pos/neg` lines.
    pub fn calc_params(&self) -> [String; 2] {
        [
            format!(".param calc_gap_pos = {{(duty/freq) - {}}}", num(self.high)),
            format!(".param calc_gap_neg = {{((1-duty)/freq) - {}}}", num(self.low)),
        ]
    }
}

/// Single edge starting at `{delay}`, times relative to the waveform start.
pub fn edge_pwl(k: &KParameterWaveform, column: KColumn) -> String {
    let values = column.values(k);
    let t0 = k.time.first().copied().unwrap_or(0.0);

    k.time
        .iter()
        .zip(values)
        .enumerate()
        .map(|(i, (t, v))| {
            if i == 0 {
                format!("{{delay}} {}", num(*v))
            } else {
                format!("{{delay+{}}} {}", num(t - t0), num(*v))
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Breakpoints of one segment as `(dt, value)` steps after the first sample.
fn steps(k: &KParameterWaveform, column: KColumn) -> Vec<(f64, f64)> {
    let values = column.values(k);
    k.time
        .windows(2)
        .zip(values.iter().skip(1))
        .map(|(w, v)| (w[1] - w[0], *v))
        .collect()
}

fn first_value(k: &KParameterWaveform, column: KColumn) -> f64 {
    column.values(k).first().copied().unwrap_or(0.0)
}

fn last_value(k: &KParameterWaveform, column: KColumn) -> f64 {
    column.values(k).last().copied().unwrap_or(0.0)
}

/// Edge order of one oscillation period.
fn period(edges: &EdgePair, inverted: bool) -> [(&KParameterWaveform, &'static str); 2] {
    if inverted {
        [(&edges.falling, "gap_neg"), (&edges.rising, "gap_pos")]
    } else {
        [(&edges.rising, "gap_pos"), (&edges.falling, "gap_neg")]
    }
}

/// Relative-time body of a repeating PWL (`0 v +dt v ...`).
pub fn oscillation_relative(edges: &EdgePair, column: KColumn, inverted: bool) -> String {
    let [(first, first_gap), (second, second_gap)] = period(edges, inverted);

    let mut parts = vec![
        format!("0 {}", num(first_value(first, column))),
        format!("+{} {}", START_STEP, num(first_value(first, column))),
    ];
    for (dt, v) in steps(first, column) {
        parts.push(format!("+{} {}", num(dt), num(v)));
    }
    parts.push(format!("+{{{}}} {}", first_gap, num(last_value(first, column))));

    parts.push(format!("+{} {}", START_STEP, num(first_value(second, column))));
    for (dt, v) in steps(second, column) {
        parts.push(format!("+{} {}", num(dt), num(v)));
    }
    parts.push(format!("+{{{}}} {}", second_gap, num(last_value(second, column))));

    parts.join(" ")
}

/// Absolute-time PWL body for dialects without relative steps. Times after
/// a gap are expressions over the gap parameters.
pub fn oscillation_absolute(edges: &EdgePair, column: KColumn) -> String {
    const STEP: f64 = 0.01e-12;

    let time = |t: f64, gaps: &str| -> String {
        if gaps.is_empty() {
            num(t)
        } else {
            format!("{{{}{}}}", num(t), gaps)
        }
    };

    let mut parts = Vec::new();
    let mut t = 0.0;
    let mut gaps = String::new();

    for (k, gap) in period(edges, false) {
        let v0 = first_value(k, column);
        if parts.is_empty() {
            parts.push(format!("0 {}", num(v0)));
        }
        t += STEP;
        parts.push(format!("{} {}", time(t, &gaps), num(v0)));
        for (dt, v) in steps(k, column) {
            t += dt;
            parts.push(format!("{} {}", time(t, &gaps), num(v)));
        }
        gaps.push('+');
        gaps.push_str(gap);
        parts.push(format!("{} {}", time(t, &gaps), num(last_value(k, column))));
    }

    parts.join(" ")
}
