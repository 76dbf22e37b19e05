//! Time-domain waveform representation.
//!
//! Two kinds of waveform flow through the converter:
//!
//! - [`VtWaveform`]: a measured switching waveform from an IBIS
//!   `[Rising Waveform]` / `[Falling Waveform]` table, together with the test
//!   fixture it was captured into. Samples are non-uniform in time.
//! - [`KParameterWaveform`]: the derived pullup/pulldown drive multipliers on
//!   the same kind of non-uniform time axis.
//!
//! Samples are point measurements; values between samples are obtained by
//! linear interpolation.

use crate::triple::{Corner, ParameterTriple};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Switching direction of an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Rising,
    Falling,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::Rising => f.write_str("rising"),
            Edge::Falling => f.write_str("falling"),
        }
    }
}

/// One V-T sample: a time and the voltage at each corner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VtPoint {
    pub time: f64,

    /// Voltage indexed by [`Corner::index`].
    pub voltage: [f64; 3],
}

impl VtPoint {
    pub fn new(time: f64, typ: f64, min: f64, max: f64) -> Self {
        Self {
            time,
            voltage: [typ, min, max],
        }
    }
}

/// A measured V-T switching waveform and its fixture conditions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VtWaveform {
    /// Samples in file order (time ascending).
    pub samples: Vec<VtPoint>,

    /// Fixture voltage per corner.
    pub v_fixture: ParameterTriple,

    /// Fixture resistance.
    pub r_fixture: f64,
}

impl VtWaveform {
    /// Build from `(time, typ, min, max)` rows.
    pub fn from_rows(rows: &[(f64, f64, f64, f64)], v_fixture: ParameterTriple, r_fixture: f64) -> Self {
        Self {
            samples: rows
                .iter()
                .map(|&(t, typ, min, max)| VtPoint::new(t, typ, min, max))
                .collect(),
            v_fixture,
            r_fixture,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Time column.
    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.time).collect()
    }

    /// Voltage column for one corner.
    pub fn voltages(&self, corner: Corner) -> Vec<f64> {
        self.samples.iter().map(|s| s.voltage[corner.index()]).collect()
    }
}

/// Derived drive-strength multipliers over time.
///
/// Push-pull buffers carry both `k_u` (pullup) and `k_d` (pulldown);
/// open-drain buffers carry `k_d` only. All columns have the length of
/// `time`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KParameterWaveform {
    pub time: Vec<f64>,

    /// Pullup multiplier, absent for open-drain buffers.
    pub k_u: Option<Vec<f64>>,

    /// Pulldown multiplier.
    pub k_d: Vec<f64>,
}

impl KParameterWaveform {
    /// Two-column waveform `[time, k_u, k_d]`.
    pub fn push_pull(time: Vec<f64>, k_u: Vec<f64>, k_d: Vec<f64>) -> Self {
        Self { time, k_u: Some(k_u), k_d }
    }

    /// Single-column waveform `[time, k]` for open-drain buffers.
    pub fn pulldown_only(time: Vec<f64>, k_d: Vec<f64>) -> Self {
        Self { time, k_u: None, k_d }
    }

    /// Build a push-pull waveform from `[time, k_u, k_d]` rows.
    pub fn from_rows(rows: &[[f64; 3]]) -> Self {
        Self::push_pull(
            rows.iter().map(|r| r[0]).collect(),
            rows.iter().map(|r| r[1]).collect(),
            rows.iter().map(|r| r[2]).collect(),
        )
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.time.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Number of k columns (1 for open-drain, 2 for push-pull).
    pub fn k_columns(&self) -> usize {
        if self.k_u.is_some() {
            2
        } else {
            1
        }
    }

    /// Whether this is a pulldown-only waveform.
    pub fn is_open_drain(&self) -> bool {
        self.k_u.is_none()
    }

    /// Keep only the samples whose index satisfies `keep`.
    pub fn select(&self, keep: impl Fn(usize) -> bool) -> Self {
        let pick = |col: &[f64]| -> Vec<f64> {
            col.iter()
                .enumerate()
                .filter(|(i, _)| keep(*i))
                .map(|(_, &v)| v)
                .collect()
        };
        Self {
            time: pick(&self.time),
            k_u: self.k_u.as_deref().map(pick),
            k_d: pick(&self.k_d),
        }
    }

    /// Rows as `[time, k_u, k_d]` (or `[time, k_d]`) vectors, for export.
    pub fn rows(&self) -> Vec<Vec<f64>> {
        (0..self.len())
            .map(|i| match &self.k_u {
                Some(k_u) => vec![self.time[i], k_u[i], self.k_d[i]],
                None => vec![self.time[i], self.k_d[i]],
            })
            .collect()
    }
}
