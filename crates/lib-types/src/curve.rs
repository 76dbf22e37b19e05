//! I-V table representation.

use crate::triple::Corner;
use serde::{Deserialize, Serialize};

/// One row of an I-V table: a voltage and the current at each corner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IvPoint {
    /// Table voltage as written in the model (not necessarily pin voltage).
    pub voltage: f64,

    /// Current indexed by [`Corner::index`].
    pub current: [f64; 3],
}

impl IvPoint {
    pub fn new(voltage: f64, typ: f64, min: f64, max: f64) -> Self {
        Self {
            voltage,
            current: [typ, min, max],
        }
    }

    #[inline]
    pub fn current_at(&self, corner: Corner) -> f64 {
        self.current[corner.index()]
    }
}

/// I-V table for a pullup, pulldown, power clamp or ground clamp.
///
/// Rows keep the order of the source file; the voltage axis may be
/// ascending, descending, or (for malformed data) neither.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IvCurve {
    pub points: Vec<IvPoint>,
}

impl IvCurve {
    pub fn new(points: Vec<IvPoint>) -> Self {
        Self { points }
    }

    /// Build from `(voltage, typ, min, max)` rows.
    pub fn from_rows(rows: &[(f64, f64, f64, f64)]) -> Self {
        Self {
            points: rows
                .iter()
                .map(|&(v, typ, min, max)| IvPoint::new(v, typ, min, max))
                .collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Voltage column.
    pub fn voltages(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.voltage).collect()
    }

    /// Current column for one corner.
    pub fn currents(&self, corner: Corner) -> Vec<f64> {
        self.points.iter().map(|p| p.current_at(corner)).collect()
    }
}
