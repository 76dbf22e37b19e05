//! Typical/minimum/maximum parameter triples and corner selection.
//!
//! IBIS characterizes almost every scalar (package parasitics, die
//! capacitance, supply range, reference voltages) at three process corners.
//! Any of the three columns may be `NA` in the source file, and a keyword may
//! be missing altogether; both cases are represented as absence, never zero.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Process/voltage/temperature corner.
///
/// The column index of a corner is fixed project-wide: typical data is column
/// 0, weak-slow (IBIS "min") is column 1 and fast-strong (IBIS "max") is
/// column 2. Every triple, I-V table and V-T table is indexed the same way.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Corner {
    #[default]
    Typical,
    WeakSlow,
    FastStrong,
}

impl Corner {
    /// All corners in column order.
    pub const ALL: [Corner; 3] = [Corner::Typical, Corner::WeakSlow, Corner::FastStrong];

    /// Column index into triples and tables.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Corner::Typical => 0,
            Corner::WeakSlow => 1,
            Corner::FastStrong => 2,
        }
    }

    /// Human-readable label used in file names and netlist headers.
    pub fn label(self) -> &'static str {
        match self {
            Corner::Typical => "Typical",
            Corner::WeakSlow => "Weak-Slow",
            Corner::FastStrong => "Fast-Strong",
        }
    }

    /// Parse from a label (case-insensitive, accepts IBIS column names).
    pub fn from_label(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "typical" | "typ" => Some(Corner::Typical),
            "weak-slow" | "weakslow" | "min" | "slow" => Some(Corner::WeakSlow),
            "fast-strong" | "faststrong" | "max" | "fast" => Some(Corner::FastStrong),
            _ => None,
        }
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A typical/minimum/maximum triple with independently optional entries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterTriple {
    pub typical: Option<f64>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

impl ParameterTriple {
    /// Build a triple, returning `None` when all three entries are absent.
    pub fn new(typical: Option<f64>, minimum: Option<f64>, maximum: Option<f64>) -> Option<Self> {
        if typical.is_none() && minimum.is_none() && maximum.is_none() {
            None
        } else {
            Some(Self { typical, minimum, maximum })
        }
    }

    /// A triple with the same value at every corner.
    pub fn uniform(value: f64) -> Self {
        Self {
            typical: Some(value),
            minimum: Some(value),
            maximum: Some(value),
        }
    }

    /// Raw entry for a corner, without any fallback.
    #[inline]
    pub fn get(&self, corner: Corner) -> Option<f64> {
        match corner {
            Corner::Typical => self.typical,
            Corner::WeakSlow => self.minimum,
            Corner::FastStrong => self.maximum,
        }
    }

    /// Entry for a corner, falling back to the typical entry when the
    /// requested column is `NA`.
    #[inline]
    pub fn at(&self, corner: Corner) -> Option<f64> {
        self.get(corner).or(self.typical)
    }
}

impl fmt::Display for ParameterTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: Option<f64>| v.map_or_else(|| "NA".to_string(), |x| format!("{x:e}"));
        write!(
            f,
            "[{}, {}, {}]",
            show(self.typical),
            show(self.minimum),
            show(self.maximum)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_absent_is_no_data() {
        assert_eq!(ParameterTriple::new(None, None, None), None);
        let t = ParameterTriple::new(Some(1e-9), Some(8.341e-2), None).unwrap();
        assert_eq!(t.get(Corner::FastStrong), None);
        assert_eq!(t.get(Corner::WeakSlow), Some(8.341e-2));
    }

    #[test]
    fn test_na_column_falls_back_to_typical() {
        let t = ParameterTriple::new(Some(0.1), None, None).unwrap();
        assert_eq!(t.at(Corner::WeakSlow), Some(0.1));
        assert_eq!(t.at(Corner::FastStrong), Some(0.1));

        let only_max = ParameterTriple::new(None, None, Some(3e-12)).unwrap();
        assert_eq!(only_max.at(Corner::Typical), None);
        assert_eq!(only_max.at(Corner::FastStrong), Some(3e-12));
    }

    #[test]
    fn test_corner_index_mapping() {
        assert_eq!(Corner::Typical.index(), 0);
        assert_eq!(Corner::WeakSlow.index(), 1);
        assert_eq!(Corner::FastStrong.index(), 2);
        assert_eq!(Corner::from_label("Weak-Slow"), Some(Corner::WeakSlow));
        assert_eq!(Corner::from_label("max"), Some(Corner::FastStrong));
        assert_eq!(Corner::from_label("sideways"), None);
    }
}
