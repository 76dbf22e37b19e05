//! K-parameter waveform compression.

use lib_types::KParameterWaveform;

/// Default change below which a sample is considered redundant.
pub const DEFAULT_THRESHOLD: f64 = 1e-6;

/// Drop samples that do not lead into a change.
///
/// For every k column the absolute difference to the next sample is taken
/// (zero for the last sample). A sample survives when any column's
/// difference exceeds `threshold`, which keeps the last sample of a flat
/// run before each transition and every sample inside the transition. The
/// result is a subsequence of the input; no values are synthesized.
pub fn compress(k: &KParameterWaveform, threshold: f64) -> KParameterWaveform {
    let mut columns = vec![&k.k_d];
    if let Some(k_u) = &k.k_u {
        columns.insert(0, k_u);
    }

    let changes = |col: &[f64], i: usize| -> f64 {
        match (col.get(i), col.get(i + 1)) {
            (Some(a), Some(b)) => (b - a).abs(),
            _ => 0.0,
        }
    };

    let keep: Vec<bool> = (0..k.len())
        .map(|i| columns.iter().any(|col| changes(col.as_slice(), i) > threshold))
        .collect();

    let compressed = k.select(|i| keep[i]);
    tracing::debug!("Compressed k-parameters from {} to {} samples", k.len(), compressed.len());
    compressed
}

/// [`compress`], falling back to the first and last samples when nothing
/// changes so the emitter always gets at least one breakpoint.
pub fn compress_or_endpoints(k: &KParameterWaveform, threshold: f64) -> KParameterWaveform {
    let compressed = compress(k, threshold);
    if !compressed.is_empty() || k.is_empty() {
        return compressed;
    }

    let last = k.len() - 1;
    tracing::debug!("No transition above {:e}, keeping waveform endpoints", threshold);
    k.select(|i| i == 0 || i == last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_samples_around_transition() {
        let k = KParameterWaveform::from_rows(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [3.0, 1.0, 1.0],
            [4.0, 2.0, 2.0],
            [5.0, 2.0, 2.0],
            [6.0, 2.0, 2.0],
        ]);

        let compressed = compress(&k, DEFAULT_THRESHOLD);
        assert_eq!(compressed.rows(), vec![vec![2.0, 0.0, 0.0], vec![3.0, 1.0, 1.0]]);
    }

    #[test]
    fn test_single_column_input() {
        let k = KParameterWaveform::pulldown_only(vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 0.0, 0.5, 0.5]);
        let compressed = compress(&k, DEFAULT_THRESHOLD);
        assert!(compressed.is_open_drain());
        assert_eq!(compressed.rows(), vec![vec![1.0, 0.0]]);
    }

    #[test]
    fn test_one_column_change_is_enough() {
        let k = KParameterWaveform::from_rows(&[[0.0, 1.0, 0.0], [1.0, 1.0, 0.5], [2.0, 1.0, 0.5]]);
        assert_eq!(compress(&k, DEFAULT_THRESHOLD).time, vec![0.0]);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let k = KParameterWaveform::pulldown_only(vec![0.0, 1.0], vec![0.0, 0.5]);
        assert!(compress(&k, 0.5).is_empty());
        assert_eq!(compress(&k, 0.49).len(), 1);
    }

    #[test]
    fn test_flat_waveform_falls_back_to_endpoints() {
        let k = KParameterWaveform::from_rows(&[[0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [2.0, 1.0, 0.0]]);
        assert!(compress(&k, DEFAULT_THRESHOLD).is_empty());
        assert_eq!(compress_or_endpoints(&k, DEFAULT_THRESHOLD).time, vec![0.0, 2.0]);

        let empty = KParameterWaveform::pulldown_only(Vec::new(), Vec::new());
        assert!(compress_or_endpoints(&empty, DEFAULT_THRESHOLD).is_empty());
    }
}
