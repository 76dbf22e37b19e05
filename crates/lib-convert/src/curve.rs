//! I-V table interpolation and clamp adjustment.
//!
//! IBIS pullup and pulldown tables are measured with the clamps in circuit,
//! so the clamp current has to be taken out before the device tables can be
//! scaled by k-parameters. Supply-referenced tables (pullup, power clamp) are
//! written against `Vcc - Vpin`; [`get_current`] brings them onto the pin
//! voltage axis before interpolating.

use lib_types::{Corner, IvCurve, IvPoint};

/// Whether `seq` never decreases. Equal neighbours are accepted.
pub fn monotonic_nondecreasing(seq: &[f64]) -> bool {
    seq.windows(2).all(|w| w[0] <= w[1])
}

/// Piecewise-linear interpolation of `(xp, fp)` at every `x`.
///
/// `xp` must be non-decreasing. Points outside the table take the end
/// values; there is no extrapolation.
pub fn interp(x: &[f64], xp: &[f64], fp: &[f64]) -> Vec<f64> {
    x.iter().map(|&xi| interp_one(xi, xp, fp)).collect()
}

fn interp_one(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let n = xp.len().min(fp.len());
    if n == 0 {
        return 0.0;
    }
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[n - 1] {
        return fp[n - 1];
    }

    // xp[upper - 1] <= x < xp[upper]
    let upper = xp[..n].partition_point(|&v| v <= x);
    let lower = upper - 1;
    let frac = (x - xp[lower]) / (xp[upper] - xp[lower]);
    fp[lower] + frac * (fp[upper] - fp[lower])
}

/// Axis and one current column, reordered so the axis is non-decreasing.
///
/// A descending axis is reversed in place; anything else is sorted.
fn ascending(mut axis: Vec<f64>, mut current: Vec<f64>) -> (Vec<f64>, Vec<f64>) {
    if monotonic_nondecreasing(&axis) {
        return (axis, current);
    }

    axis.reverse();
    current.reverse();
    if monotonic_nondecreasing(&axis) {
        return (axis, current);
    }

    tracing::debug!("I-V axis is not monotonic, sorting {} rows", axis.len());
    let mut rows: Vec<(f64, f64)> = axis.into_iter().zip(current).collect();
    rows.sort_by(|a, b| a.0.total_cmp(&b.0));
    rows.into_iter().unzip()
}

/// Subtract the clamp current from a device table at every corner.
///
/// The clamp is interpolated onto the device's voltage axis, so the two
/// tables may be sampled at different voltages. The voltage axis of the
/// result is the device's, unchanged.
pub fn adjust_device_data(device: &IvCurve, clamp: &IvCurve) -> IvCurve {
    if clamp.is_empty() {
        return device.clone();
    }

    let voltages = device.voltages();
    let clamp_at: Vec<Vec<f64>> = Corner::ALL
        .iter()
        .map(|&corner| {
            let (axis, current) = ascending(clamp.voltages(), clamp.currents(corner));
            interp(&voltages, &axis, &current)
        })
        .collect();

    let points = device
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| IvPoint {
            voltage: p.voltage,
            current: [
                p.current[0] - clamp_at[0][i],
                p.current[1] - clamp_at[1][i],
                p.current[2] - clamp_at[2][i],
            ],
        })
        .collect();

    IvCurve::new(points)
}

/// Current drawn by a table at each pin voltage.
///
/// An absent table contributes no current. Otherwise the clamp in
/// `adjust_with` is subtracted first, a non-zero `reference` turns the axis
/// into `reference - v`, and the result is interpolated with end-value
/// clamping.
pub fn get_current(
    voltage_samples: &[f64],
    curve: Option<&IvCurve>,
    reference: f64,
    corner: Corner,
    adjust_with: Option<&IvCurve>,
) -> Vec<f64> {
    let Some(curve) = curve else {
        return vec![0.0; voltage_samples.len()];
    };

    let adjusted;
    let curve = match adjust_with {
        Some(clamp) => {
            adjusted = adjust_device_data(curve, clamp);
            &adjusted
        }
        None => curve,
    };

    let axis: Vec<f64> = if reference != 0.0 {
        curve.points.iter().map(|p| reference - p.voltage).collect()
    } else {
        curve.voltages()
    };

    let (axis, current) = ascending(axis, curve.currents(corner));
    interp(voltage_samples, &axis, &current)
}

/// Table rows `(voltage, current)` for `corner`, ground-referenced and
/// ascending, ready to be written as a behavioral source table.
///
/// Supply-referenced tables pass `supply_referenced = true` and map to
/// `reference - v`; ground-referenced tables map to `v - reference`.
pub fn ground_referenced_table(
    curve: &IvCurve,
    reference: f64,
    supply_referenced: bool,
    corner: Corner,
) -> Vec<(f64, f64)> {
    let axis: Vec<f64> = curve
        .points
        .iter()
        .map(|p| {
            if supply_referenced {
                reference - p.voltage
            } else {
                p.voltage - reference
            }
        })
        .collect();

    let (axis, current) = ascending(axis, curve.currents(corner));
    axis.into_iter().zip(current).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_rows(rows: &[(f64, f64)]) -> IvCurve {
        IvCurve::from_rows(&rows.iter().map(|&(v, i)| (v, i, i, i)).collect::<Vec<_>>())
    }

    #[test]
    fn test_monotonic() {
        assert!(monotonic_nondecreasing(&[0.0, 0.0, 0.0, 0.0]));
        assert!(!monotonic_nondecreasing(&[0.0, 1.0, 0.0]));
        assert!(monotonic_nondecreasing(&[0.0, 1.0, 1.0, 39000.0]));
        assert!(monotonic_nondecreasing(&[]));
    }

    #[test]
    fn test_interp_clamps_to_end_values() {
        let xp = [0.0, 1.0, 2.0];
        let fp = [0.0, 10.0, 30.0];
        assert_eq!(interp(&[-5.0, 0.5, 1.5, 9.0], &xp, &fp), vec![0.0, 5.0, 20.0, 30.0]);
    }

    #[test]
    fn test_adjust_zero_clamp_is_identity() {
        let device = uniform_rows(&[(0.0, 10.0), (1.0, 10.0), (2.0, 10.0)]);
        let clamp = uniform_rows(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        assert_eq!(adjust_device_data(&device, &clamp), device);

        let device = uniform_rows(&[(0.0, 10.0), (-1.0, 10.0), (-2.0, 10.0)]);
        let clamp = uniform_rows(&[(0.0, 0.0), (-1.0, 0.0), (-2.0, 0.0)]);
        assert_eq!(adjust_device_data(&device, &clamp), device);
    }

    #[test]
    fn test_adjust_subtracts_clamp() {
        let device = uniform_rows(&[(0.0, 10.0), (1.0, 10.0), (2.0, 10.0)]);
        let pos = uniform_rows(&[(0.0, 1.0), (1.0, 1.0), (2.0, 1.0)]);
        let neg = uniform_rows(&[(0.0, -1.0), (1.0, -1.0), (2.0, -1.0)]);

        let result = adjust_device_data(&device, &pos);
        assert_eq!(result.voltages(), device.voltages());
        assert_eq!(result.currents(Corner::FastStrong), vec![9.0, 9.0, 9.0]);

        let result = adjust_device_data(&device, &neg);
        assert_eq!(result.currents(Corner::Typical), vec![11.0, 11.0, 11.0]);

        // Descending axes on both sides
        let device = uniform_rows(&[(0.0, 10.0), (-1.0, 10.0), (-2.0, 10.0)]);
        let pos = uniform_rows(&[(0.0, 1.0), (-1.0, 1.0), (-2.0, 1.0)]);
        let result = adjust_device_data(&device, &pos);
        assert_eq!(result.voltages(), vec![0.0, -1.0, -2.0]);
        assert_eq!(result.currents(Corner::WeakSlow), vec![9.0, 9.0, 9.0]);
    }

    #[test]
    fn test_adjust_interpolates_clamp() {
        let device = uniform_rows(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        let clamp = uniform_rows(&[(0.0, 0.0), (1.5, 1.5), (2.0, 2.0)]);
        let result = adjust_device_data(&device, &clamp);

        assert_eq!(result.voltages(), vec![0.0, 1.0, 2.0]);
        for corner in Corner::ALL {
            assert_eq!(result.currents(corner), vec![0.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn test_absent_curve_is_zero() {
        let v = [0.0, 0.5, 1.0, 3.3];
        assert_eq!(get_current(&v, None, 3.3, Corner::Typical, None), vec![0.0; 4]);
        assert!(get_current(&[], None, 0.0, Corner::Typical, None).is_empty());
    }

    #[test]
    fn test_get_current_supply_referenced() {
        // Pullup: 0 V below the rail sources nothing, 3.3 V below sources 50 mA
        let pullup = IvCurve::from_rows(&[(0.0, 0.0, 0.0, 0.0), (3.3, -0.05, -0.04, -0.06)]);
        let i = get_current(&[0.0, 3.3], Some(&pullup), 3.3, Corner::Typical, None);
        assert!((i[0] + 0.05).abs() < 1e-12);
        assert!(i[1].abs() < 1e-12);

        let i = get_current(&[1.65], Some(&pullup), 3.3, Corner::WeakSlow, None);
        assert!((i[0] + 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_get_current_descending_axis() {
        // Ground clamp tables are often listed from the rail downwards
        let clamp = uniform_rows(&[(2.0, 20.0), (1.0, 10.0), (0.0, 0.0), (-1.0, -10.0)]);
        let i = get_current(&[-2.0, -0.5, 0.5, 1.5, 3.0], Some(&clamp), 0.0, Corner::Typical, None);
        assert_eq!(i, vec![-10.0, -5.0, 5.0, 15.0, 20.0]);
    }

    #[test]
    fn test_get_current_unsorted_axis() {
        let table = uniform_rows(&[(1.0, 10.0), (-1.0, -10.0), (0.0, 0.0), (2.0, 20.0)]);

        let i = get_current(&[-0.5, 0.5, 1.5], Some(&table), 0.0, Corner::Typical, None);
        assert_eq!(i, vec![-5.0, 5.0, 15.0]);

        // 3 - v gives the axis [2, 4, 3, 1]
        let i = get_current(&[0.0, 2.5], Some(&table), 3.0, Corner::FastStrong, None);
        assert_eq!(i, vec![20.0, 5.0]);
    }

    #[test]
    fn test_get_current_with_adjustment() {
        let pulldown = uniform_rows(&[(0.0, 0.0), (1.0, 0.02), (2.0, 0.04)]);
        let clamp = uniform_rows(&[(0.0, 0.0), (2.0, 0.01)]);
        let i = get_current(&[1.0], Some(&pulldown), 0.0, Corner::Typical, Some(&clamp));
        assert!((i[0] - 0.015).abs() < 1e-12);
    }

    #[test]
    fn test_ground_referenced_table() {
        let clamp = uniform_rows(&[(-1.0, 0.01), (0.0, 0.0), (3.3, 0.0)]);
        let rows = ground_referenced_table(&clamp, 3.3, true, Corner::Typical);
        let axis: Vec<f64> = rows.iter().map(|r| r.0).collect();
        assert!(monotonic_nondecreasing(&axis));
        assert!((rows[2].0 - 4.3).abs() < 1e-12);
        assert_eq!(rows[2].1, 0.01);

        let gnd = uniform_rows(&[(-1.0, -0.01), (0.0, 0.0)]);
        assert_eq!(ground_referenced_table(&gnd, 0.0, false, Corner::Typical), vec![(-1.0, -0.01), (0.0, 0.0)]);
    }
}
