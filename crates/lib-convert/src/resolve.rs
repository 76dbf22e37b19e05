//! Reference-voltage and scalar parameter resolution.

use crate::error::{ConvertError, ConvertResult};
use crate::model::DataModel;
use lib_types::{Corner, ParameterTriple};

/// What a missing reference falls back to.
#[derive(Clone, Copy, Debug)]
pub enum Fallback<'a> {
    /// Another per-corner triple, e.g. the voltage range for supply references.
    Triple(Option<&'a ParameterTriple>),
    /// A fixed value, e.g. ground for pulldown and ground clamp references.
    Scalar(f64),
}

/// Resolve a reference voltage for `corner`.
///
/// An explicit triple wins; otherwise the fallback applies. A present triple
/// with an `NA` entry for the corner uses its typical entry.
pub fn resolve_reference(
    explicit: Option<&ParameterTriple>,
    fallback: Fallback<'_>,
    corner: Corner,
) -> ConvertResult<f64> {
    match (explicit, fallback) {
        (Some(triple), _) => triple
            .at(corner)
            .ok_or_else(|| ConvertError::missing_data(format!("reference has no {} entry", corner))),
        (None, Fallback::Scalar(value)) => Ok(value),
        (None, Fallback::Triple(Some(triple))) => triple
            .at(corner)
            .ok_or_else(|| ConvertError::missing_data(format!("fallback range has no {} entry", corner))),
        (None, Fallback::Triple(None)) => Err(ConvertError::missing_data(
            "neither a reference nor a voltage range is specified",
        )),
    }
}

/// Scalars for one corner, as written into the subcircuit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedParameters {
    pub corner: Corner,

    /// Package parasitics; `None` when the file does not specify them.
    pub r_pkg: Option<f64>,
    pub l_pkg: Option<f64>,
    pub c_pkg: Option<f64>,

    pub c_comp: f64,
    pub v_supply: f64,

    pub pullup_ref: f64,
    pub pulldown_ref: f64,
    pub pwr_clamp_ref: f64,
    pub gnd_clamp_ref: f64,
}

/// Resolve every scalar the emitter needs for `corner`.
///
/// The supply is the voltage range; models that only give explicit pullup or
/// power clamp references use those instead.
pub fn resolve_parameters(model: &DataModel, corner: Corner) -> ConvertResult<ResolvedParameters> {
    let pick = |t: &Option<ParameterTriple>| t.as_ref().and_then(|t| t.at(corner));

    let c_comp = pick(&model.c_comp)
        .ok_or_else(|| ConvertError::missing_data(format!("C_comp for model {}", model.model_name)))?;

    let v_supply = pick(&model.v_range)
        .or_else(|| pick(&model.pullup_ref))
        .or_else(|| pick(&model.pwr_clamp_ref))
        .ok_or_else(|| {
            ConvertError::missing_data(format!("[Voltage Range] for model {}", model.model_name))
        })?;

    let rail = match model.v_range.as_ref() {
        Some(range) => Fallback::Triple(Some(range)),
        None => Fallback::Scalar(v_supply),
    };

    let params = ResolvedParameters {
        corner,
        r_pkg: pick(&model.r_pkg),
        l_pkg: pick(&model.l_pkg),
        c_pkg: pick(&model.c_pkg),
        c_comp,
        v_supply,
        pullup_ref: resolve_reference(model.pullup_ref.as_ref(), rail, corner)?,
        pulldown_ref: resolve_reference(model.pulldown_ref.as_ref(), Fallback::Scalar(0.0), corner)?,
        pwr_clamp_ref: resolve_reference(model.pwr_clamp_ref.as_ref(), rail, corner)?,
        gnd_clamp_ref: resolve_reference(model.gnd_clamp_ref.as_ref(), Fallback::Scalar(0.0), corner)?,
    };

    tracing::debug!("Resolved {} parameters for {}: {:?}", corner, model.model_name, params);
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_ibis::ModelType;

    fn triple(t: f64, min: f64, max: f64) -> ParameterTriple {
        ParameterTriple::new(Some(t), Some(min), Some(max)).unwrap()
    }

    #[test]
    fn test_explicit_reference_wins() {
        let reference = triple(3.0, 3.3, 3.6);
        let v_range = triple(4.5, 5.0, 5.5);

        let got: Vec<f64> = Corner::ALL
            .iter()
            .map(|&c| resolve_reference(Some(&reference), Fallback::Triple(Some(&v_range)), c).unwrap())
            .collect();
        assert_eq!(got, vec![3.0, 3.3, 3.6]);
    }

    #[test]
    fn test_absent_reference_uses_range() {
        let v_range = triple(4.5, 5.0, 5.5);

        let got: Vec<f64> = Corner::ALL
            .iter()
            .map(|&c| resolve_reference(None, Fallback::Triple(Some(&v_range)), c).unwrap())
            .collect();
        assert_eq!(got, vec![4.5, 5.0, 5.5]);
    }

    #[test]
    fn test_absent_reference_uses_scalar() {
        for corner in Corner::ALL {
            assert_eq!(resolve_reference(None, Fallback::Scalar(0.0), corner).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_nothing_to_resolve_is_missing_data() {
        let err = resolve_reference(None, Fallback::Triple(None), Corner::Typical).unwrap_err();
        assert!(matches!(err, ConvertError::MissingData(_)));
    }

    #[test]
    fn test_resolve_parameters() {
        let mut model = DataModel::new("CHIP", "BUF", ModelType::Output).unwrap();
        model.c_comp = Some(triple(2e-12, 1e-12, 3e-12));
        model.v_range = Some(triple(3.3, 3.0, 3.6));
        model.r_pkg = ParameterTriple::new(Some(0.1), None, None);
        model.gnd_clamp_ref = Some(triple(0.1, 0.2, 0.3));

        let p = resolve_parameters(&model, Corner::WeakSlow).unwrap();
        assert_eq!(p.c_comp, 1e-12);
        assert_eq!(p.v_supply, 3.0);
        assert_eq!(p.r_pkg, Some(0.1));
        assert_eq!(p.l_pkg, None);
        assert_eq!(p.pullup_ref, 3.0);
        assert_eq!(p.pulldown_ref, 0.0);
        assert_eq!(p.gnd_clamp_ref, 0.2);
    }

    #[test]
    fn test_missing_c_comp() {
        let mut model = DataModel::new("CHIP", "BUF", ModelType::Input).unwrap();
        model.v_range = Some(triple(3.3, 3.0, 3.6));
        assert!(matches!(
            resolve_parameters(&model, Corner::Typical),
            Err(ConvertError::MissingData(_))
        ));
    }
}
