//! Buffer model assembled from a parsed IBIS file.
//!
//! [`DataModel`] gathers everything the conversion stages need about one
//! `[Model]` of one `[Component]`: package parasitics from the component,
//! scalar triples, I-V tables and V-T waveforms from the model. It is an
//! explicit value passed into every stage; nothing is cached globally.

use crate::error::{ConvertError, ConvertResult};
use lib_ibis::{IbisFile, ModelType};
use lib_types::{Edge, IvCurve, ParameterTriple, VtWaveform};
use std::fmt;

/// How the buffer drives its pin, as far as the converter is concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferKind {
    /// Receiver only: package, die capacitance and clamps.
    Input,
    /// Pullup and pulldown devices (2-state, 3-state, I/O).
    PushPull,
    /// Pulldown device only (open drain / open sink variants).
    OpenDrain,
}

impl BufferKind {
    /// Classify an IBIS model type, `None` when the type is not supported.
    pub fn classify(model_type: ModelType) -> Option<Self> {
        match model_type {
            ModelType::Input => Some(Self::Input),
            ModelType::Output | ModelType::ThreeState | ModelType::IO => Some(Self::PushPull),
            ModelType::OpenDrain
            | ModelType::IOOpenDrain
            | ModelType::OpenSink
            | ModelType::IOOpenSink => Some(Self::OpenDrain),
            _ => None,
        }
    }

    /// Whether the buffer has a driver that k-parameters can be solved for.
    pub fn is_driver(self) -> bool {
        !matches!(self, Self::Input)
    }

    /// Number of V-T waveforms per edge the solve needs.
    pub fn waveforms_needed(self) -> usize {
        match self {
            Self::Input => 0,
            Self::PushPull => 2,
            Self::OpenDrain => 1,
        }
    }
}

/// Everything known about one buffer model.
#[derive(Clone, Debug)]
pub struct DataModel {
    pub component_name: String,
    pub model_name: String,
    pub model_type: ModelType,

    /// Model type as written in the source file.
    pub model_type_name: String,
    pub kind: BufferKind,

    pub r_pkg: Option<ParameterTriple>,
    pub l_pkg: Option<ParameterTriple>,
    pub c_pkg: Option<ParameterTriple>,
    pub c_comp: Option<ParameterTriple>,
    pub v_range: Option<ParameterTriple>,
    pub temp_range: Option<ParameterTriple>,

    pub pullup_ref: Option<ParameterTriple>,
    pub pulldown_ref: Option<ParameterTriple>,
    pub pwr_clamp_ref: Option<ParameterTriple>,
    pub gnd_clamp_ref: Option<ParameterTriple>,

    pub iv_pullup: Option<IvCurve>,
    pub iv_pulldown: Option<IvCurve>,
    pub iv_pwr_clamp: Option<IvCurve>,
    pub iv_gnd_clamp: Option<IvCurve>,

    pub vt_rising: Vec<VtWaveform>,
    pub vt_falling: Vec<VtWaveform>,
}

impl DataModel {
    /// An empty model of the given type. Fails for unsupported types.
    pub fn new(
        component_name: impl Into<String>,
        model_name: impl Into<String>,
        model_type: ModelType,
    ) -> ConvertResult<Self> {
        let kind = BufferKind::classify(model_type)
            .ok_or_else(|| ConvertError::UnsupportedModelType(format!("{:?}", model_type)))?;

        Ok(Self {
            component_name: component_name.into(),
            model_name: model_name.into(),
            model_type,
            model_type_name: format!("{:?}", model_type),
            kind,
            r_pkg: None,
            l_pkg: None,
            c_pkg: None,
            c_comp: None,
            v_range: None,
            temp_range: None,
            pullup_ref: None,
            pulldown_ref: None,
            pwr_clamp_ref: None,
            gnd_clamp_ref: None,
            iv_pullup: None,
            iv_pulldown: None,
            iv_pwr_clamp: None,
            iv_gnd_clamp: None,
            vt_rising: Vec::new(),
            vt_falling: Vec::new(),
        })
    }

    /// Build the model for `model_name` as used by `component_name`.
    ///
    /// Fails with [`ConvertError::MissingModel`] when either name is not in
    /// the file, and with [`ConvertError::UnsupportedModelType`] before any
    /// data is copied when the buffer type is outside the supported set.
    pub fn from_ibis(ibis: &IbisFile, component_name: &str, model_name: &str) -> ConvertResult<Self> {
        let component = ibis.component(component_name).ok_or_else(|| ConvertError::MissingModel {
            kind: "Component",
            name: component_name.to_string(),
        })?;
        let model = ibis.model(model_name).ok_or_else(|| ConvertError::MissingModel {
            kind: "Model",
            name: model_name.to_string(),
        })?;

        let kind = BufferKind::classify(model.model_type)
            .ok_or_else(|| ConvertError::UnsupportedModelType(model.model_type_name.clone()))?;

        let package = component.package.clone().unwrap_or_default();
        let non_empty = |curve: &Option<IvCurve>| curve.clone().filter(|c| !c.is_empty());
        let waveforms = |list: &[VtWaveform]| -> Vec<VtWaveform> {
            list.iter().filter(|w| !w.is_empty()).cloned().collect()
        };

        let data = Self {
            component_name: component.name.clone(),
            model_name: model.name.clone(),
            model_type: model.model_type,
            model_type_name: model.model_type_name.clone(),
            kind,
            r_pkg: package.r_pkg,
            l_pkg: package.l_pkg,
            c_pkg: package.c_pkg,
            c_comp: model.c_comp,
            v_range: model.voltage_range,
            temp_range: model.temperature_range,
            pullup_ref: model.pullup_reference,
            pulldown_ref: model.pulldown_reference,
            pwr_clamp_ref: model.power_clamp_reference,
            gnd_clamp_ref: model.gnd_clamp_reference,
            iv_pullup: non_empty(&model.pullup),
            iv_pulldown: non_empty(&model.pulldown),
            iv_pwr_clamp: non_empty(&model.power_clamp),
            iv_gnd_clamp: non_empty(&model.gnd_clamp),
            vt_rising: waveforms(&model.rising_waveforms),
            vt_falling: waveforms(&model.falling_waveforms),
        };

        tracing::info!(
            "Loaded model {} of component {} ({:?}, {} rising / {} falling waveforms)",
            data.model_name,
            data.component_name,
            data.kind,
            data.vt_rising.len(),
            data.vt_falling.len()
        );

        Ok(data)
    }

    /// V-T waveforms for one edge.
    pub fn waveforms(&self, edge: Edge) -> &[VtWaveform] {
        match edge {
            Edge::Rising => &self.vt_rising,
            Edge::Falling => &self.vt_falling,
        }
    }
}

fn write_triple(f: &mut fmt::Formatter<'_>, label: &str, value: &Option<ParameterTriple>) -> fmt::Result {
    match value {
        Some(t) => writeln!(f, "  {:<22}{}", label, t),
        None => writeln!(f, "  {:<22}not specified", label),
    }
}

fn write_table(f: &mut fmt::Formatter<'_>, label: &str, curve: &Option<IvCurve>) -> fmt::Result {
    match curve {
        Some(c) => writeln!(f, "  {:<22}{} points", label, c.len()),
        None => writeln!(f, "  {:<22}absent", label),
    }
}

impl fmt::Display for DataModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Component: {}", self.component_name)?;
        writeln!(f, "Model:     {}", self.model_name)?;
        writeln!(f, "Type:      {} ({:?})", self.model_type_name, self.kind)?;

        writeln!(f, "Parameters [typ, min, max]:")?;
        write_triple(f, "R_pkg", &self.r_pkg)?;
        write_triple(f, "L_pkg", &self.l_pkg)?;
        write_triple(f, "C_pkg", &self.c_pkg)?;
        write_triple(f, "C_comp", &self.c_comp)?;
        write_triple(f, "Voltage Range", &self.v_range)?;
        write_triple(f, "Temperature Range", &self.temp_range)?;
        write_triple(f, "Pullup Reference", &self.pullup_ref)?;
        write_triple(f, "Pulldown Reference", &self.pulldown_ref)?;
        write_triple(f, "POWER Clamp Reference", &self.pwr_clamp_ref)?;
        write_triple(f, "GND Clamp Reference", &self.gnd_clamp_ref)?;

        writeln!(f, "I-V tables:")?;
        write_table(f, "Pullup", &self.iv_pullup)?;
        write_table(f, "Pulldown", &self.iv_pulldown)?;
        write_table(f, "POWER Clamp", &self.iv_pwr_clamp)?;
        write_table(f, "GND Clamp", &self.iv_gnd_clamp)?;

        for (edge, list) in [(Edge::Rising, &self.vt_rising), (Edge::Falling, &self.vt_falling)] {
            writeln!(f, "{} waveforms: {}", edge, list.len())?;
            for (i, wf) in list.iter().enumerate() {
                writeln!(
                    f,
                    "  [{}] {} samples, R_fixture={}, V_fixture={}",
                    i,
                    wf.len(),
                    wf.r_fixture,
                    wf.v_fixture
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_ibis::parse_ibs_file;

    const TWO_MODELS: &str = "\
[IBIS Ver] 7.2
[Component] CHIP
[Package]
R_pkg 0.1 NA NA
L_pkg 2n NA NA
C_pkg 1p NA NA
[Pin] signal model
1 A OUT_A
2 B TERM
[Model] OUT_A
Model_type Output
C_comp 1p 1p 1p
[Voltage Range] 3.3 3.0 3.6
[Pulldown]
0 0 0 0
[Pullup]
[Model] TERM
Model_type Terminator
[End]
";

    #[test]
    fn test_from_ibis_copies_package_and_drops_empty_tables() {
        let ibis = parse_ibs_file(TWO_MODELS).unwrap();
        let model = DataModel::from_ibis(&ibis, "CHIP", "OUT_A").unwrap();

        assert_eq!(model.kind, BufferKind::PushPull);
        assert_eq!(model.r_pkg.unwrap().typical, Some(0.1));
        assert!(model.iv_pulldown.is_some());
        assert!(model.iv_pullup.is_none());
        assert!(model.vt_rising.is_empty());
    }

    #[test]
    fn test_missing_names_are_typed_failures() {
        let ibis = parse_ibs_file(TWO_MODELS).unwrap();

        match DataModel::from_ibis(&ibis, "NOPE", "OUT_A") {
            Err(ConvertError::MissingModel { kind, .. }) => assert_eq!(kind, "Component"),
            other => panic!("unexpected: {other:?}"),
        }
        match DataModel::from_ibis(&ibis, "CHIP", "NOPE") {
            Err(ConvertError::MissingModel { kind, .. }) => assert_eq!(kind, "Model"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_type_rejected() {
        let ibis = parse_ibs_file(TWO_MODELS).unwrap();
        let err = DataModel::from_ibis(&ibis, "CHIP", "TERM").unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedModelType(ref t) if t == "Terminator"));
    }

    #[test]
    fn test_classify() {
        assert_eq!(BufferKind::classify(ModelType::IOOpenSink), Some(BufferKind::OpenDrain));
        assert_eq!(BufferKind::classify(ModelType::ThreeState), Some(BufferKind::PushPull));
        assert_eq!(BufferKind::classify(ModelType::Series), None);
        assert_eq!(BufferKind::PushPull.waveforms_needed(), 2);
    }

    #[test]
    fn test_summary_mentions_absent_parameters() {
        let ibis = parse_ibs_file(TWO_MODELS).unwrap();
        let model = DataModel::from_ibis(&ibis, "CHIP", "OUT_A").unwrap();
        let text = model.to_string();

        assert!(text.contains("Model:     OUT_A"));
        assert!(text.contains("Pullup Reference"));
        assert!(text.contains("not specified"));
        assert!(text.contains("1 points"));
    }
}
