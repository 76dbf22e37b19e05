//! Complete subcircuit documents.
//!
//! Three variants are produced: an input model (package, die capacitance
//! and clamps), a generic output model with a fixed oscillating stimulus,
//! and an LTspice output model whose stimulus is chosen per instance.

use crate::builder::{num, si, TextBuilder};
use crate::report::{EmitReport, EmitWarning};
use crate::sections::{clamp_sources, device_sources, header, parameters, rlc_network};
use crate::stimulus::{
    edge_pwl, oscillation_absolute, oscillation_relative, GapOffsets, KColumn, MIN_GAP,
};
use lib_convert::{
    convert, Conversion, ConversionRequest, ConvertError, ConvertResult, DataModel, Dialect,
    EdgePair, PinDirection, StimulusMode,
};
use lib_types::{Edge, KParameterWaveform};

/// Load on the k control nodes so every switch state has a DC path.
const K_LOAD: &str = "1G";

/// Subcircuit name for `request`.
pub fn subckt_name(model: &DataModel, request: &ConversionRequest) -> String {
    match request.direction {
        PinDirection::Input => format!("{}-{}", model.model_name, request.corner.label()),
        PinDirection::Output => format!(
            "{}-{}-{}-Output",
            model.model_name,
            model.component_name,
            request.corner.label()
        ),
    }
}

/// Render the netlist for an already computed conversion.
pub fn render_document(
    model: &DataModel,
    request: &ConversionRequest,
    conversion: &Conversion,
) -> ConvertResult<(String, EmitReport)> {
    request.validate(model)?;

    let mut report = EmitReport {
        warnings: Vec::new(),
        skipped: conversion.skipped.clone(),
    };

    let text = match request.direction {
        PinDirection::Input => input_document(model, request, conversion, &mut report.warnings),
        PinDirection::Output => {
            let edges = conversion.k_params.as_ref().ok_or_else(|| {
                ConvertError::missing_data("k-parameters were not computed for an output request")
            })?;
            match request.dialect {
                Dialect::Generic => {
                    generic_output(model, request, conversion, edges, &mut report.warnings)
                }
                Dialect::LtSpice => {
                    ltspice_output(model, request, conversion, edges, &mut report.warnings)
                }
            }
        }
    };


    Ok((text, report))
}

/// Convert and render in one step.
pub fn render(model: &DataModel, request: &ConversionRequest) -> ConvertResult<(String, EmitReport)> {
    let conversion = convert(model, request)?;
    render_document(model, request, &conversion)
}

fn input_document(
    model: &DataModel,
    request: &ConversionRequest,
    conversion: &Conversion,
    warnings: &mut Vec<EmitWarning>,
) -> String {
    TextBuilder::new()
        .line(format!(".SUBCKT {} IN", subckt_name(model, request)))
        .blank()
        .section(header(model, request))
        .blank()
        .section(parameters(&conversion.params, warnings))
        .blank()
        .section(rlc_network("IN"))
        .blank()
        .section(clamp_sources(model, &conversion.params))
        .blank()
        .line(".ends")
        .build()
}

/// Columns to drive for these edges, pullup first.
fn columns(edges: &EdgePair) -> Vec<KColumn> {
    if edges.is_open_drain() {
        vec![KColumn::Pulldown]
    } else {
        vec![KColumn::Pullup, KColumn::Pulldown]
    }
}

/// Package, clamps and k-scaled devices on the `OUT` pin.
fn output_body(model: &DataModel, conversion: &Conversion, edges: &EdgePair) -> String {
    let mut b = TextBuilder::new()
        .section(rlc_network("OUT"))
        .blank()
        .section(clamp_sources(model, &conversion.params))
        .section(device_sources(model, &conversion.params))
        .blank();
    for column in columns(edges) {
        b = b.line(format!("R{} {} 0 {}", column.node(), column.node(), K_LOAD));
    }
    b.build()
}

fn gap_params(
    request: &ConversionRequest,
    edges: &EdgePair,
    clamp: impl Fn(&str) -> String,
    warnings: &mut Vec<EmitWarning>,
) -> String {
    let gaps = GapOffsets::from_edges(edges);
    warnings.extend(gaps.check(request.stimulus.freq, request.stimulus.duty));

    let [calc_pos, calc_neg] = gaps.calc_params();
    TextBuilder::new()
        .comment("Gaps between edges, from frequency, duty cycle and edge crossover")
        .line(calc_pos)
        .line(calc_neg)
        .param("gap_pos", format!("{{{}}}", clamp("calc_gap_pos")))
        .param("gap_neg", format!("{{{}}}", clamp("calc_gap_neg")))
        .build()
}

fn generic_output(
    model: &DataModel,
    request: &ConversionRequest,
    conversion: &Conversion,
    edges: &EdgePair,
    warnings: &mut Vec<EmitWarning>,
) -> String {
    let stimulus = &request.stimulus;
    let min_gap = si(MIN_GAP);
    let gaps = gap_params(request, edges, |calc| format!("max({}, {})", calc, min_gap), warnings);

    let mut sources = TextBuilder::new();
    for column in columns(edges) {
        sources = sources.line(format!(
            "V{} {} 0 PWL({}) r=0",
            column.node(),
            column.node(),
            oscillation_absolute(edges, column)
        ));
    }

    TextBuilder::new()
        .line(format!(
            ".SUBCKT {} OUT params: freq={} duty={}",
            subckt_name(model, request),
            si(stimulus.freq.0),
            num(stimulus.duty)
        ))
        .blank()
        .section(header(model, request))
        .blank()
        .section(parameters(&conversion.params, warnings))
        .blank()
        .section(gaps)
        .blank()
        .section(output_body(model, conversion, edges))
        .blank()
        .comment("K-parameter stimulus")
        .section(sources.build())
        .blank()
        .line(".ends")
        .build()
}

/// Source node suffix for each stimulus mode.
fn mode_node(mode: StimulusMode) -> &'static str {
    match mode {
        StimulusMode::Oscillate => "OSC",
        StimulusMode::InvertedOscillate => "INV",
        StimulusMode::RisingEdge => "RISE",
        StimulusMode::FallingEdge => "FALL",
        StimulusMode::StuckHigh => "HIGH",
        StimulusMode::StuckLow => "LOW",
    }
}

fn final_value(k: &KParameterWaveform, column: KColumn) -> f64 {
    let values = match column {
        KColumn::Pullup => k.k_u.as_deref().unwrap_or(&[]),
        KColumn::Pulldown => k.k_d.as_slice(),
    };
    values.last().copied().unwrap_or(0.0)
}

/// Source value for one column in one stimulus mode.
fn mode_source(edges: &EdgePair, column: KColumn, mode: StimulusMode) -> String {
    match mode {
        StimulusMode::Oscillate => format!(
            "PWL REPEAT FOREVER ({}) ENDREPEAT",
            oscillation_relative(edges, column, false)
        ),
        StimulusMode::InvertedOscillate => format!(
            "PWL REPEAT FOREVER ({}) ENDREPEAT",
            oscillation_relative(edges, column, true)
        ),
        StimulusMode::RisingEdge => format!("PWL({})", edge_pwl(edges.get(Edge::Rising), column)),
        StimulusMode::FallingEdge => format!("PWL({})", edge_pwl(edges.get(Edge::Falling), column)),
        StimulusMode::StuckHigh => num(final_value(edges.get(Edge::Rising), column)),
        StimulusMode::StuckLow => num(final_value(edges.get(Edge::Falling), column)),
    }
}

fn ltspice_output(
    model: &DataModel,
    request: &ConversionRequest,
    conversion: &Conversion,
    edges: &EdgePair,
    warnings: &mut Vec<EmitWarning>,
) -> String {
    let stimulus = &request.stimulus;
    let min_gap = si(MIN_GAP);
    let gaps = gap_params(
        request,
        edges,
        |calc| format!("if({} <= 0, {}, {})", calc, min_gap, calc),
        warnings,
    );

    let mut modes = TextBuilder::new();
    for mode in StimulusMode::ALL {
        modes = modes.comment(format!("  {} = {}", mode.index(), mode.description()));
    }

    let mut select = TextBuilder::new();
    for mode in StimulusMode::ALL {
        select = select.line(format!(
            "VSEL{0} SEL{0} 0 {{if(stimulus=={0},1,0)}}",
            mode.index()
        ));
    }

    let mut sources = TextBuilder::new();
    for column in columns(edges) {
        let node = column.node();
        for mode in StimulusMode::ALL {
            let source = format!("{}_{}", node, mode_node(mode));
            sources = sources
                .line(format!("S{}{} {} {} SEL{} 0 KSW", node, mode.index(), node, source, mode.index()))
                .line(format!("V{} {} 0 {}", source, source, mode_source(edges, column, mode)));
        }
        sources = sources.blank();
    }

    TextBuilder::new()
        .line(format!(
            ".SUBCKT {} OUT params: stimulus={} delay={} freq={} duty={}",
            subckt_name(model, request),
            stimulus.mode.index(),
            si(stimulus.delay.0),
            si(stimulus.freq.0),
            num(stimulus.duty)
        ))
        .blank()
        .section(header(model, request))
        .comment("Stimulus:")
        .section(modes.build())
        .blank()
        .section(parameters(&conversion.params, warnings))
        .blank()
        .section(gaps)
        .blank()
        .section(output_body(model, conversion, edges))
        .blank()
        .line(".model KSW SW(Ron=1m Roff=1G Vt=0.5)")
        .section(select.build())
        .blank()
        .comment("K-parameter stimulus")
        .section(sources.build())
        .line(".ends")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_convert::{SampleFailure, SingularPolicy};
    use lib_ibis::ModelType;
    use lib_types::{Corner, IvCurve, ParameterTriple, VtWaveform};

    fn ramp(from: f64, to: f64, fixture: f64) -> VtWaveform {
        let mid = (from + to) / 2.0;
        VtWaveform::from_rows(
            &[(0.0, from, from, from), (1e-9, mid, mid, mid), (2e-9, to, to, to)],
            ParameterTriple::uniform(fixture),
            50.0,
        )
    }

    fn buffer(model_type: ModelType) -> DataModel {
        let mut model = DataModel::new("CHIP", "BUF", model_type).unwrap();
        model.c_comp = Some(ParameterTriple::uniform(1e-12));
        model.r_pkg = Some(ParameterTriple::uniform(0.2));
        model.l_pkg = Some(ParameterTriple::uniform(2e-9));
        model.c_pkg = Some(ParameterTriple::uniform(0.5e-12));
        model.v_range = Some(ParameterTriple::uniform(1.0));
        model.iv_pulldown = Some(IvCurve::from_rows(&[(0.0, 0.0, 0.0, 0.0), (1.0, 1.0, 1.0, 1.0)]));
        model.iv_gnd_clamp = Some(IvCurve::from_rows(&[(-1.0, -0.1, -0.1, -0.1), (0.0, 0.0, 0.0, 0.0)]));
        if model_type != ModelType::OpenDrain {
            model.iv_pullup = Some(IvCurve::from_rows(&[(0.0, 0.0, 0.0, 0.0), (1.0, 1.0, 1.0, 1.0)]));
        }
        model.vt_rising = vec![ramp(0.0, 0.5, 0.0), ramp(0.5, 1.0, 1.0)];
        model.vt_falling = vec![ramp(0.5, 0.0, 0.0), ramp(1.0, 0.5, 1.0)];
        model
    }

    fn output_request(dialect: Dialect) -> ConversionRequest {
        let mut request = ConversionRequest::new(PinDirection::Output, dialect, Corner::Typical);
        request.singular_policy = SingularPolicy::Skip;
        request
    }

    #[test]
    fn test_input_document_layout() {
        let model = buffer(ModelType::IO);
        let request = ConversionRequest::new(PinDirection::Input, Dialect::Generic, Corner::WeakSlow);
        let (text, report) = render(&model, &request).unwrap();

        assert!(text.starts_with(".SUBCKT BUF-Weak-Slow IN\n"));
        assert!(text.ends_with(".ends\n"));
        assert!(text.contains(".param R_pkg = 0.2\n"));
        assert!(text.contains("B2 DIE 0 I=table(V(DIE)"));
        assert!(!text.contains("KU"));
        assert!(report.is_clean());
    }

    #[test]
    fn test_generic_output_document() {
        let model = buffer(ModelType::IO);
        let (text, _) = render(&model, &output_request(Dialect::Generic)).unwrap();

        assert!(text.starts_with(".SUBCKT BUF-CHIP-Typical-Output OUT params: freq=10Meg duty=0.5\n"));
        assert!(text.contains(".param gap_pos = {max(calc_gap_pos, 100f)}\n"));
        assert!(text.contains("VKU KU 0 PWL(0 "));
        assert!(text.contains("VKD KD 0 PWL(0 "));
        assert!(text.contains(") r=0\n"));
        assert!(text.contains("B3 DIE VCC I={V(KU)*table("));
        assert!(!text.contains("REPEAT"));
    }

    #[test]
    fn test_ltspice_output_document() {
        let model = buffer(ModelType::IO);
        let mut request = output_request(Dialect::LtSpice);
        request.stimulus.mode = StimulusMode::RisingEdge;
        let (text, _) = render(&model, &request).unwrap();

        assert!(text.starts_with(
            ".SUBCKT BUF-CHIP-Typical-Output OUT params: stimulus=2 delay=10n freq=10Meg duty=0.5\n"
        ));
        assert!(text.contains(".param gap_neg = {if(calc_gap_neg <= 0, 100f, calc_gap_neg)}\n"));
        assert!(text.contains(".model KSW SW(Ron=1m Roff=1G Vt=0.5)\n"));
        assert!(text.contains("VSEL5 SEL5 0 {if(stimulus==5,1,0)}\n"));
        assert!(text.contains("SKU0 KU KU_OSC SEL0 0 KSW\n"));
        assert!(text.contains("VKU_OSC KU_OSC 0 PWL REPEAT FOREVER (0 "));
        assert!(text.contains("VKD_RISE KD_RISE 0 PWL({delay} "));
        assert!(text.contains("  3 = Falling Edge\n"));
    }

    #[test]
    fn test_open_drain_has_no_pullup_path() {
        let model = buffer(ModelType::OpenDrain);
        for dialect in [Dialect::Generic, Dialect::LtSpice] {
            let (text, _) = render(&model, &output_request(dialect)).unwrap();
            assert!(!text.contains("KU"), "{} output drives KU", dialect);
            assert!(text.contains("B4 DIE 0 I={V(KD)*table("));
            assert!(text.contains("RKD KD 0 1G"));
        }
    }

    #[test]
    fn test_short_period_reports_clamped_gaps() {
        let model = buffer(ModelType::IO);
        let mut request = output_request(Dialect::LtSpice);
        request.stimulus.freq = lib_types::Hertz(1e12);
        let (_, report) = render(&model, &request).unwrap();

        let clamped = report
            .warnings
            .iter()
            .filter(|w| matches!(w, EmitWarning::ClampedGap { .. }))
            .count();
        assert!(clamped >= 1);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let model = buffer(ModelType::IO);
        for dialect in [Dialect::Generic, Dialect::LtSpice] {
            let request = output_request(dialect);
            let (first, _) = render(&model, &request).unwrap();
            let (second, _) = render(&model, &request).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_output_needs_k_params() {
        let model = buffer(ModelType::IO);
        let input = ConversionRequest::new(PinDirection::Input, Dialect::Generic, Corner::Typical);
        let conversion = convert(&model, &input).unwrap();

        let result = render_document(&model, &output_request(Dialect::Generic), &conversion);
        assert!(matches!(result, Err(ConvertError::MissingData(_))));
    }

    #[test]
    fn test_generic_output_rejects_single_edge_stimulus() {
        let model = buffer(ModelType::IO);
        let conversion = convert(&model, &output_request(Dialect::Generic)).unwrap();

        let mut request = output_request(Dialect::Generic);
        request.stimulus.mode = StimulusMode::FallingEdge;
        assert!(matches!(render(&model, &request), Err(ConvertError::InvalidInput(_))));
        assert!(matches!(
            render_document(&model, &request, &conversion),
            Err(ConvertError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_skipped_samples_reach_report() {
        let model = buffer(ModelType::IO);
        let mut conversion = convert(&model, &output_request(Dialect::LtSpice)).unwrap();
        conversion.skipped = vec![(Edge::Falling, SampleFailure { index: 4, time: 2e-9 })];

        let (_, report) = render_document(&model, &output_request(Dialect::LtSpice), &conversion).unwrap();
        assert_eq!(report.skipped, conversion.skipped);
        assert!(!report.is_clean());
    }
}
