//! IBIS (.ibs) file parser.
//!
//! Parses IBIS I/O buffer model files according to the IBIS 7.2 specification.
//! This is a partial implementation covering the keywords needed to build a
//! behavioral SPICE model of a buffer: header information, component package
//! parasitics and pins, and per-model parameters, I-V tables and V-T
//! waveforms. Unknown keywords are skipped along with their data lines.
//!
//! Reference: IBIS Specification Version 7.2

use crate::error::ParseError;
use lib_types::{Edge, IvCurve, IvPoint, ParameterTriple, VtPoint, VtWaveform};
use nom::bytes::complete::take_while;
use nom::combinator::all_consuming;
use nom::number::complete::double;
use nom::sequence::pair;
use nom::IResult;
use std::path::Path;

/// Parsed IBIS file.
#[derive(Clone, Debug, Default)]
pub struct IbisFile {
    /// File header information.
    pub header: IbisHeader,

    /// Component definitions.
    pub components: Vec<Component>,

    /// Model definitions.
    pub models: Vec<Model>,
}

impl IbisFile {
    /// Names of all components, in file order.
    pub fn component_names(&self) -> Vec<&str> {
        self.components.iter().map(|c| c.name.as_str()).collect()
    }

    /// Names of all models, in file order.
    pub fn model_names(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.name.as_str()).collect()
    }

    /// Look up a component by name.
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Look up a model by name.
    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.name == name)
    }
}

/// IBIS file header section.
#[derive(Clone, Debug, Default)]
pub struct IbisHeader {
    /// IBIS version.
    pub ibis_ver: String,

    /// File name.
    pub file_name: String,

    /// File revision.
    pub file_rev: String,

    /// Date.
    pub date: String,

    /// Source (vendor name).
    pub source: String,

    /// Notes.
    pub notes: String,

    /// Copyright.
    pub copyright: String,
}

/// Component definition.
#[derive(Clone, Debug, Default)]
pub struct Component {
    /// Component name.
    pub name: String,

    /// Manufacturer.
    pub manufacturer: String,

    /// Package information.
    pub package: Option<Package>,

    /// Pin definitions.
    pub pins: Vec<Pin>,
}

/// Package parasitics.
#[derive(Clone, Debug, Default)]
pub struct Package {
    /// R_pkg in Ohms.
    pub r_pkg: Option<ParameterTriple>,

    /// L_pkg in Henries.
    pub l_pkg: Option<ParameterTriple>,

    /// C_pkg in Farads.
    pub c_pkg: Option<ParameterTriple>,
}

/// Pin definition.
#[derive(Clone, Debug, Default)]
pub struct Pin {
    /// Pin name/number.
    pub name: String,

    /// Signal name.
    pub signal_name: String,

    /// Associated model name.
    pub model_name: String,

    /// R_pin (optional).
    pub r_pin: Option<f64>,

    /// L_pin (optional).
    pub l_pin: Option<f64>,

    /// C_pin (optional).
    pub c_pin: Option<f64>,
}

/// I/O buffer model.
#[derive(Clone, Debug, Default)]
pub struct Model {
    /// Model name.
    pub name: String,

    /// Model type.
    pub model_type: ModelType,

    /// Model type exactly as written in the file.
    pub model_type_name: String,

    /// Die capacitance.
    pub c_comp: Option<ParameterTriple>,

    /// Supply voltage range.
    pub voltage_range: Option<ParameterTriple>,

    /// Temperature range.
    pub temperature_range: Option<ParameterTriple>,

    /// Pull-up reference voltage.
    pub pullup_reference: Option<ParameterTriple>,

    /// Pull-down reference voltage.
    pub pulldown_reference: Option<ParameterTriple>,

    /// Power clamp reference voltage.
    pub power_clamp_reference: Option<ParameterTriple>,

    /// Ground clamp reference voltage.
    pub gnd_clamp_reference: Option<ParameterTriple>,

    /// Pullup I-V table.
    pub pullup: Option<IvCurve>,

    /// Pulldown I-V table.
    pub pulldown: Option<IvCurve>,

    /// Power clamp I-V table.
    pub power_clamp: Option<IvCurve>,

    /// Ground clamp I-V table.
    pub gnd_clamp: Option<IvCurve>,

    /// Rising waveform tables.
    pub rising_waveforms: Vec<VtWaveform>,

    /// Falling waveform tables.
    pub falling_waveforms: Vec<VtWaveform>,
}

/// Model type enumeration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModelType {
    Input,
    Output,
    IO,
    ThreeState,
    OpenDrain,
    IOOpenDrain,
    OpenSink,
    IOOpenSink,
    OpenSource,
    IOOpenSource,
    InputECL,
    OutputECL,
    IOECL,
    ThreeStateECL,
    Terminator,
    Series,
    SeriesSwitch,
    /// Missing or unrecognized `Model_type`.
    #[default]
    Unknown,
}

impl ModelType {
    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "input" => Some(Self::Input),
            "output" => Some(Self::Output),
            "i/o" | "io" => Some(Self::IO),
            "3-state" | "three-state" => Some(Self::ThreeState),
            "open_drain" => Some(Self::OpenDrain),
            "i/o_open_drain" | "io_open_drain" => Some(Self::IOOpenDrain),
            "open_sink" => Some(Self::OpenSink),
            "i/o_open_sink" | "io_open_sink" => Some(Self::IOOpenSink),
            "open_source" => Some(Self::OpenSource),
            "i/o_open_source" | "io_open_source" => Some(Self::IOOpenSource),
            "input_ecl" => Some(Self::InputECL),
            "output_ecl" => Some(Self::OutputECL),
            "i/o_ecl" | "io_ecl" => Some(Self::IOECL),
            "3-state_ecl" => Some(Self::ThreeStateECL),
            "terminator" => Some(Self::Terminator),
            "series" => Some(Self::Series),
            "series_switch" => Some(Self::SeriesSwitch),
            _ => None,
        }
    }
}

/// Read and parse an IBIS file from disk.
pub fn parse_ibs_path(path: &Path) -> Result<IbisFile, ParseError> {
    tracing::debug!("Reading IBIS file {:?}", path);
    let content = std::fs::read_to_string(path)?;
    parse_ibs_file(&content)
}

/// Parse an IBIS file from a string.
pub fn parse_ibs_file(content: &str) -> Result<IbisFile, ParseError> {
    let mut parser = Parser::default();

    for (idx, raw) in content.lines().enumerate() {
        parser.line(idx + 1, raw)?;
    }

    parser.finish()
}

#[derive(Clone, Copy, Debug, Default)]
enum Scope {
    #[default]
    Ignore,
    Text(TextField),
    Component,
    Package,
    Pin,
    Model,
    Table(TableType),
    Waveform,
}

#[derive(Clone, Copy, Debug)]
enum TextField {
    Source,
    Notes,
    Copyright,
}

#[derive(Clone, Copy, Debug)]
enum TableType {
    Pullup,
    Pulldown,
    PowerClamp,
    GndClamp,
}

/// A waveform whose fixture keywords may still be arriving.
#[derive(Debug)]
struct PendingWaveform {
    edge: Edge,
    line: usize,
    r_fixture: Option<f64>,
    v_fixture: [Option<f64>; 3],
    samples: Vec<VtPoint>,
}

#[derive(Debug, Default)]
struct Parser {
    file: IbisFile,
    scope: Scope,
    component: Option<Component>,
    model: Option<Model>,
    waveform: Option<PendingWaveform>,
}

impl Parser {
    fn line(&mut self, line_no: usize, raw: &str) -> Result<(), ParseError> {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            return Ok(());
        }

        if let Some(body) = line.strip_prefix('[') {
            let close = body
                .find(']')
                .ok_or_else(|| ParseError::syntax(line_no, 1, "unterminated keyword bracket"))?;
            let keyword = normalize_keyword(&body[..close]);
            let rest = body[close + 1..].trim();
            self.keyword(line_no, &keyword, rest)
        } else {
            self.data(line_no, line)
        }
    }

    fn keyword(&mut self, line_no: usize, keyword: &str, rest: &str) -> Result<(), ParseError> {
        self.flush_waveform()?;

        self.scope = match keyword {
            "ibis ver" => {
                self.file.header.ibis_ver = rest.to_string();
                Scope::Ignore
            }
            "file name" => {
                self.file.header.file_name = rest.to_string();
                Scope::Ignore
            }
            "file rev" => {
                self.file.header.file_rev = rest.to_string();
                Scope::Ignore
            }
            "date" => {
                self.file.header.date = rest.to_string();
                Scope::Ignore
            }
            "source" => {
                self.file.header.source = rest.to_string();
                Scope::Text(TextField::Source)
            }
            "notes" => {
                self.file.header.notes = rest.to_string();
                Scope::Text(TextField::Notes)
            }
            "copyright" => {
                self.file.header.copyright = rest.to_string();
                Scope::Text(TextField::Copyright)
            }
            "component" => {
                self.flush_component();
                self.flush_model();
                self.component = Some(Component {
                    name: rest.to_string(),
                    ..Default::default()
                });
                Scope::Component
            }
            "manufacturer" => {
                if let Some(comp) = self.component.as_mut() {
                    comp.manufacturer = rest.to_string();
                }
                Scope::Component
            }
            "package" if self.component.is_some() => {
                if let Some(comp) = self.component.as_mut() {
                    comp.package.get_or_insert_with(Package::default);
                }
                Scope::Package
            }
            "pin" if self.component.is_some() => Scope::Pin,
            "model" => {
                self.flush_component();
                self.flush_model();
                self.model = Some(Model {
                    name: rest.split_whitespace().next().unwrap_or_default().to_string(),
                    ..Default::default()
                });
                Scope::Model
            }
            "model selector" | "end" => {
                self.flush_component();
                self.flush_model();
                Scope::Ignore
            }
            _ if self.model.is_some() => self.model_keyword(line_no, keyword, rest)?,
            _ => Scope::Ignore,
        };

        Ok(())
    }

    fn model_keyword(&mut self, line_no: usize, keyword: &str, rest: &str) -> Result<Scope, ParseError> {
        let Some(model) = self.model.as_mut() else {
            return Ok(Scope::Ignore);
        };

        let scope = match keyword {
            "voltage range" => {
                model.voltage_range = parse_triple(keyword, line_no, rest)?;
                Scope::Model
            }
            "temperature range" => {
                model.temperature_range = parse_triple(keyword, line_no, rest)?;
                Scope::Model
            }
            "pullup reference" => {
                model.pullup_reference = parse_triple(keyword, line_no, rest)?;
                Scope::Model
            }
            "pulldown reference" => {
                model.pulldown_reference = parse_triple(keyword, line_no, rest)?;
                Scope::Model
            }
            "power clamp reference" | "pwr clamp reference" => {
                model.power_clamp_reference = parse_triple(keyword, line_no, rest)?;
                Scope::Model
            }
            "gnd clamp reference" | "ground clamp reference" => {
                model.gnd_clamp_reference = parse_triple(keyword, line_no, rest)?;
                Scope::Model
            }
            "pullup" => {
                model.pullup = Some(IvCurve::default());
                Scope::Table(TableType::Pullup)
            }
            "pulldown" => {
                model.pulldown = Some(IvCurve::default());
                Scope::Table(TableType::Pulldown)
            }
            "power clamp" => {
                model.power_clamp = Some(IvCurve::default());
                Scope::Table(TableType::PowerClamp)
            }
            "gnd clamp" => {
                model.gnd_clamp = Some(IvCurve::default());
                Scope::Table(TableType::GndClamp)
            }
            "rising waveform" | "falling waveform" => {
                let edge = if keyword.starts_with("rising") {
                    Edge::Rising
                } else {
                    Edge::Falling
                };
                self.waveform = Some(PendingWaveform {
                    edge,
                    line: line_no,
                    r_fixture: None,
                    v_fixture: [None; 3],
                    samples: Vec::new(),
                });
                Scope::Waveform
            }
            _ => {
                tracing::trace!("Skipping keyword [{}] at line {}", keyword, line_no);
                Scope::Ignore
            }
        };

        Ok(scope)
    }

    fn data(&mut self, line_no: usize, line: &str) -> Result<(), ParseError> {
        match self.scope {
            Scope::Ignore | Scope::Component => {}
            Scope::Text(field) => {
                let header = &mut self.file.header;
                let target = match field {
                    TextField::Source => &mut header.source,
                    TextField::Notes => &mut header.notes,
                    TextField::Copyright => &mut header.copyright,
                };
                if !target.is_empty() {
                    target.push('\n');
                }
                target.push_str(line);
            }
            Scope::Package => self.package_line(line_no, line)?,
            Scope::Pin => self.pin_line(line_no, line)?,
            Scope::Model => self.model_line(line_no, line)?,
            Scope::Table(table) => {
                let point = parse_iv_line(line_no, line)?;
                if let Some(model) = self.model.as_mut() {
                    let curve = match table {
                        TableType::Pullup => &mut model.pullup,
                        TableType::Pulldown => &mut model.pulldown,
                        TableType::PowerClamp => &mut model.power_clamp,
                        TableType::GndClamp => &mut model.gnd_clamp,
                    };
                    if let Some(curve) = curve.as_mut() {
                        curve.points.push(point);
                    }
                }
            }
            Scope::Waveform => self.waveform_line(line_no, line)?,
        }
        Ok(())
    }

    fn package_line(&mut self, line_no: usize, line: &str) -> Result<(), ParseError> {
        let Some((name, rest)) = split_name(line) else {
            return Ok(());
        };
        let Some(package) = self.component.as_mut().and_then(|c| c.package.as_mut()) else {
            return Ok(());
        };

        match name.to_lowercase().as_str() {
            "r_pkg" => package.r_pkg = parse_triple(name, line_no, rest)?,
            "l_pkg" => package.l_pkg = parse_triple(name, line_no, rest)?,
            "c_pkg" => package.c_pkg = parse_triple(name, line_no, rest)?,
            _ => {}
        }
        Ok(())
    }

    fn pin_line(&mut self, line_no: usize, line: &str) -> Result<(), ParseError> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            return Err(ParseError::syntax(line_no, 1, "pin row needs name, signal and model"));
        }

        let optional = |idx: usize| -> Result<Option<f64>, ParseError> {
            match parts.get(idx) {
                Some(token) => parse_optional(token, "pin parasitic", line_no),
                None => Ok(None),
            }
        };

        let pin = Pin {
            name: parts[0].to_string(),
            signal_name: parts[1].to_string(),
            model_name: parts[2].to_string(),
            r_pin: optional(3)?,
            l_pin: optional(4)?,
            c_pin: optional(5)?,
        };

        if let Some(comp) = self.component.as_mut() {
            comp.pins.push(pin);
        }
        Ok(())
    }

    fn model_line(&mut self, line_no: usize, line: &str) -> Result<(), ParseError> {
        let Some((name, rest)) = split_name(line) else {
            return Ok(());
        };
        let Some(model) = self.model.as_mut() else {
            return Ok(());
        };

        match name.to_lowercase().as_str() {
            "model_type" => {
                let type_str = rest.split_whitespace().next().unwrap_or("");
                model.model_type_name = type_str.to_string();
                model.model_type = ModelType::from_str(type_str).unwrap_or_else(|| {
                    tracing::warn!(
                        "Unrecognized Model_type '{}' for model {} at line {}",
                        type_str,
                        model.name,
                        line_no
                    );
                    ModelType::Unknown
                });
            }
            "c_comp" => model.c_comp = parse_triple(name, line_no, rest)?,
            _ => {}
        }
        Ok(())
    }

    fn waveform_line(&mut self, line_no: usize, line: &str) -> Result<(), ParseError> {
        let Some(pending) = self.waveform.as_mut() else {
            return Ok(());
        };

        let first = line.split_whitespace().next().unwrap_or("");
        if first.starts_with(|c: char| c.is_ascii_alphabetic()) {
            let (name, value) = match line.split_once('=') {
                Some((name, value)) => (name.trim(), value.trim()),
                None => split_name(line).unwrap_or((line, "")),
            };
            let slot = match name.to_lowercase().as_str() {
                "r_fixture" => {
                    pending.r_fixture = parse_optional(value, name, line_no)?;
                    return Ok(());
                }
                "v_fixture" => &mut pending.v_fixture[0],
                "v_fixture_min" => &mut pending.v_fixture[1],
                "v_fixture_max" => &mut pending.v_fixture[2],
                _ => return Ok(()),
            };
            *slot = parse_optional(value, name, line_no)?;
            return Ok(());
        }

        let row = parse_table_row(line_no, line)?;
        pending.samples.push(VtPoint::new(row.0, row.1, row.2, row.3));
        Ok(())
    }

    fn flush_waveform(&mut self) -> Result<(), ParseError> {
        let Some(pending) = self.waveform.take() else {
            return Ok(());
        };
        let Some(model) = self.model.as_mut() else {
            return Ok(());
        };

        let r_fixture = pending.r_fixture.ok_or_else(|| {
            ParseError::missing_keyword(format!(
                "R_fixture for {} waveform of model {} (line {})",
                pending.edge, model.name, pending.line
            ))
        })?;
        let [typ, min, max] = pending.v_fixture;
        let v_fixture = ParameterTriple::new(typ, min, max).ok_or_else(|| {
            ParseError::missing_keyword(format!(
                "V_fixture for {} waveform of model {} (line {})",
                pending.edge, model.name, pending.line
            ))
        })?;

        let waveform = VtWaveform {
            samples: pending.samples,
            v_fixture,
            r_fixture,
        };
        match pending.edge {
            Edge::Rising => model.rising_waveforms.push(waveform),
            Edge::Falling => model.falling_waveforms.push(waveform),
        }
        Ok(())
    }

    fn flush_component(&mut self) {
        if let Some(comp) = self.component.take() {
            self.file.components.push(comp);
        }
    }

    fn flush_model(&mut self) {
        if let Some(model) = self.model.take() {
            tracing::debug!(
                "Parsed model {} ({} rising, {} falling waveforms)",
                model.name,
                model.rising_waveforms.len(),
                model.falling_waveforms.len()
            );
            self.file.models.push(model);
        }
    }

    fn finish(mut self) -> Result<IbisFile, ParseError> {
        self.flush_waveform()?;
        self.flush_component();
        self.flush_model();
        Ok(self.file)
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find('|') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Lowercase a keyword and treat underscores and runs of spaces as one space.
fn normalize_keyword(keyword: &str) -> String {
    keyword
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Split `name value...` into the leading name and the remaining text.
fn split_name(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((name, rest)) => Some((name, rest.trim())),
        None if !line.is_empty() => Some((line, "")),
        None => None,
    }
}

/// Parse up to three `typ min max` values; `NA` entries are absent.
fn parse_triple(field: &str, line_no: usize, rest: &str) -> Result<Option<ParameterTriple>, ParseError> {
    let mut values = [None; 3];
    for (slot, token) in values.iter_mut().zip(rest.split_whitespace()) {
        *slot = parse_optional(token, field, line_no)?;
    }
    Ok(ParameterTriple::new(values[0], values[1], values[2]))
}

/// Parse a `(x, typ, min, max)` table row. `NA` in the min or max column
/// inherits the typical value; the first two columns are mandatory.
fn parse_table_row(line_no: usize, line: &str) -> Result<(f64, f64, f64, f64), ParseError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 2 {
        return Err(ParseError::syntax(line_no, 1, "table row needs at least two columns"));
    }

    let x = parse_number(parts[0], "table axis", line_no)?;
    let typ = parse_number(parts[1], "typical column", line_no)?;
    let min = match parts.get(2) {
        Some(token) => parse_optional(token, "minimum column", line_no)?.unwrap_or(typ),
        None => typ,
    };
    let max = match parts.get(3) {
        Some(token) => parse_optional(token, "maximum column", line_no)?.unwrap_or(typ),
        None => typ,
    };

    Ok((x, typ, min, max))
}

fn parse_iv_line(line_no: usize, line: &str) -> Result<IvPoint, ParseError> {
    let (v, typ, min, max) = parse_table_row(line_no, line)?;
    Ok(IvPoint::new(v, typ, min, max))
}

fn parse_optional(token: &str, field: &str, line_no: usize) -> Result<Option<f64>, ParseError> {
    let token = token.trim();
    if token.eq_ignore_ascii_case("na") || token == "-" {
        return Ok(None);
    }
    parse_number(token, field, line_no).map(Some)
}

fn parse_number(token: &str, field: &str, line_no: usize) -> Result<f64, ParseError> {
    parse_value_with_suffix(token)
        .map_err(|e| ParseError::invalid_value(field, line_no, format!("'{}' is not a number ({})", token, e)))
}

/// Number followed by an optional scale suffix and ignored unit letters.
fn scaled_value(input: &str) -> IResult<&str, f64> {
    let (rest, (mantissa, suffix)) = pair(double, take_while(|c: char| c.is_alphabetic()))(input)?;
    Ok((rest, mantissa * scale_factor(suffix)))
}

fn scale_factor(suffix: &str) -> f64 {
    let lower = suffix.to_lowercase();
    if lower.starts_with("meg") {
        return 1e6;
    }
    match lower.chars().next() {
        Some('t') => 1e12,
        Some('g') => 1e9,
        Some('k') => 1e3,
        Some('m') => 1e-3,
        Some('u') | Some('μ') | Some('µ') => 1e-6,
        Some('n') => 1e-9,
        Some('p') => 1e-12,
        Some('f') => 1e-15,
        // No scale letter: anything left is a unit name (V, A, s, ohm...)
        _ => 1.0,
    }
}

fn parse_value_with_suffix(s: &str) -> Result<f64, ParseError> {
    let (_, value) = all_consuming(scaled_value)(s.trim())?;
    if !value.is_finite() {
        return Err(ParseError::Nom(format!("non-finite value '{}'", s)));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_types::Corner;

    const SAMPLE_IBS: &str = r#"
[IBIS Ver]      7.2
[File Name]     sample.ibs
[File Rev]      1.0
[Date]          January 1, 2024
[Source]        Test Vendor
                second source line

[Component]     TEST_CHIP
[Manufacturer]  Test Vendor Inc
[Package]
| variable   typ      min      max
R_pkg        0.1      NA       NA
L_pkg        8nH      NA       NA
C_pkg        5pF      4pF      6pF

[Pin] signal_name  model_name  R_pin  L_pin  C_pin
1     TXDATA       TX_MODEL
2     RXDATA       RX_MODEL    0.2    2n     NA

[Model]         TX_MODEL
Model_type      3-state
C_comp          2.8774pF  1.2578pF  5.2328pF
[Voltage Range] 3.3       3.0       3.6
[Temperature Range] 25    85        -40
[Pullup]
| voltage   I(typ)    I(min)    I(max)
-3.3        50m       40m       60m
0           0         0         0
3.3         -50m      -40m      -60m
[Pulldown]
-3.3        -50m      -40m      -60m
0           0         NA        NA
3.3         50m       40m       60m
[GND Clamp]
-1.0        -10m      -8m       -12m
0           0         0         0
[Power Clamp]
-1.0        10m       8m        12m
0           0         0         0
[Ramp]
dV/dt_r     1.0/0.5n  0.9/0.6n  1.1/0.4n
[Rising Waveform]
R_fixture = 50
V_fixture = 0.0
0.0         0.0       0.0       0.0
1n          1.5       1.4       1.6
2n          3.0       2.9       3.1
[Rising Waveform]
R_fixture = 50
V_fixture = 3.3
V_fixture_min = 3.0
V_fixture_max = 3.6
0.0         1.6       1.5       1.7
2n          3.3       3.0       3.6
[Falling Waveform]
R_fixture = 50
V_fixture = 0.0
0.0         3.0       2.9       3.1
2n          0.0       0.0       0.0

[Model]         RX_MODEL
Model_type      Input
C_comp          1p        NA        NA

[End]
"#;

    #[test]
    fn test_parse_sample_ibs() {
        let result = parse_ibs_file(SAMPLE_IBS).unwrap();

        assert_eq!(result.header.ibis_ver, "7.2");
        assert_eq!(result.header.file_name, "sample.ibs");
        assert_eq!(result.header.source, "Test Vendor\nsecond source line");
        assert_eq!(result.component_names(), vec!["TEST_CHIP"]);
        assert_eq!(result.model_names(), vec!["TX_MODEL", "RX_MODEL"]);

        let comp = result.component("TEST_CHIP").unwrap();
        assert_eq!(comp.manufacturer, "Test Vendor Inc");
        assert_eq!(comp.pins.len(), 2);
        assert_eq!(comp.pins[1].r_pin, Some(0.2));
        assert_eq!(comp.pins[1].c_pin, None);
    }

    #[test]
    fn test_package_triples_keep_na_absent() {
        let result = parse_ibs_file(SAMPLE_IBS).unwrap();
        let package = result.components[0].package.as_ref().unwrap();

        let r_pkg = package.r_pkg.unwrap();
        assert_eq!(r_pkg.typical, Some(0.1));
        assert_eq!(r_pkg.minimum, None);
        assert_eq!(r_pkg.maximum, None);

        let c_pkg = package.c_pkg.unwrap();
        assert!((c_pkg.maximum.unwrap() - 6e-12).abs() < 1e-24);
    }

    #[test]
    fn test_model_tables_and_waveforms() {
        let result = parse_ibs_file(SAMPLE_IBS).unwrap();
        let model = result.model("TX_MODEL").unwrap();

        assert_eq!(model.model_type, ModelType::ThreeState);
        assert_eq!(model.voltage_range.unwrap().at(Corner::FastStrong), Some(3.6));
        assert_eq!(model.pullup.as_ref().unwrap().len(), 3);
        assert_eq!(model.gnd_clamp.as_ref().unwrap().len(), 2);

        // NA in the minimum/maximum column inherits the typical current
        let pulldown = model.pulldown.as_ref().unwrap();
        assert_eq!(pulldown.points[1].current, [0.0, 0.0, 0.0]);

        assert_eq!(model.rising_waveforms.len(), 2);
        assert_eq!(model.falling_waveforms.len(), 1);

        let second = &model.rising_waveforms[1];
        assert_eq!(second.r_fixture, 50.0);
        assert_eq!(second.v_fixture.at(Corner::WeakSlow), Some(3.0));
        assert!((second.samples[1].time - 2e-9).abs() < 1e-21);

        let first = &model.rising_waveforms[0];
        assert_eq!(first.v_fixture.at(Corner::FastStrong), Some(0.0));
    }

    #[test]
    fn test_skipped_keyword_does_not_close_model() {
        let result = parse_ibs_file(SAMPLE_IBS).unwrap();
        let model = result.model("TX_MODEL").unwrap();
        // [Ramp] sits between the clamps and the waveforms
        assert!(model.power_clamp.is_some());
        assert!(!model.rising_waveforms.is_empty());

        let rx = result.model("RX_MODEL").unwrap();
        assert_eq!(rx.model_type, ModelType::Input);
        assert_eq!(rx.c_comp.unwrap().at(Corner::WeakSlow), Some(1e-12));
    }

    #[test]
    fn test_waveform_without_fixture_is_rejected() {
        let text = "[Model] M\nModel_type Output\n[Rising Waveform]\nV_fixture = 0\n0 0 0 0\n[End]\n";
        let err = parse_ibs_file(text).unwrap_err();
        assert!(matches!(err, ParseError::Missing { .. }));
    }

    #[test]
    fn test_bad_number_reports_line() {
        let text = "[Model] M\nModel_type Output\n[Pulldown]\n0 0 0 0\n1 abc 0 0\n";
        match parse_ibs_file(text).unwrap_err() {
            ParseError::InvalidValue { line, .. } => assert_eq!(line, 5),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_value_with_suffix() {
        assert!((parse_value_with_suffix("1.5m").unwrap() - 1.5e-3).abs() < 1e-15);
        assert!((parse_value_with_suffix("100n").unwrap() - 100e-9).abs() < 1e-18);
        assert!((parse_value_with_suffix("3.3").unwrap() - 3.3).abs() < 1e-10);
        assert!((parse_value_with_suffix("10k").unwrap() - 10e3).abs() < 1e-6);
        assert!((parse_value_with_suffix("2meg").unwrap() - 2e6).abs() < 1e-6);
        assert!((parse_value_with_suffix("5pF").unwrap() - 5e-12).abs() < 1e-24);
        assert!((parse_value_with_suffix("-1.03e-10").unwrap() + 1.03e-10).abs() < 1e-22);
        assert!((parse_value_with_suffix("3.3V").unwrap() - 3.3).abs() < 1e-10);
        assert!(parse_value_with_suffix("abc").is_err());
    }

    #[test]
    fn test_parse_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.ibs");
        std::fs::write(&path, SAMPLE_IBS).unwrap();

        let ibis = parse_ibs_path(&path).unwrap();
        assert_eq!(ibis.header.file_name, "sample.ibs");
        assert_eq!(ibis.components.len(), 1);

        let missing = parse_ibs_path(&dir.path().join("absent.ibs"));
        assert!(matches!(missing, Err(ParseError::Io(_))));
    }
}
