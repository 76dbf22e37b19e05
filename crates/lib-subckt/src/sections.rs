//! Netlist sections shared by every document variant.

use crate::builder::{num, TextBuilder};
use crate::report::EmitWarning;
use lib_convert::curve::{adjust_device_data, ground_referenced_table};
use lib_convert::{ConversionRequest, DataModel, ResolvedParameters};
use lib_types::IvCurve;

/// Node names used throughout the subcircuit.
pub const DIE: &str = "DIE";
pub const MID: &str = "MID";
pub const VCC: &str = "VCC";

/// Values substituted for zero or unspecified package parasitics.
pub const NOMINAL_R_PKG: f64 = 0.01;
pub const NOMINAL_L_PKG: f64 = 1e-9;
pub const NOMINAL_C_PKG: f64 = 0.1e-12;

/// Header comments identifying the source model and the generator.
pub fn header(model: &DataModel, request: &ConversionRequest) -> String {
    TextBuilder::new()
        .comment(format!("Component: {}", model.component_name))
        .comment(format!("Model: {}", model.model_name))
        .comment(format!("Model Type: {}", model.model_type_name))
        .comment(format!("Pin Direction: {}", request.direction))
        .comment(format!("Corner: {}", request.corner))
        .comment(format!("Dialect: {}", request.dialect))
        .comment(format!(
            "SPICE model created with ibis2spice version {}",
            env!("CARGO_PKG_VERSION")
        ))
        .build()
}

/// Value written for a package parameter, with any substitution applied.
fn package_value(
    name: &'static str,
    value: Option<f64>,
    nominal: f64,
    warnings: &mut Vec<EmitWarning>,
) -> f64 {
    match value {
        None => {
            let warning = EmitWarning::MissingParameter {
                name,
                substitute: nominal,
            };
            tracing::warn!("{}", warning);
            warnings.push(warning);
            nominal
        }
        Some(v) if v == 0.0 => {
            let warning = EmitWarning::ZeroValuedParameter {
                name,
                substitute: nominal,
            };
            tracing::warn!("{}", warning);
            warnings.push(warning);
            nominal
        }
        Some(v) => v,
    }
}

/// `.param` block for the package, die and supply.
///
/// Zero or unspecified package parasitics are replaced by small nominal
/// values (0.01 ohm, 1 nH, 0.1 pF) and the substitution is noted in a
/// comment above the parameters.
pub fn parameters(params: &ResolvedParameters, warnings: &mut Vec<EmitWarning>) -> String {
    let first_new = warnings.len();
    let c_pkg = package_value("C_pkg", params.c_pkg, NOMINAL_C_PKG, warnings);
    let l_pkg = package_value("L_pkg", params.l_pkg, NOMINAL_L_PKG, warnings);
    let r_pkg = package_value("R_pkg", params.r_pkg, NOMINAL_R_PKG, warnings);

    let mut b = TextBuilder::new();
    for warning in &warnings[first_new..] {
        b = b.comment(format!("WARNING: {}", warning));
    }

    b.param("C_pkg", num(c_pkg))
        .param("L_pkg", num(l_pkg))
        .param("R_pkg", num(r_pkg))
        .param("C_comp", num(params.c_comp))
        .param("V_supply", num(params.v_supply))
        .build()
}

/// Package and die network between `pin` and the die node.
pub fn rlc_network(pin: &str) -> String {
    TextBuilder::new()
        .line(format!("R1 {} {} {{R_pkg}}", pin, MID))
        .line(format!("L1 {} {} {{L_pkg}}", DIE, MID))
        .line(format!("C1 {} 0 {{C_pkg}}", pin))
        .line(format!("C2 {} 0 {{C_comp}}", DIE))
        .line(format!("V1 {} 0 {{V_supply}}", VCC))
        .build()
}

/// `v1, i1, v2, i2, ...` for a behavioral source table.
pub fn table_pairs(rows: &[(f64, f64)]) -> String {
    rows.iter()
        .map(|(v, i)| format!("{}, {}", num(*v), num(*i)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn table_source(name: &str, to: &str, rows: &[(f64, f64)], scale: Option<&str>) -> String {
    let table = format!("table(V({}), {})", DIE, table_pairs(rows));
    match scale {
        Some(k) => format!("{} {} {} I={{V({})*{}}}", name, DIE, to, k, table),
        None => format!("{} {} {} I={}", name, DIE, to, table),
    }
}

/// Power and ground clamp current sources.
pub fn clamp_sources(model: &DataModel, params: &ResolvedParameters) -> String {
    let corner = params.corner;
    let mut b = TextBuilder::new();

    if let Some(clamp) = &model.iv_pwr_clamp {
        let rows = ground_referenced_table(clamp, params.pwr_clamp_ref, true, corner);
        b = b.line(table_source("B1", VCC, &rows, None));
    }
    if let Some(clamp) = &model.iv_gnd_clamp {
        let rows = ground_referenced_table(clamp, params.gnd_clamp_ref, false, corner);
        b = b.line(table_source("B2", "0", &rows, None));
    }
    b.build()
}

/// Device table after clamp adjustment, ready for serialization.
fn adjusted(device: &IvCurve, clamp: Option<&IvCurve>) -> IvCurve {
    match clamp {
        Some(clamp) => adjust_device_data(device, clamp),
        None => device.clone(),
    }
}

/// Pullup and pulldown sources scaled by the `KU` and `KD` control nodes.
pub fn device_sources(model: &DataModel, params: &ResolvedParameters) -> String {
    let corner = params.corner;
    let mut b = TextBuilder::new();

    if let Some(pullup) = &model.iv_pullup {
        let table = adjusted(pullup, model.iv_pwr_clamp.as_ref());
        let rows = ground_referenced_table(&table, params.pullup_ref, true, corner);
        b = b.line(table_source("B3", VCC, &rows, Some("KU")));
    }
    if let Some(pulldown) = &model.iv_pulldown {
        let table = adjusted(pulldown, model.iv_gnd_clamp.as_ref());
        let rows = ground_referenced_table(&table, params.pulldown_ref, false, corner);
        b = b.line(table_source("B4", "0", &rows, Some("KD")));
    }
    b.build()
}
