//! Writing rendered subcircuits to disk.

use crate::document::render;
use crate::report::EmitReport;
use lib_convert::{ConversionRequest, ConvertError, ConvertResult, DataModel};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Convert `model` for `request` and write the netlist to `path`.
///
/// Everything is computed before the file is created, so a rejected request
/// or a failed solve leaves no output behind. A write failure may leave a
/// partial file.
pub fn generate_spice_model(
    model: &DataModel,
    request: &ConversionRequest,
    path: &Path,
) -> ConvertResult<EmitReport> {
    let (text, report) = render(model, request)?;

    let file_write = |source| ConvertError::FileWrite {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(file_write)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(text.as_bytes()).map_err(file_write)?;
    writer.flush().map_err(file_write)?;

    tracing::info!(
        "Wrote {} {} model to {:?} ({} warnings)",
        request.corner,
        request.direction,
        path,
        report.warnings.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_convert::{Dialect, PinDirection};
    use lib_ibis::ModelType;
    use lib_types::{Corner, IvCurve, ParameterTriple};

    fn input_model() -> DataModel {
        let mut model = DataModel::new("CHIP", "RX", ModelType::Input).unwrap();
        model.c_comp = Some(ParameterTriple::uniform(2e-12));
        model.v_range = Some(ParameterTriple::uniform(3.3));
        model.iv_gnd_clamp = Some(IvCurve::from_rows(&[(-1.0, -0.1, -0.1, -0.1), (0.0, 0.0, 0.0, 0.0)]));
        model
    }

    #[test]
    fn test_writes_rendered_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("RX-Typical-input.sub");
        let request = ConversionRequest::new(PinDirection::Input, Dialect::Generic, Corner::Typical);

        let report = generate_spice_model(&input_model(), &request, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        let (expected, _) = render(&input_model(), &request).unwrap();

        assert_eq!(written, expected);
        // No package in the model, so all three parasitics are substituted
        assert_eq!(report.warnings.len(), 3);
    }

    #[test]
    fn test_rejected_request_creates_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("RX-Typical-output.sub");
        let request = ConversionRequest::new(PinDirection::Output, Dialect::LtSpice, Corner::Typical);

        let result = generate_spice_model(&input_model(), &request, &path);
        assert!(matches!(result, Err(ConvertError::IoTypeMismatch { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn test_unwritable_path_is_file_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("RX.sub");
        let request = ConversionRequest::new(PinDirection::Input, Dialect::Generic, Corner::Typical);

        let result = generate_spice_model(&input_model(), &request, &path);
        assert!(matches!(result, Err(ConvertError::FileWrite { .. })));
    }
}
