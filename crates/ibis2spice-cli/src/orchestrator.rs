//! Job orchestration: load the model once, then generate every corner.

use crate::config::JobConfig;
use anyhow::{Context, Result};
use lib_convert::{DataModel, PinDirection};
use lib_subckt::{generate_spice_model, EmitReport};
use lib_types::Corner;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Parse `path` and assemble the named model.
pub fn load_model(path: &Path, component: &str, model: &str) -> Result<DataModel> {
    let ibis = lib_ibis::parse_ibs_path(path)
        .with_context(|| format!("Failed to load IBIS file: {:?}", path))?;

    DataModel::from_ibis(&ibis, component, model)
        .with_context(|| format!("Cannot build model from {:?}", path))
}

/// `<model>-<corner>-<direction>.sub`
pub fn output_file_name(model: &str, corner: Corner, direction: PinDirection) -> String {
    format!("{}-{}-{}.sub", model, corner.label(), direction)
}

/// One generated file.
#[derive(Clone, Debug, Serialize)]
pub struct CornerResult {
    pub corner: Corner,
    pub path: PathBuf,
    pub report: EmitReport,
}

/// Everything produced by a job.
#[derive(Clone, Debug, Serialize)]
pub struct JobResults {
    pub component: String,
    pub model: String,
    pub direction: PinDirection,
    pub corners: Vec<CornerResult>,
}

/// Job orchestrator.
pub struct Orchestrator {
    config: JobConfig,
    model: DataModel,
}

impl Orchestrator {
    /// Load the job's model.
    pub fn new(config: JobConfig) -> Result<Self> {
        let model = load_model(&config.ibis, &config.component, &config.model)?;
        tracing::info!("Loaded model {} from {:?}", model.model_name, config.ibis);
        Ok(Self { config, model })
    }

    pub fn model(&self) -> &DataModel {
        &self.model
    }

    /// Generate every corner into `output_dir`.
    ///
    /// All requests are checked against the model before any file is
    /// created; corners then run in parallel.
    pub fn run(&self, output_dir: &Path) -> Result<JobResults> {
        for corner in &self.config.corners {
            self.config
                .request(*corner)
                .validate(&self.model)
                .with_context(|| format!("Invalid request for {} corner", corner))?;
        }

        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

        let corners = self
            .config
            .corners
            .par_iter()
            .map(|&corner| self.run_corner(corner, output_dir))
            .collect::<Result<Vec<_>>>()?;

        Ok(JobResults {
            component: self.model.component_name.clone(),
            model: self.model.model_name.clone(),
            direction: self.config.direction,
            corners,
        })
    }

    fn run_corner(&self, corner: Corner, output_dir: &Path) -> Result<CornerResult> {
        let request = self.config.request(corner);
        let path = output_dir.join(output_file_name(
            &self.model.model_name,
            corner,
            request.direction,
        ));

        tracing::debug!("Generating {} corner into {:?}", corner, path);
        let report = generate_spice_model(&self.model, &request, &path)
            .with_context(|| format!("Conversion failed at {} corner", corner))?;

        Ok(CornerResult {
            corner,
            path,
            report,
        })
    }
}
