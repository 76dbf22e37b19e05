//! Conversion job configuration loading and validation.

use anyhow::{Context, Result};
use lib_convert::{
    ConversionRequest, Dialect, PinDirection, SingularPolicy, StimulusSettings, DEFAULT_THRESHOLD,
};
use lib_types::Corner;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One IBIS model converted at one or more corners.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JobConfig {
    /// Path to the .ibs file, relative to the job file.
    pub ibis: PathBuf,

    /// Component providing the package parasitics.
    pub component: String,

    /// Buffer model to convert.
    pub model: String,

    pub direction: PinDirection,

    #[serde(default)]
    pub dialect: Dialect,

    /// Corners to generate; one file each.
    #[serde(default = "default_corners")]
    pub corners: Vec<Corner>,

    /// Default instance parameters of output models.
    #[serde(default)]
    pub stimulus: StimulusSettings,

    #[serde(default = "default_threshold")]
    pub compression_threshold: f64,

    #[serde(default)]
    pub singular_policy: SingularPolicy,
}

fn default_corners() -> Vec<Corner> { vec![Corner::Typical] }
fn default_threshold() -> f64 { DEFAULT_THRESHOLD }

impl JobConfig {
    /// Request for one corner of this job.
    pub fn request(&self, corner: Corner) -> ConversionRequest {
        ConversionRequest {
            stimulus: self.stimulus,
            compression_threshold: self.compression_threshold,
            singular_policy: self.singular_policy,
            ..ConversionRequest::new(self.direction, self.dialect, corner)
        }
    }
}

/// Load a job from a TOML or JSON file.
pub fn load_config(path: &Path) -> Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: JobConfig = if path.extension().map_or(false, |e| e == "json") {
        serde_json::from_str(&content)
            .with_context(|| "Failed to parse config as JSON")?
    } else {
        // Assume TOML
        toml::from_str(&content)
            .with_context(|| "Failed to parse config as TOML")?
    };

    if config.ibis.is_relative() {
        if let Some(dir) = path.parent() {
            config.ibis = dir.join(&config.ibis);
        }
    }

    validate_config(&config)?;

    Ok(config)
}

/// Validate a job before any model is loaded.
fn validate_config(config: &JobConfig) -> Result<()> {
    if !config.ibis.exists() {
        anyhow::bail!("IBIS file not found: {:?}", config.ibis);
    }

    if config.corners.is_empty() {
        anyhow::bail!("At least one corner must be listed");
    }

    if !(config.compression_threshold >= 0.0) {
        anyhow::bail!(
            "Compression threshold must be non-negative, got {}",
            config.compression_threshold
        );
    }

    if config.direction == PinDirection::Output {
        config
            .stimulus
            .validate()
            .with_context(|| "Invalid stimulus settings")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_convert::StimulusMode;
    use std::fs;

    fn job_dir(job_name: &str, job: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("buffer.ibs"), "[IBIS Ver] 5.0\n[End]\n").unwrap();
        let path = dir.path().join(job_name);
        fs::write(&path, job).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_toml_job() {
        let (_dir, path) = job_dir(
            "job.toml",
            r#"
ibis = "buffer.ibs"
component = "CHIP"
model = "DQ"
direction = "output"
dialect = "ltspice"
corners = ["typical", "fast-strong"]
singular_policy = "skip"

[stimulus]
mode = "rising-edge"
freq = 50e6
"#,
        );

        let config = load_config(&path).unwrap();
        assert!(config.ibis.is_absolute());
        assert_eq!(config.corners, vec![Corner::Typical, Corner::FastStrong]);
        assert_eq!(config.dialect, Dialect::LtSpice);
        assert_eq!(config.compression_threshold, DEFAULT_THRESHOLD);

        let request = config.request(Corner::FastStrong);
        assert_eq!(request.corner, Corner::FastStrong);
        assert_eq!(request.singular_policy, SingularPolicy::Skip);
        assert_eq!(request.stimulus.mode, StimulusMode::RisingEdge);
        assert_eq!(request.stimulus.freq.0, 50e6);
        assert_eq!(request.stimulus.duty, 0.5);
    }

    #[test]
    fn test_load_json_job() {
        let (_dir, path) = job_dir(
            "job.json",
            r#"{"ibis": "buffer.ibs", "component": "CHIP", "model": "RX", "direction": "input"}"#,
        );

        let config = load_config(&path).unwrap();
        assert_eq!(config.direction, PinDirection::Input);
        assert_eq!(config.corners, vec![Corner::Typical]);
        assert_eq!(config.dialect, Dialect::Generic);
    }

    #[test]
    fn test_rejects_invalid_jobs() {
        let base = "ibis = \"buffer.ibs\"\ncomponent = \"C\"\nmodel = \"M\"\ndirection = \"output\"\n";

        let (_dir, path) = job_dir("job.toml", &format!("{}corners = []\n", base));
        assert!(load_config(&path).is_err());

        let (_dir, path) = job_dir("job.toml", &format!("{}[stimulus]\nduty = 1.5\n", base));
        assert!(load_config(&path).is_err());

        let (_dir, path) = job_dir("job.toml", &base.replace("buffer.ibs", "absent.ibs"));
        assert!(load_config(&path).is_err());
    }
}
