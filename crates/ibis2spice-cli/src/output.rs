//! Summary and k-parameter output formatting.

use crate::orchestrator::JobResults;
use crate::OutputFormat;
use anyhow::Result;
use lib_types::KParameterWaveform;
use std::io::Write;
use std::path::Path;

/// Write the job summary into `output_dir` and return its path.
pub fn write_summary(results: &JobResults, output_dir: &Path, format: OutputFormat) -> Result<std::path::PathBuf> {
    let extension = match format {
        OutputFormat::Text => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Csv => "csv",
    };
    let summary_path = output_dir.join(format!("summary.{}", extension));
    let mut f = std::io::BufWriter::new(std::fs::File::create(&summary_path)?);

    match format {
        OutputFormat::Text => {
            writeln!(f, "ibis2spice Conversion Summary")?;
            writeln!(f, "=============================")?;
            writeln!(f)?;
            writeln!(f, "Component: {}", results.component)?;
            writeln!(f, "Model:     {}", results.model)?;
            writeln!(f, "Direction: {}", results.direction)?;

            for corner in &results.corners {
                writeln!(f)?;
                writeln!(f, "{}: {:?}", corner.corner, corner.path)?;
                for warning in &corner.report.warnings {
                    writeln!(f, "  warning: {}", warning)?;
                }
                if !corner.report.skipped.is_empty() {
                    writeln!(f, "  skipped samples: {}", corner.report.skipped.len())?;
                }
            }
        }
        OutputFormat::Json => {
            writeln!(f, "{}", serde_json::to_string_pretty(results)?)?;
        }
        OutputFormat::Csv => {
            writeln!(f, "corner,path,warnings,skipped")?;
            for corner in &results.corners {
                writeln!(
                    f,
                    "{},{},{},{}",
                    corner.corner,
                    corner.path.display(),
                    corner.report.warnings.len(),
                    corner.report.skipped.len()
                )?;
            }
        }
    }
    f.flush()?;

    tracing::info!("Wrote summary to {:?}", summary_path);
    Ok(summary_path)
}

/// Print a short job summary to stdout.
pub fn print_summary(results: &JobResults) {
    println!("\n=== {} / {} ({}) ===\n", results.component, results.model, results.direction);

    for corner in &results.corners {
        let status = if corner.report.is_clean() { "ok" } else { "with warnings" };
        println!("  {:<12} {} [{}]", corner.corner.label(), corner.path.display(), status);
    }

    println!();
}

/// Write k-parameter samples as a table.
pub fn write_k_params<W: Write>(sink: &mut W, k: &KParameterWaveform, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            if k.is_open_drain() {
                writeln!(sink, "{:>14} {:>12}", "time", "k_d")?;
            } else {
                writeln!(sink, "{:>14} {:>12} {:>12}", "time", "k_u", "k_d")?;
            }
            for row in k.rows() {
                let line: Vec<String> = row
                    .iter()
                    .enumerate()
                    .map(|(i, v)| if i == 0 { format!("{:>14.6e}", v) } else { format!("{:>12.6}", v) })
                    .collect();
                writeln!(sink, "{}", line.join(" "))?;
            }
        }
        OutputFormat::Json => {
            writeln!(sink, "{}", serde_json::to_string_pretty(k)?)?;
        }
        OutputFormat::Csv => {
            if k.is_open_drain() {
                writeln!(sink, "time,k_d")?;
            } else {
                writeln!(sink, "time,k_u,k_d")?;
            }
            for row in k.rows() {
                let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
                writeln!(sink, "{}", line.join(","))?;
            }
        }
    }
    Ok(())
}
