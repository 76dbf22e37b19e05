//! ibis2spice CLI: behavioral SPICE subcircuits from IBIS buffer models.
//!
//! This is the main entry point for the ibis2spice tool.

mod config;
mod orchestrator;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lib_convert::compress::compress_or_endpoints;
use lib_convert::{
    solve_k_params, ConversionRequest, Dialect, PinDirection, SingularPolicy, StimulusMode,
    DEFAULT_THRESHOLD,
};
use lib_types::{Corner, Edge, Hertz, Seconds};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "ibis2spice")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format for summaries and k-parameter tables
    #[arg(short, long, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum DirectionArg {
    Input,
    Output,
}

impl From<DirectionArg> for PinDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Input => PinDirection::Input,
            DirectionArg::Output => PinDirection::Output,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum DialectArg {
    #[default]
    Generic,
    Ltspice,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Generic => Dialect::Generic,
            DialectArg::Ltspice => Dialect::LtSpice,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum EdgeArg {
    Rising,
    Falling,
}

impl From<EdgeArg> for Edge {
    fn from(arg: EdgeArg) -> Self {
        match arg {
            EdgeArg::Rising => Edge::Rising,
            EdgeArg::Falling => Edge::Falling,
        }
    }
}

fn parse_corner(s: &str) -> Result<Corner, String> {
    Corner::from_label(s).ok_or_else(|| format!("unknown corner '{}' (typical, weak-slow, fast-strong)", s))
}

fn parse_stimulus(s: &str) -> Result<StimulusMode, String> {
    if let Ok(index) = s.parse::<u8>() {
        return StimulusMode::ALL
            .into_iter()
            .find(|m| m.index() == index)
            .ok_or_else(|| format!("stimulus index {} out of range 0-5", index));
    }
    StimulusMode::ALL
        .into_iter()
        .find(|m| m.description().replace(' ', "-").eq_ignore_ascii_case(s))
        .ok_or_else(|| format!("unknown stimulus '{}'", s))
}

/// Model selection shared by the per-model commands.
#[derive(clap::Args)]
struct ModelArgs {
    /// Path to the .ibs file
    file: PathBuf,

    /// Component name
    #[arg(short, long)]
    component: String,

    /// Model name
    #[arg(short, long)]
    model: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a conversion job file
    Convert {
        /// Path to the job configuration (TOML or JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Output directory for generated subcircuits
        #[arg(short, long, default_value = "output")]
        output: PathBuf,
    },

    /// Generate one subcircuit
    Generate {
        #[command(flatten)]
        target: ModelArgs,

        /// Pin direction to model
        #[arg(short, long)]
        direction: DirectionArg,

        /// Netlist dialect
        #[arg(long, default_value = "generic")]
        dialect: DialectArg,

        /// Process corner
        #[arg(long, default_value = "typical", value_parser = parse_corner)]
        corner: Corner,

        /// Default stimulus (index 0-5 or name, e.g. rising-edge)
        #[arg(long, default_value = "oscillate", value_parser = parse_stimulus)]
        stimulus: StimulusMode,

        /// Default oscillation frequency (MHz)
        #[arg(long, default_value = "10")]
        freq_mhz: f64,

        /// Default duty cycle
        #[arg(long, default_value = "0.5")]
        duty: f64,

        /// Default edge delay (ns)
        #[arg(long, default_value = "10")]
        delay_ns: f64,

        /// Drop unsolvable k-parameter samples instead of failing
        #[arg(long)]
        skip_singular: bool,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Parse and validate an IBIS file
    ParseIbis {
        /// Path to the .ibs file
        file: PathBuf,
    },

    /// Show the assembled data for one model
    Inspect {
        #[command(flatten)]
        target: ModelArgs,
    },

    /// Solve and print k-parameters for one edge
    Kparams {
        #[command(flatten)]
        target: ModelArgs,

        /// Switching edge
        #[arg(short, long, default_value = "rising")]
        edge: EdgeArg,

        /// Process corner
        #[arg(long, default_value = "typical", value_parser = parse_corner)]
        corner: Corner,

        /// Compression threshold; 0 keeps every changing sample
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f64,

        /// Print the solved samples without compression
        #[arg(long)]
        raw: bool,

        /// Drop unsolvable samples instead of failing
        #[arg(long)]
        skip_singular: bool,

        /// Output file path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match cli.command {
        Commands::Convert { config, output } => {
            run_job(&config, &output, cli.format)?;
        }
        Commands::Generate {
            target,
            direction,
            dialect,
            corner,
            stimulus,
            freq_mhz,
            duty,
            delay_ns,
            skip_singular,
            output,
        } => {
            let mut request = ConversionRequest::new(direction.into(), dialect.into(), corner);
            request.stimulus.mode = stimulus;
            request.stimulus.freq = Hertz::from_mhz(freq_mhz);
            request.stimulus.duty = duty;
            request.stimulus.delay = Seconds::from_ns(delay_ns);
            request.singular_policy = policy(skip_singular);
            generate(&target, &request, &output)?;
        }
        Commands::ParseIbis { file } => {
            parse_ibis(&file)?;
        }
        Commands::Inspect { target } => {
            let model = orchestrator::load_model(&target.file, &target.component, &target.model)?;
            print!("{}", model);
        }
        Commands::Kparams {
            target,
            edge,
            corner,
            threshold,
            raw,
            skip_singular,
            output,
        } => {
            let options = KparamOptions {
                edge: edge.into(),
                corner,
                threshold: if raw { None } else { Some(threshold) },
                policy: policy(skip_singular),
            };
            k_params(&target, &options, output.as_deref(), cli.format)?;
        }
    }

    Ok(())
}

fn policy(skip_singular: bool) -> SingularPolicy {
    if skip_singular {
        SingularPolicy::Skip
    } else {
        SingularPolicy::Reject
    }
}

fn run_job(config_path: &Path, output_dir: &Path, format: OutputFormat) -> Result<()> {
    tracing::info!("Loading configuration from {:?}", config_path);

    let config = config::load_config(config_path)?;
    let orchestrator = orchestrator::Orchestrator::new(config)?;

    tracing::info!("Converting {}...", orchestrator.model().model_name);
    let results = orchestrator.run(output_dir)?;

    output::write_summary(&results, output_dir, format)?;
    output::print_summary(&results);

    tracing::info!("Conversion complete. Results written to {:?}", output_dir);
    Ok(())
}

fn generate(target: &ModelArgs, request: &ConversionRequest, output: &Path) -> Result<()> {
    let model = orchestrator::load_model(&target.file, &target.component, &target.model)?;
    let report = lib_subckt::generate_spice_model(&model, request, output)?;

    println!("Wrote {:?}", output);
    if request.direction == PinDirection::Output {
        let stimulus = &request.stimulus;
        println!(
            "  default stimulus: {} at {:.3} MHz, duty {}, delay {:.3} ns",
            stimulus.mode.description(),
            stimulus.freq.as_mhz(),
            stimulus.duty,
            stimulus.delay.as_ns()
        );
    }
    for warning in &report.warnings {
        println!("  warning: {}", warning);
    }
    if !report.skipped.is_empty() {
        println!("  skipped {} unsolvable samples", report.skipped.len());
    }
    Ok(())
}

fn parse_ibis(file: &Path) -> Result<()> {
    tracing::info!("Parsing IBIS file: {:?}", file);

    let ibis = lib_ibis::parse_ibs_path(file)
        .with_context(|| format!("Failed to load IBIS file: {:?}", file))?;

    println!("IBIS File: {}", ibis.header.file_name);
    println!("Version: {}", ibis.header.ibis_ver);
    println!("Source: {}", ibis.header.source);
    println!("Components: {}", ibis.components.len());
    println!("Models: {}", ibis.models.len());

    for component in &ibis.components {
        println!("\n  Component: {}", component.name);
        println!("    Pins: {}", component.pins.len());
    }

    for model in &ibis.models {
        println!("\n  Model: {}", model.name);
        println!("    Type: {}", model.model_type_name);
        println!(
            "    Waveforms: {} rising, {} falling",
            model.rising_waveforms.len(),
            model.falling_waveforms.len()
        );
    }

    Ok(())
}

struct KparamOptions {
    edge: Edge,
    corner: Corner,
    /// `None` prints the uncompressed solve.
    threshold: Option<f64>,
    policy: SingularPolicy,
}

fn k_params(
    target: &ModelArgs,
    options: &KparamOptions,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let model = orchestrator::load_model(&target.file, &target.component, &target.model)?;

    let outcome = solve_k_params(&model, options.corner, options.edge)?.checked(options.policy)?;

    let k = match options.threshold {
        Some(threshold) => compress_or_endpoints(&outcome.waveform, threshold),
        None => outcome.waveform,
    };

    match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create {:?}", path))?;
            let mut writer = std::io::BufWriter::new(file);
            output::write_k_params(&mut writer, &k, format)?;
            std::io::Write::flush(&mut writer)?;
            tracing::info!("Wrote {} samples to {:?}", k.len(), path);
        }
        None => {
            let stdout = std::io::stdout();
            output::write_k_params(&mut stdout.lock(), &k, format)?;
        }
    }

    Ok(())
}
