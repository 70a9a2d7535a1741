//! ridgepeak Command-Line Interface
//!
//! This CLI provides tools for:
//! - Detecting peaks in two-column data files
//! - Exporting traced ridge lines for plotting
//! - Generating synthetic spectra with known peaks
//! - Managing stored threshold presets

use anyhow::{bail, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use ridgepeak_core::{
    DetectorConfig, Peak, PeakFinder, PeakParams, PresetBook, RidgeStatus, ScaleMode,
};
use ridgepeak_sim::{NoiseConfig, SpectrumConfig, SpectrumGenerator};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "ridgepeak")]
#[command(author, version, about = "Wavelet ridge peak finder", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect peaks in a column data file
    Find {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        detector: DetectorArgs,

        #[command(flatten)]
        thresholds: ThresholdArgs,

        /// Report intensities on top of the local background
        #[arg(long)]
        background: bool,

        /// Also print how many ridges each filter rejected
        #[arg(long)]
        analyze: bool,

        /// Output format: text, json, csv
        #[arg(long, short = 'o', default_value = "text")]
        output_format: String,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Export traced ridge lines with their filter status
    Ridges {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        detector: DetectorArgs,

        #[command(flatten)]
        thresholds: ThresholdArgs,

        /// Only export ridges that produced a peak
        #[arg(long)]
        peaks_only: bool,

        /// Output format: csv, json
        #[arg(long, short = 'o', default_value = "csv")]
        output_format: String,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Generate a synthetic spectrum as two columns
    #[command(allow_negative_numbers = true)]
    Simulate {
        /// Spectrum configuration (JSON); overrides --scenario
        #[arg(long)]
        config: Option<PathBuf>,

        /// Built-in scenario: five, shoulder
        #[arg(long, default_value = "five")]
        scenario: String,

        /// Number of samples
        #[arg(long)]
        points: Option<usize>,

        /// Gaussian noise sigma
        #[arg(long)]
        noise: Option<f64>,

        /// RNG seed for reproducible noise
        #[arg(long)]
        seed: Option<u64>,

        /// Write the effective configuration as JSON to this file
        #[arg(long)]
        save_config: Option<PathBuf>,

        /// Output file (stdout if not specified)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// List the presets in a preset file, or create one
    Presets {
        /// Preset file (JSON)
        #[arg(long)]
        file: PathBuf,

        /// Write a file with default presets
        #[arg(long)]
        init: bool,

        /// Overwrite an existing file with --init
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Data file and column selection
#[derive(Args)]
struct InputArgs {
    /// Input file with whitespace, tab or comma separated columns
    #[arg(short, long)]
    input: PathBuf,

    /// Column holding x (0-based)
    #[arg(long, default_value = "0")]
    x_col: usize,

    /// Column holding y (0-based)
    #[arg(long, default_value = "1")]
    y_col: usize,
}

/// Construction-time detector settings
#[derive(Args)]
struct DetectorArgs {
    /// Detector configuration (JSON); flags below override it
    #[arg(long)]
    detector_config: Option<PathBuf>,

    /// Scales per octave
    #[arg(long)]
    resolution: Option<usize>,

    /// Scale spacing: log, linear
    #[arg(long)]
    scale_mode: Option<String>,

    /// Rows a ridge may skip before it stops growing
    #[arg(long)]
    max_gap: Option<usize>,

    /// Local maximum window in samples
    #[arg(long)]
    window: Option<usize>,

    /// Noise floor as a fraction of the global noise level
    #[arg(long)]
    noise_level: Option<f64>,
}

/// Extraction thresholds
#[derive(Args)]
#[command(next_help_heading = "Thresholds")]
struct ThresholdArgs {
    /// Preset file to take thresholds from (see `presets`)
    #[arg(long, requires = "preset")]
    presets: Option<PathBuf>,

    /// Preset slot (1-5) in the preset file
    #[arg(long, requires = "presets")]
    preset: Option<usize>,

    /// Minimum signal-to-noise ratio
    #[arg(long)]
    snr: Option<f64>,

    /// Minimum peak width in x units
    #[arg(long)]
    min_width: Option<f64>,

    /// Maximum peak width in x units
    #[arg(long)]
    max_width: Option<f64>,

    /// Minimum ridge length
    #[arg(long)]
    ridge_length: Option<usize>,

    /// Recover shoulder peaks with shorter ridges
    #[arg(long)]
    double_peaks: bool,

    /// Ridge length accepted for shoulder peaks
    #[arg(long)]
    reduced_ridge_length: Option<usize>,
}

/// Read x and y from a text file with one sample per line.
///
/// Blank lines and lines starting with `#` or `;` are skipped. Fields are
/// separated by whitespace or commas.
fn read_columns(path: &Path, x_col: usize, y_col: usize) -> Result<(Vec<f64>, Vec<f64>)> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file {:?}", path))?;
    parse_columns(&text, x_col, y_col).with_context(|| format!("Failed to parse {:?}", path))
}

fn parse_columns(text: &str, x_col: usize, y_col: usize) -> Result<(Vec<f64>, Vec<f64>)> {
    let mut x = Vec::new();
    let mut y = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        let fields: Vec<&str> = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|f| !f.is_empty())
            .collect();
        let field = |col: usize| -> Result<f64> {
            let raw = fields.get(col).with_context(|| {
                format!("line {}: no column {} ({} fields)", line_no + 1, col, fields.len())
            })?;
            raw.parse::<f64>()
                .with_context(|| format!("line {}: '{}' is not a number", line_no + 1, raw))
        };
        x.push(field(x_col)?);
        y.push(field(y_col)?);
    }

    if x.is_empty() {
        bail!("no data rows found");
    }
    Ok((x, y))
}

fn write_output(text: &str, output: Option<&Path>, what: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("Failed to write {:?}", path))?;
            println!("{} written to {:?}", what, path);
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {:?}", path))
}

impl DetectorArgs {
    fn to_config(&self) -> Result<DetectorConfig> {
        let mut config = match &self.detector_config {
            Some(path) => read_json(path)?,
            None => DetectorConfig::default(),
        };
        if let Some(resolution) = self.resolution {
            config.resolution = resolution;
        }
        if let Some(mode) = &self.scale_mode {
            config.scale_mode = match ScaleMode::from_str(mode) {
                Some(mode) => mode,
                None => bail!("Unknown scale mode: '{}'. Use: log, linear", mode),
            };
        }
        if let Some(max_gap) = self.max_gap {
            config.max_gap = max_gap;
        }
        if let Some(window) = self.window {
            config.window = window;
        }
        if let Some(level) = self.noise_level {
            config.minimum_noise_level = level;
        }
        Ok(config)
    }
}

impl ThresholdArgs {
    fn to_params(&self, span: f64) -> Result<PeakParams> {
        let mut params = match (&self.presets, self.preset) {
            (Some(path), Some(slot)) => {
                let book: PresetBook = read_json(path)?;
                let preset = book
                    .get(slot)
                    .with_context(|| format!("No preset {} in {:?}", slot, path))?;
                debug!(slot, ?preset, "using preset");
                preset.to_params(span)
            }
            _ => PeakParams::default(),
        };

        if let Some(snr) = self.snr {
            params.snr = snr;
        }
        if let Some(min_width) = self.min_width {
            params.min_width = Some(min_width);
        }
        if let Some(max_width) = self.max_width {
            params.max_width = Some(max_width);
        }
        if let Some(ridge_length) = self.ridge_length {
            params.ridge_length = ridge_length;
        }
        if self.double_peaks {
            params.double_peak_detection = true;
        }
        if let Some(reduced) = self.reduced_ridge_length {
            params.double_peak_reduced_ridge_length = reduced;
        }
        Ok(params)
    }
}

fn prepare(input: &InputArgs, detector: &DetectorArgs) -> Result<PeakFinder> {
    let (x, y) = read_columns(&input.input, input.x_col, input.y_col)?;
    info!("Read {} samples from {:?}", x.len(), input.input);

    let config = detector.to_config()?;
    let finder = PeakFinder::with_config(&x, &y, config)
        .with_context(|| format!("Failed to prepare peak finder for {:?}", input.input))?;
    info!(
        "Traced {} ridges over {} scales",
        finder.ridges().len(),
        finder.scales().len()
    );
    Ok(finder)
}

/// JSON document written by `find -o json`
#[derive(Serialize)]
struct PeakReport<'a> {
    num_peaks: usize,
    peaks: &'a [Peak],
}

impl<'a> PeakReport<'a> {
    fn new(peaks: &'a [Peak]) -> Self {
        Self {
            num_peaks: peaks.len(),
            peaks,
        }
    }
}

/// Arguments for the find command
struct FindArgs {
    input: InputArgs,
    detector: DetectorArgs,
    thresholds: ThresholdArgs,
    background: bool,
    analyze: bool,
    output_format: String,
    output: Option<PathBuf>,
}

fn cmd_find(args: FindArgs) -> Result<()> {
    let finder = prepare(&args.input, &args.detector)?;
    let params = args.thresholds.to_params(finder.signal().span())?;
    let analysis = finder.analyze(&params);

    let peaks: Vec<Peak> = if args.background {
        analysis
            .peaks
            .iter()
            .map(|p| Peak {
                intensity: p.intensity + finder.background(p),
                ..*p
            })
            .collect()
    } else {
        analysis.peaks.clone()
    };

    let output_text = match args.output_format.as_str() {
        "json" => serde_json::to_string_pretty(&PeakReport::new(&peaks))?,
        "csv" => finder.format_csv(&peaks),
        "text" => finder.format_text(&peaks),
        other => bail!("Unknown output format: '{}'. Use: text, json, csv", other),
    };
    write_output(&output_text, args.output.as_deref(), "Peaks")?;

    if args.analyze {
        eprintln!("Ridges:            {}", finder.ridges().len());
        eprintln!("Rejected (SNR):    {}", analysis.rejected_by_snr.len());
        eprintln!("Rejected (length): {}", analysis.rejected_by_length.len());
        eprintln!("Rejected (width):  {}", analysis.rejected_by_width.len());
        eprintln!(
            "Width range:       {:.4} .. {:.4}",
            analysis.min_width, analysis.max_width
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct RidgeExportPoint {
    scale: f64,
    x: f64,
    coefficient: f64,
}

#[derive(Serialize)]
struct RidgeExport {
    index: usize,
    status: RidgeStatus,
    length: usize,
    position: f64,
    peak_scale: f64,
    peak_amplitude: f64,
    noise: f64,
    snr: f64,
    points: Vec<RidgeExportPoint>,
}

fn collect_ridges(finder: &PeakFinder, params: &PeakParams, peaks_only: bool) -> Vec<RidgeExport> {
    let analysis = finder.analyze(params);
    let x = finder.signal().x();
    let grid = finder.grid();
    let scales = finder.scales();

    finder
        .ridges()
        .iter()
        .zip(finder.scored_ridges())
        .zip(&analysis.statuses)
        .enumerate()
        .filter(|(_, (_, status))| !peaks_only || status.is_peak())
        .map(|(index, ((ridge, scored), &status))| RidgeExport {
            index,
            status,
            length: scored.summary.length,
            position: x[scored.summary.last_sample_index],
            peak_scale: scored.summary.peak_scale,
            peak_amplitude: scored.summary.peak_amplitude,
            noise: scored.noise,
            snr: scored.snr,
            points: ridge
                .points()
                .iter()
                .map(|p| RidgeExportPoint {
                    scale: scales.get(p.scale_index),
                    x: x[p.sample_index],
                    coefficient: grid.value(p.scale_index, p.sample_index),
                })
                .collect(),
        })
        .collect()
}

fn format_ridges_csv(ridges: &[RidgeExport]) -> String {
    let mut output = String::from("ridge,status,snr,scale,x,coefficient\n");
    for ridge in ridges {
        for p in &ridge.points {
            output.push_str(&format!(
                "{},{},{},{},{},{}\n",
                ridge.index,
                ridge.status.as_str(),
                ridge.snr,
                p.scale,
                p.x,
                p.coefficient
            ));
        }
    }
    output
}

/// Arguments for the ridges command
struct RidgesArgs {
    input: InputArgs,
    detector: DetectorArgs,
    thresholds: ThresholdArgs,
    peaks_only: bool,
    output_format: String,
    output: Option<PathBuf>,
}

fn cmd_ridges(args: RidgesArgs) -> Result<()> {
    let finder = prepare(&args.input, &args.detector)?;
    let params = args.thresholds.to_params(finder.signal().span())?;
    let ridges = collect_ridges(&finder, &params, args.peaks_only);
    info!("Exporting {} ridges", ridges.len());

    let output_text = match args.output_format.as_str() {
        "csv" => format_ridges_csv(&ridges),
        "json" => serde_json::to_string_pretty(&ridges)?,
        other => bail!("Unknown output format: '{}'. Use: csv, json", other),
    };
    write_output(&output_text, args.output.as_deref(), "Ridges")
}

/// Arguments for the simulate command
struct SimulateArgs {
    config: Option<PathBuf>,
    scenario: String,
    points: Option<usize>,
    noise: Option<f64>,
    seed: Option<u64>,
    save_config: Option<PathBuf>,
    output: Option<PathBuf>,
}

fn cmd_simulate(args: SimulateArgs) -> Result<()> {
    let mut config: SpectrumConfig = match &args.config {
        Some(path) => read_json(path)?,
        None => match args.scenario.as_str() {
            "five" => SpectrumConfig::five_peaks(),
            "shoulder" => SpectrumConfig::shoulder(),
            other => bail!("Unknown scenario: '{}'. Use: five, shoulder", other),
        },
    };

    if let Some(points) = args.points {
        config.points = points;
    }
    if let Some(sigma) = args.noise {
        let seed = config.noise.seed;
        config.noise = NoiseConfig::gaussian(sigma);
        config.noise.seed = seed;
    }
    if let Some(seed) = args.seed {
        config.noise.seed = Some(seed);
    }
    if config.noise.seed.is_none() {
        warn!("No seed given; noise will differ between runs");
    }

    if let Some(path) = &args.save_config {
        let json = serde_json::to_string_pretty(&config)?;
        fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
        info!("Configuration written to {:?}", path);
    }

    let spectrum = SpectrumGenerator::new(config)?.generate();
    info!("Generated {} samples", spectrum.x.len());
    write_output(&spectrum.to_columns(), args.output.as_deref(), "Spectrum")
}

fn cmd_presets(file: PathBuf, init: bool, force: bool) -> Result<()> {
    if init {
        if file.exists() && !force {
            bail!("{:?} already exists; use --force to overwrite", file);
        }
        let json = serde_json::to_string_pretty(&PresetBook::default())?;
        fs::write(&file, json).with_context(|| format!("Failed to write {:?}", file))?;
        println!("Default presets written to {:?}", file);
        return Ok(());
    }

    let book: PresetBook = read_json(&file)?;
    println!("Peak Presets ({:?})", file);
    println!("{}", "═".repeat(72));
    println!(
        "{:>4}  {:>10}  {:>10}  {:>6}  {:>6}  {:>8}  {:>8}",
        "#", "Min W %", "Max W %", "SNR", "Ridge", "Double", "Reduced"
    );
    println!("{}", "─".repeat(72));
    for (slot, p) in book.iter() {
        println!(
            "{:>4}  {:>10.3}  {:>10.3}  {:>6.2}  {:>6}  {:>8}  {:>8}",
            slot,
            p.min_width_percent,
            p.max_width_percent,
            p.snr,
            p.ridge_length,
            if p.double_peaks { "yes" } else { "no" },
            p.double_peak_ridge_length
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Find {
            input,
            detector,
            thresholds,
            background,
            analyze,
            output_format,
            output,
        } => cmd_find(FindArgs {
            input,
            detector,
            thresholds,
            background,
            analyze,
            output_format,
            output,
        }),

        Commands::Ridges {
            input,
            detector,
            thresholds,
            peaks_only,
            output_format,
            output,
        } => cmd_ridges(RidgesArgs {
            input,
            detector,
            thresholds,
            peaks_only,
            output_format,
            output,
        }),

        Commands::Simulate {
            config,
            scenario,
            points,
            noise,
            seed,
            save_config,
            output,
        } => cmd_simulate(SimulateArgs {
            config,
            scenario,
            points,
            noise,
            seed,
            save_config,
            output,
        }),

        Commands::Presets { file, init, force } => cmd_presets(file, init, force),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
            Ok(())
        }
    }
}
