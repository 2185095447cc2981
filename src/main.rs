use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use rosterclean::core::model::ImageId;
use rosterclean::export::{render_table, ExportFormat};
use rosterclean::ocr::cropper::DEFAULT_GEOMETRY;
use rosterclean::ocr::{
    EasyOcrBridge, ImageCropper, LineSource, MagickCropper, TesseractSource, TextFileSource,
};
use rosterclean::pipeline::{export_report, ImageInput};
use rosterclean::{Report, RosterConfig, RosterPipeline};

#[derive(Parser, Debug)]
#[command(name = "rosterclean")]
#[command(version, about = "Extract player names and power levels from roster screenshots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Crop, OCR and clean a batch of screenshots
    Process {
        /// Screenshot files (up to 16 by default)
        images: Vec<PathBuf>,

        /// OCR engine
        #[arg(short, long, value_enum, default_value_t = Engine::Easyocr)]
        engine: Engine,

        /// ImageMagick crop geometry for the roster region
        #[arg(long, default_value = DEFAULT_GEOMETRY)]
        crop: String,

        /// Images are already cropped
        #[arg(long)]
        no_crop: bool,

        /// Path to the EasyOCR bridge script
        #[arg(long)]
        bridge_script: Option<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Clean OCR text that was already extracted (one file per image)
    Parse {
        /// Text files, one OCR line per line
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Print the default configuration as JSON
    Config,
}

#[derive(clap::Args, Debug)]
struct CommonArgs {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format(s) to generate
    #[arg(short, long, value_enum, value_delimiter = ',', default_values_t = vec![Format::Csv, Format::Text])]
    format: Vec<Format>,

    /// Output directory (default: ./roster_output)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Do not print progress or the result table
    #[arg(short, long)]
    quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum Engine {
    Easyocr,
    Tesseract,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum Format {
    Csv,
    Json,
    Text,
    Html,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Csv => ExportFormat::Csv,
            Format::Json => ExportFormat::Json,
            Format::Text => ExportFormat::Text,
            Format::Html => ExportFormat::Html,
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Process {
            images,
            engine,
            crop,
            no_crop,
            bridge_script,
            common,
        } => process_images(images, engine, crop, no_crop, bridge_script, common),
        Commands::Parse { inputs, common } => parse_texts(inputs, common),
        Commands::Config => show_config(),
    }
}

fn load_config(path: Option<&Path>) -> Result<RosterConfig> {
    match path {
        Some(path) => RosterConfig::from_file(path),
        None => Ok(RosterConfig::default()),
    }
}

fn output_dir(common: &CommonArgs) -> PathBuf {
    common
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from("roster_output"))
}

fn validate_inputs(inputs: &[PathBuf]) -> Result<()> {
    if inputs.is_empty() {
        anyhow::bail!("No input files specified");
    }
    for input in inputs {
        if !input.is_file() {
            anyhow::bail!("Input is not a file: {}", input.display());
        }
    }
    Ok(())
}

fn process_images(
    images: Vec<PathBuf>,
    engine: Engine,
    crop: String,
    no_crop: bool,
    bridge_script: Option<PathBuf>,
    common: CommonArgs,
) -> Result<()> {
    validate_inputs(&images)?;
    let config = load_config(common.config.as_deref())?;
    let pipeline = RosterPipeline::new(config).context("Invalid configuration")?;

    let output_dir = output_dir(&common);

    if !common.quiet {
        println!("[*] Processing {} image(s)", images.len());
        println!("[*] Output: {}", output_dir.display());
    }

    let source: Box<dyn LineSource> = match engine {
        Engine::Easyocr => {
            let bridge = EasyOcrBridge::new();
            Box::new(match bridge_script {
                Some(script) => bridge.with_script(script),
                None => bridge,
            })
        }
        Engine::Tesseract => Box::new(TesseractSource::new()),
    };
    let magick = MagickCropper::new(output_dir.join("cropped")).with_geometry(crop);
    let cropper: Option<&dyn ImageCropper> = if no_crop { None } else { Some(&magick) };

    if !common.quiet {
        println!("\n[+] Running {} OCR...", source.name());
    }

    let report = pipeline.process_images(&images, source.as_ref(), cropper)?;
    finish(&report, &output_dir, &common)
}

fn parse_texts(inputs: Vec<PathBuf>, common: CommonArgs) -> Result<()> {
    validate_inputs(&inputs)?;
    let config = load_config(common.config.as_deref())?;
    let pipeline = RosterPipeline::new(config).context("Invalid configuration")?;
    let output_dir = output_dir(&common);

    let source = TextFileSource::new();
    let batch = inputs
        .iter()
        .enumerate()
        .map(|(ordinal, path)| {
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            let image = ImageId::new(ordinal, name);
            let lines = source.extract_lines(&image, path);
            ImageInput { image, lines }
        })
        .collect();

    let report = pipeline.process_lines(batch)?;
    finish(&report, &output_dir, &common)
}

fn finish(report: &Report, output_dir: &Path, common: &CommonArgs) -> Result<()> {
    let formats: Vec<ExportFormat> = common.format.iter().map(|f| (*f).into()).collect();
    export_report(report, output_dir, &formats)
        .with_context(|| format!("Failed to export to: {}", output_dir.display()))?;

    if !common.quiet {
        let summary = report.summary();
        println!("\n{}", render_table(report));
        println!(
            "[*] Players: {}, suspect: {}, lines for review: {}",
            summary.total_players,
            summary.flagged_players,
            report.review.len()
        );
        println!("[✓] Done! Results saved to: {}", output_dir.display());
    }

    if report.records.is_empty() {
        eprintln!("[!] No player data could be extracted");
    }
    Ok(())
}

fn show_config() -> Result<()> {
    let json = serde_json::to_string_pretty(&RosterConfig::default())?;
    println!("{json}");
    Ok(())
}
