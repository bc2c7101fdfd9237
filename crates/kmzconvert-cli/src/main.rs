use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use kmzconvert_core::batch::{BatchOutcome, BatchProcessor, BatchStatus};
use kmzconvert_core::metrics::{MetricsConfig, MetricsEngine};
use kmzconvert_core::model::{Coordinate, MetricsResult};
use kmzconvert_core::report::{summary_lines, BatchReport, PRIVACY_NOTICE};
use kmzconvert_core::source::InputFile;
use kmzconvert_export_xlsx::{export_xlsx, ExportConfig, DEFAULT_FILE_NAME};
use kmzconvert_import_kml::{import_kml, KmlReader};
use log::error;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "kmzconvert")]
#[command(about = "Convert KML/KMZ polygons into a spreadsheet of coordinates, centroids and areas.")]
struct Cli {
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert one or more .kml/.kmz files into a single spreadsheet.
    Convert {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[arg(long, short, default_value = DEFAULT_FILE_NAME)]
        output: PathBuf,
        #[arg(long)]
        report: Option<PathBuf>,
        #[arg(long, default_value = "Datos")]
        sheet_name: String,
        /// Report rings with fewer than 3 distinct points instead of failing them.
        #[arg(long)]
        keep_degenerate: bool,
    },
    /// Print the coordinates and metrics of a single file as JSON.
    Inspect {
        input: PathBuf,
        #[arg(long)]
        dump_coordinates: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    kmzconvert_core::logging::init_logging(&cli.log_level).map_err(|e| anyhow!(e))?;

    match cli.cmd {
        Command::Convert {
            inputs,
            output,
            report,
            sheet_name,
            keep_degenerate,
        } => convert(
            &inputs,
            &output,
            report.as_deref(),
            sheet_name,
            keep_degenerate,
        ),
        Command::Inspect {
            input,
            dump_coordinates,
        } => inspect(&input, dump_coordinates.as_deref()),
    }
}

fn convert(
    inputs: &[PathBuf],
    output: &Path,
    report: Option<&Path>,
    sheet_name: String,
    keep_degenerate: bool,
) -> Result<()> {
    let files: Vec<InputFile> = inputs.iter().map(InputFile::from_path).collect();
    println!("{} file(s) loaded.", files.len());
    println!("{PRIVACY_NOTICE}");

    let cfg = MetricsConfig {
        reject_degenerate: !keep_degenerate,
    };
    let outcome = BatchProcessor::new(KmlReader, cfg).process(&files);

    if let Some(path) = report {
        let json = serde_json::to_string_pretty(&BatchReport::from_outcome(&outcome))
            .context("serialize report")?;
        write_output(path, &json).with_context(|| format!("write report: {path:?}"))?;
    }

    if outcome.status() == BatchStatus::HasData {
        print_preview(&outcome);
    }
    for line in summary_lines(&outcome) {
        println!("{line}");
    }

    if outcome.status() == BatchStatus::NoValidData {
        bail!("no valid data was produced from {} file(s)", files.len());
    }

    let export_cfg = ExportConfig {
        sheet_name,
        ..ExportConfig::default()
    };
    // The preview above stays on screen even when the export fails.
    if let Err(err) = export_xlsx(&outcome.rows, output, &export_cfg) {
        error!("event=export_failed path={} error={err:#}", output.display());
        return Err(err);
    }
    println!("Spreadsheet written: {}", output.display());
    Ok(())
}

fn print_preview(outcome: &BatchOutcome) {
    let name_w = outcome
        .rows
        .iter()
        .map(|r| r.source_filename.chars().count())
        .max()
        .unwrap_or(0)
        .max("File".len());
    println!("{:<name_w$}  {:>7}  {:>14}  Centroid (lat, lon)", "File", "Points", "Area (ha)");
    for row in &outcome.rows {
        println!(
            "{:<name_w$}  {:>7}  {:>14.1}  {}",
            row.source_filename,
            row.coordinates.len(),
            row.area_hectares,
            row.centroid
        );
    }
}

#[derive(Debug, Serialize)]
struct InspectReport<'a> {
    file: String,
    points: usize,
    metrics: Option<MetricsResult>,
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    coordinates: Option<&'a [Coordinate]>,
}

fn inspect(input: &Path, dump_coordinates: Option<&Path>) -> Result<()> {
    ensure_input_file(input)?;

    let coords = import_kml(input).with_context(|| format!("read input: {input:?}"))?;

    if let Some(path) = dump_coordinates {
        let json = serde_json::to_string_pretty(&coords).context("serialize coordinates")?;
        write_output(path, &json).with_context(|| format!("write coordinates: {path:?}"))?;
    }

    let (metrics, error) = match MetricsEngine::default().compute(&coords) {
        Ok(m) => (Some(m), None),
        Err(e) => (None, Some(e.to_string())),
    };
    let report = InspectReport {
        file: input.display().to_string(),
        points: coords.len(),
        metrics,
        error,
        coordinates: dump_coordinates.is_none().then_some(coords.as_slice()),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("serialize inspect report")?
    );
    Ok(())
}

fn write_output(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    std::fs::write(path, data)?;
    Ok(())
}

fn ensure_input_file(input: &Path) -> Result<()> {
    match std::fs::metadata(input) {
        Ok(meta) => {
            if meta.is_file() {
                Ok(())
            } else {
                bail!("input is not a file: {input:?}");
            }
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            bail!("input not found: {input:?} (cwd: {cwd:?}).");
        }
        Err(err) => Err(err).with_context(|| format!("stat input: {input:?}")),
    }
}
