//! Définition et implémentation des commandes CLI
//!
//! - `view`: page HTML (carte + métriques) et CSV dans le répertoire de sortie
//! - `metrics`: métriques seules sur la console (CSV/JSON en option)

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use kml_viewer::export::{export_layer, output_stem, write_metrics_csv};
use kml_viewer::links::ndvi_timeseries_url;
use kml_viewer::{
    Basemap, LeafletPage, MapHeight, MapRenderer, MapView, PipelineOutput, RunReport, Session,
    ViewerConfig,
};
use tracing::{info, warn};
use vecsource::{Attributes, Source, SourceReader, VectorDataset};

#[derive(Subcommand)]
pub enum Commands {
    /// Render the first polygon of a source on a map (HTML page + metrics CSV)
    View {
        #[command(flatten)]
        source: SourceArgs,

        /// Basemap (default: from config, esri-satellite)
        #[arg(short, long, value_enum)]
        basemap: Option<Basemap>,

        /// Map height in pixels, 1 to 10000 (default: from config, 600)
        #[arg(long)]
        height: Option<u32>,

        /// Also export the displayed layer as GeoJSON
        #[arg(long)]
        geojson: bool,
    },

    /// Print the metrics of the first polygon of a source
    Metrics {
        #[command(flatten)]
        source: SourceArgs,

        /// Write the metrics CSV to the output directory
        #[arg(long)]
        csv: bool,

        /// Print the metrics as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

/// Arguments communs aux commandes
#[derive(Args)]
pub struct SourceArgs {
    /// URL (Google Drive links accepted) or path to a KML, GeoJSON or Shapefile
    pub source: String,

    /// Measure this record instead of the first valid polygon
    #[arg(short, long)]
    pub index: Option<usize>,

    /// Output directory (default: from config, ./output)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Save a JSON run report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Print the full run report on the console
    #[arg(long)]
    pub show_report: bool,
}

/// Exécute une commande avec rapport d'exécution
pub fn execute(command: Commands, config: &ViewerConfig) -> Result<()> {
    let args = match &command {
        Commands::View { source, .. } | Commands::Metrics { source, .. } => source,
    };

    let started = Instant::now();
    let source = Source::from_arg(&args.source);
    let mut report = RunReport::new(&source.identifier());
    let output_dir = args.output.clone().unwrap_or_else(|| config.output_dir.clone());

    let result = process(&source, args.index, config, &mut report).and_then(|(dataset, output)| {
        match &command {
            Commands::View {
                basemap,
                height,
                geojson,
                ..
            } => {
                let height = match height {
                    Some(px) => MapHeight::new(*px)?,
                    None => config.map_height()?,
                };
                let options = ViewOptions {
                    basemap: basemap.unwrap_or(config.basemap),
                    height,
                    geojson: *geojson,
                };
                cmd_view(&source, &dataset, &output, &options, &output_dir)
            }
            Commands::Metrics { csv, json, .. } => {
                cmd_metrics(&source, &output, *csv, *json, &output_dir)
            }
        }
    });

    report.set_duration(started.elapsed());
    if let Err(e) = &result {
        report.record_error(e);
    }
    report.finalize();
    info!("{}", report.summary());

    if args.show_report {
        println!("{}", report);
    }

    if let Some(path) = &args.report {
        report.save_to_file(path)?;
        info!(path = %path.display(), "Run report saved");
    }

    result
}

/// Charge la source et exécute le pipeline
fn process(
    source: &Source,
    index: Option<usize>,
    config: &ViewerConfig,
    report: &mut RunReport,
) -> Result<(Arc<VectorDataset>, PipelineOutput)> {
    let mut session = Session::new(SourceReader::new(config.http_timeout()));

    let dataset = session
        .load(source)
        .with_context(|| format!("Failed to process {}", source.identifier()))?;
    report.record_dataset(&dataset);

    let (_, output) = session
        .process(source, index)
        .with_context(|| format!("Failed to process {}", source.identifier()))?;
    report.record_output(&output);

    if let Some(warning) = &output.warning {
        println!("Warning: {}", warning);
    }

    Ok((dataset, output))
}

struct ViewOptions {
    basemap: Basemap,
    height: MapHeight,
    geojson: bool,
}

fn cmd_view(
    source: &Source,
    dataset: &VectorDataset,
    output: &PipelineOutput,
    options: &ViewOptions,
    output_dir: &Path,
) -> Result<()> {
    let identifier = source.identifier();
    let csv_path = write_metrics_csv(&output.metrics, &identifier, output_dir)?;
    let csv_file = csv_path
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string);

    let polygon = output.metrics.geographic_polygon();
    let empty = Attributes::new();
    let attributes = dataset
        .records
        .get(output.index)
        .map_or(&empty, |record| &record.attributes);

    let ndvi_link = ndvi_timeseries_url(source);
    if ndvi_link.is_none() {
        warn!("NDVI timeseries link is only available for URL sources");
    }

    let page = LeafletPage {
        title: "KML Viewer",
        warning: output.warning.as_deref(),
        metrics: Some(&output.metrics),
        csv_file: csv_file.as_deref(),
        ndvi_link: ndvi_link.as_deref(),
    };
    let view = MapView {
        polygon: &polygon,
        attributes,
        basemap: options.basemap,
        height: options.height,
    };

    let stem = output_stem(&identifier);
    let html_path = output_dir.join(format!("{}.html", stem));
    std::fs::write(&html_path, page.render(&view)?)
        .with_context(|| format!("Failed to write file: {}", html_path.display()))?;

    println!("=== {} ===", identifier);
    println!("Basemap: {}", options.basemap.heading());
    print_metrics(output);
    println!("Map: {}", html_path.display());
    println!("CSV: {}", csv_path.display());

    if options.geojson {
        let geojson_path = output_dir.join(format!("{}.geojson", stem));
        export_layer(&geojson_path, &polygon, attributes)?;
        println!("GeoJSON: {}", geojson_path.display());
    }

    Ok(())
}

fn cmd_metrics(
    source: &Source,
    output: &PipelineOutput,
    csv: bool,
    json: bool,
    output_dir: &Path,
) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(output)?);
    } else {
        println!("=== {} ===", source.identifier());
        print_metrics(output);
    }

    if csv {
        let path = write_metrics_csv(&output.metrics, &source.identifier(), output_dir)?;
        println!("CSV: {}", path.display());
    }

    Ok(())
}

fn print_metrics(output: &PipelineOutput) {
    println!("Record: #{}", output.index);
    for (name, value) in output.metrics.display_rows() {
        println!("{:<14} {}", name, value);
    }
}
