//! Point d'entrée CLI pour kml-viewer

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, EnvFilter};

use kml_viewer::ViewerConfig;

// Charger .env au démarrage
fn load_env() {
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::Commands;

/// Visualiser et mesurer le premier polygone d'un KML, GeoJSON ou Shapefile
#[derive(Parser)]
#[command(name = "kml-viewer")]
#[command(author, version)]
#[command(about = "Visualiser et mesurer le premier polygone d'un KML, GeoJSON ou Shapefile")]
#[command(long_about = "Charge une source vecteur (URL, lien Google Drive ou fichier local), \
reprojette dans le plan EPSG:7761 et mesure le premier polygone.\n\n\
'view' produit une page HTML avec la carte, 'metrics' affiche seulement les métriques.")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Fichier de configuration JSON
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    let config = ViewerConfig::resolve(cli.config.as_deref())?;
    debug!(?config, "Configuration loaded");

    cli::execute(cli.command, &config)
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
