//! Point d'entrée CLI pour ogr2pg

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage (PGHOST, PGDATABASE... sont transmis à psql)
fn load_env() {
    // Chercher .env dans le répertoire courant ou parent
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
mod jobs;
mod report;

use cli::Commands;

/// Importer des fichiers spatiaux dans PostGIS avec ogr2ogr et psql
#[derive(Parser)]
#[command(name = "ogr2pg")]
#[command(author, version)]
#[command(about = "Import spatial files (shp, geojson, csv...) into PostGIS with ogr2ogr and psql")]
#[command(long_about = "Builds a deterministic ogr2ogr command (PGDump output, EPSG:4326) and pipes it into psql, or writes the SQL dump to a file.\n\nConnection parameters are read by psql from the environment (PGHOST, PGDATABASE, PGUSER...), a .env file is loaded at startup.")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    let success = match cli.command {
        Commands::Import(args) => {
            info!(input = ?args.input, table = ?args.table, "Import");
            cli::cmd_import(args).await?
        }
        Commands::Batch {
            jobs_file,
            jobs,
            report,
        } => {
            info!(jobs_file = %jobs_file.display(), "Batch import");
            cli::cmd_batch(&jobs_file, jobs, report.as_deref()).await?
        }
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // stdout est réservé aux résultats JSON
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
