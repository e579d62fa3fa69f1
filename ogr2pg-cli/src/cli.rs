//! Définition et implémentation des commandes CLI
//!
//! - `import`: un fichier → PostGIS (ou dump SQL)
//! - `batch`: fichier de jobs JSON, imports en parallèle

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use futures::stream::{self, StreamExt};
use ogr2pg::{ImportOptions, ImportRequest, Importer};
use tracing::{info, warn};

use crate::report::ImportReport;

#[derive(Subcommand)]
pub enum Commands {
    /// Import one spatial file into PostGIS (or into a SQL dump file)
    Import(ImportArgs),

    /// Import every file listed in a JSON job file
    Batch {
        /// JSON job file (array of imports, or {"defaults": {...}, "imports": [...]})
        jobs_file: PathBuf,

        /// Maximum number of imports running concurrently
        #[arg(long, alias = "threads")]
        jobs: Option<usize>,

        /// Save the import report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Input file (shp, geojson, csv, ...)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Target table
    #[arg(short, long)]
    pub table: String,

    /// Target schema (default: public)
    #[arg(short, long)]
    pub schema: Option<String>,

    /// Input encoding (UTF-8, LATIN1, ...)
    #[arg(short, long)]
    pub encoding: Option<String>,

    /// Drop and create the table according to the file structure
    #[arg(long)]
    pub create_table: bool,

    /// Create the schema
    #[arg(long)]
    pub create_schema: bool,

    /// Promote geometries to multi-geometries (ex: MultiPolygon)
    #[arg(long)]
    pub promote_to_multi: bool,

    /// Skip features that fail to convert instead of aborting
    #[arg(long)]
    pub skip_failures: bool,

    /// Write the SQL dump to this file instead of piping it into psql
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the command without checking dependencies or running it
    #[arg(long)]
    pub dry_run: bool,
}

impl ImportArgs {
    /// Options brutes : un drapeau absent reste `None` pour la normalisation
    fn into_options(self) -> ImportOptions {
        ImportOptions {
            input_path: Some(self.input),
            encoding: self.encoding,
            table_name: Some(self.table),
            create_table: self.create_table.then_some(true),
            schema_name: self.schema,
            create_schema: self.create_schema.then_some(true),
            promote_to_multi: self.promote_to_multi.then_some(true),
            skip_failures: self.skip_failures.then_some(true),
            output_path: self.output,
        }
    }
}

/// Exécute la commande import, renvoie `true` en cas de succès
pub async fn cmd_import(args: ImportArgs) -> Result<bool> {
    let dry_run = args.dry_run;
    let request = args.into_options().normalize();
    let importer = Importer::from_env();

    if dry_run {
        println!("{}", importer.command(&request));
        return Ok(true);
    }

    let result = importer.run(&request).await;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(result.is_success())
}

/// Exécute un fichier de jobs, renvoie `true` si tous les imports ont réussi
pub async fn cmd_batch(jobs_file: &Path, jobs: Option<usize>, report_path: Option<&Path>) -> Result<bool> {
    let requests = crate::jobs::load(jobs_file)?;

    if requests.is_empty() {
        anyhow::bail!("No imports found in {}", jobs_file.display());
    }

    let jobs = jobs.filter(|&n| n > 0).unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    });

    warn_table_conflicts(&requests);

    let importer = Importer::from_env();
    let started_at = Instant::now();

    println!("=== Batch {} ===", jobs_file.display());
    println!("Imports: {}", requests.len());
    println!("Jobs: {}", jobs);
    println!("Converter: {}", importer.toolchain().converter);
    println!("Client: {}", importer.toolchain().client);

    let report = Mutex::new(ImportReport::new(&jobs_file.display().to_string()));

    stream::iter(requests.into_iter().enumerate())
        .for_each_concurrent(jobs, |(index, request)| {
            let importer = &importer;
            let report = &report;

            async move {
                let result = importer.run(&request).await;

                if result.is_success() {
                    info!(input = %request.input_path.display(), "Imported");
                } else {
                    warn!(
                        input = %request.input_path.display(),
                        command = %result.command,
                        "{}",
                        result.message
                    );
                }

                report
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .record(index, &request, result);
            }
        })
        .await;

    let mut report = report.into_inner().unwrap_or_else(|e| e.into_inner());
    report.set_duration(started_at.elapsed());
    report.finalize();
    report.display();

    if let Some(path) = report_path {
        report
            .save_to_file(path)
            .with_context(|| format!("Failed to save report to {}", path.display()))?;
        info!(path = %path.display(), "Report saved");
    }

    info!("{}", report.summary());

    Ok(report.files_failed == 0)
}

/// Signale les imports concurrents visant la même table
fn warn_table_conflicts(requests: &[ImportRequest]) {
    let mut seen = std::collections::HashSet::new();
    for request in requests.iter().filter(|r| r.output_path.is_none()) {
        let target = format!("{}.{}", request.schema_name, request.table_name);
        if !seen.insert(target.clone()) {
            warn!(
                table = %target,
                "Several imports target the same table and may run concurrently"
            );
        }
    }
}
