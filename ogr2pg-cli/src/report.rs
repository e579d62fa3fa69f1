//! Rapport d'import en lot
//!
//! Collecte le résultat de chaque fichier et l'affiche ou le sauvegarde en
//! JSON. Les échecs d'un fichier n'interrompent pas le lot.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use ogr2pg::{ExecutionResult, ImportRequest};
use serde::Serialize;

/// Statut global du lot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImportStatus {
    /// Tous les fichiers importés
    Success,
    /// Une partie des fichiers en échec
    PartialSuccess,
    /// Aucun fichier importé
    Failed,
}

/// Résultat d'un fichier du lot
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    /// Position dans le fichier de jobs
    pub index: usize,
    pub input: PathBuf,
    /// Table cible qualifiée (schema.table)
    pub target: String,
    #[serde(flatten)]
    pub result: ExecutionResult,
}

/// Rapport complet d'un lot
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    /// Fichier de jobs source
    pub source: String,
    /// Durée du lot
    pub duration_secs: f64,
    /// Statut global
    pub status: ImportStatus,
    /// Nombre de fichiers traités
    pub files_processed: usize,
    /// Nombre de fichiers en échec
    pub files_failed: usize,
    /// Résultats, dans l'ordre du fichier de jobs
    pub results: Vec<FileResult>,
}

impl Default for ImportReport {
    fn default() -> Self {
        Self {
            source: String::new(),
            duration_secs: 0.0,
            status: ImportStatus::Success,
            files_processed: 0,
            files_failed: 0,
            results: Vec::new(),
        }
    }
}

impl ImportReport {
    /// Crée un nouveau rapport pour un fichier de jobs
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            ..Default::default()
        }
    }

    /// Enregistre le résultat d'un fichier
    pub fn record(&mut self, index: usize, request: &ImportRequest, result: ExecutionResult) {
        self.files_processed += 1;
        if !result.is_success() {
            self.files_failed += 1;
        }
        self.results.push(FileResult {
            index,
            input: request.input_path.clone(),
            target: target_of(request),
            result,
        });
    }

    /// Définit la durée du lot
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Trie les résultats et détermine le statut final
    pub fn finalize(&mut self) {
        self.results.sort_by_key(|r| r.index);

        let imported = self.files_processed - self.files_failed;
        self.status = if self.files_failed == 0 {
            ImportStatus::Success
        } else if imported > 0 {
            ImportStatus::PartialSuccess
        } else {
            ImportStatus::Failed
        };
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("IMPORT REPORT - {}", self.source);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);
        println!(
            "Files: {} processed, {} failed",
            self.files_processed, self.files_failed
        );

        let failures: Vec<_> = self
            .results
            .iter()
            .filter(|r| !r.result.is_success())
            .collect();

        if !failures.is_empty() {
            println!("\n--- ERRORS ({}) ---", failures.len());
            for f in failures.iter().take(20) {
                println!("  [{}] {}", f.target, f.result.message);
                println!("      {}", f.result.command);
            }
            if failures.len() > 20 {
                println!("  ... and {} more", failures.len() - 20);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{}: {} imported, {} failed",
            self.source,
            self.files_processed - self.files_failed,
            self.files_failed
        )
    }
}

fn target_of(request: &ImportRequest) -> String {
    match &request.output_path {
        Some(path) => path.display().to_string(),
        None => format!("{}.{}", request.schema_name, request.table_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ogr2pg::{ImportError, Imported};

    fn ok(input: &str) -> ExecutionResult {
        Imported {
            input: input.into(),
            command: format!("ogr2ogr ... \"{input}\" | psql --quiet"),
        }
        .into()
    }

    fn failed(input: &str) -> ExecutionResult {
        ImportError::execution_failed(input, "ogr2ogr ...", Some(1)).into()
    }

    #[test]
    fn test_import_report_default() {
        let report = ImportReport::default();
        assert_eq!(report.status, ImportStatus::Success);
        assert_eq!(report.files_processed, 0);
        assert!(report.results.is_empty());
    }

    #[test]
    fn test_record() {
        let mut report = ImportReport::new("jobs.json");
        report.record(0, &ImportRequest::new("a.shp", "a"), ok("a.shp"));
        report.record(1, &ImportRequest::new("b.shp", "b").schema("ref"), failed("b.shp"));

        assert_eq!(report.files_processed, 2);
        assert_eq!(report.files_failed, 1);
        assert_eq!(report.results[0].target, "public.a");
        assert_eq!(report.results[1].target, "ref.b");
    }

    #[test]
    fn test_target_for_file_output() {
        let mut report = ImportReport::new("jobs.json");
        let request = ImportRequest::new("a.shp", "a").output_path("/tmp/a.sql");
        report.record(0, &request, ok("a.shp"));
        assert_eq!(report.results[0].target, "/tmp/a.sql");
    }

    #[test]
    fn test_finalize_sorts_by_index() {
        let mut report = ImportReport::new("jobs.json");
        report.record(2, &ImportRequest::new("c.shp", "c"), ok("c.shp"));
        report.record(0, &ImportRequest::new("a.shp", "a"), ok("a.shp"));
        report.record(1, &ImportRequest::new("b.shp", "b"), ok("b.shp"));
        report.finalize();

        let order: Vec<_> = report.results.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert_eq!(report.status, ImportStatus::Success);
    }

    #[test]
    fn test_finalize_partial_success() {
        let mut report = ImportReport::new("jobs.json");
        report.record(0, &ImportRequest::new("a.shp", "a"), ok("a.shp"));
        report.record(1, &ImportRequest::new("b.shp", "b"), failed("b.shp"));
        report.finalize();

        assert_eq!(report.status, ImportStatus::PartialSuccess);
    }

    #[test]
    fn test_finalize_failed() {
        let mut report = ImportReport::new("jobs.json");
        report.record(0, &ImportRequest::new("a.shp", "a"), failed("a.shp"));
        report.finalize();

        assert_eq!(report.status, ImportStatus::Failed);
    }

    #[test]
    fn test_summary() {
        let mut report = ImportReport::new("jobs.json");
        report.record(0, &ImportRequest::new("a.shp", "a"), ok("a.shp"));
        report.record(1, &ImportRequest::new("b.shp", "b"), failed("b.shp"));

        let summary = report.summary();
        assert!(summary.contains("jobs.json"));
        assert!(summary.contains("1 imported"));
        assert!(summary.contains("1 failed"));
    }

    #[test]
    fn test_save_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        let mut report = ImportReport::new("jobs.json");
        report.record(0, &ImportRequest::new("a.shp", "a"), failed("a.shp"));
        report.finalize();
        report.save_to_file(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["status"], "Failed");
        assert_eq!(json["results"][0]["status"], "error");
        assert_eq!(json["results"][0]["message"], "Fail to import a.shp");
        assert_eq!(json["results"][0]["command"], "ogr2ogr ...");
    }
}
