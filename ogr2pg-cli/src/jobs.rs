//! Fichier de jobs pour les imports en lot

use std::path::Path;

use anyhow::{Context, Result};
use ogr2pg::{ImportOptions, ImportRequest};
use serde::Deserialize;

/// Contenu d'un fichier de jobs
///
/// Soit une liste d'imports, soit un objet avec des valeurs communes :
///
/// ```json
/// {
///   "defaults": { "schemaName": "ref", "createTable": true },
///   "imports": [
///     { "inputPath": "communes.shp", "tableName": "communes", "encoding": "LATIN1" },
///     { "inputPath": "routes.geojson", "tableName": "routes", "promoteToMulti": true }
///   ]
/// }
/// ```
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum JobFile {
    List(Vec<ImportOptions>),
    WithDefaults {
        #[serde(default)]
        defaults: ImportOptions,
        imports: Vec<ImportOptions>,
    },
}

impl JobFile {
    /// Requêtes normalisées, dans l'ordre du fichier
    pub fn into_requests(self) -> Vec<ImportRequest> {
        match self {
            JobFile::List(imports) => imports.into_iter().map(ImportOptions::normalize).collect(),
            JobFile::WithDefaults { defaults, imports } => imports
                .into_iter()
                .map(|job| with_defaults(job, &defaults).normalize())
                .collect(),
        }
    }
}

/// Complète les champs absents d'un job avec les valeurs communes
fn with_defaults(job: ImportOptions, defaults: &ImportOptions) -> ImportOptions {
    ImportOptions {
        input_path: job.input_path.or_else(|| defaults.input_path.clone()),
        encoding: job.encoding.or_else(|| defaults.encoding.clone()),
        table_name: job.table_name.or_else(|| defaults.table_name.clone()),
        create_table: job.create_table.or(defaults.create_table),
        schema_name: job.schema_name.or_else(|| defaults.schema_name.clone()),
        create_schema: job.create_schema.or(defaults.create_schema),
        promote_to_multi: job.promote_to_multi.or(defaults.promote_to_multi),
        skip_failures: job.skip_failures.or(defaults.skip_failures),
        output_path: job.output_path.or_else(|| defaults.output_path.clone()),
    }
}

/// Charge un fichier de jobs
pub fn load(path: &Path) -> Result<Vec<ImportRequest>> {
    let content = std::fs::read_to_string(path)
        .context(format!("Failed to read jobs file: {}", path.display()))?;

    parse(&content).context(format!("Failed to parse jobs file: {}", path.display()))
}

fn parse(json: &str) -> Result<Vec<ImportRequest>> {
    let file: JobFile = serde_json::from_str(json)?;
    Ok(file.into_requests())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_list() {
        let requests = parse(
            r#"[
                {"inputPath": "a.shp", "tableName": "a"},
                {"inputPath": "b.csv", "tableName": "b", "schemaName": "test", "skipFailures": true}
            ]"#,
        )
        .unwrap();

        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0], ImportRequest::new("a.shp", "a"));
        assert_eq!(requests[1].schema_name, "test");
        assert!(requests[1].skip_failures);
    }

    #[test]
    fn test_parse_with_defaults() {
        let requests = parse(
            r#"{
                "defaults": {"schemaName": "ref", "createTable": true, "encoding": "LATIN1"},
                "imports": [
                    {"inputPath": "a.shp", "tableName": "a"},
                    {"inputPath": "b.shp", "tableName": "b", "createTable": false, "schemaName": "other"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(requests[0].schema_name, "ref");
        assert!(requests[0].create_table);
        assert_eq!(requests[0].encoding.as_deref(), Some("LATIN1"));

        assert_eq!(requests[1].schema_name, "other");
        assert!(!requests[1].create_table);
        assert_eq!(requests[1].input_path, PathBuf::from("b.shp"));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse(r#"{"imports": 3}"#).is_err());
        assert!(parse("not json").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load(Path::new("/nonexistent/jobs.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read jobs file"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.json");
        std::fs::write(&path, r#"[{"inputPath": "a.geojson", "tableName": "a"}]"#).unwrap();

        let requests = load(&path).unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].table_name, "a");
    }
}
