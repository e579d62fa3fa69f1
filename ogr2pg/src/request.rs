//! Options d'import et normalisation
//!
//! `ImportOptions` est l'enregistrement brut fourni par l'appelant (fichier de
//! jobs, arguments CLI), `ImportRequest` la version normalisée avec les valeurs
//! par défaut appliquées.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Schéma cible par défaut
pub const DEFAULT_SCHEMA: &str = "public";

/// Options brutes d'un import (tous les champs sont optionnels)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOptions {
    /// Fichier à importer (shp, geojson, csv...)
    pub input_path: Option<PathBuf>,
    /// Encodage du fichier source (UTF-8, LATIN1...)
    pub encoding: Option<String>,
    /// Table cible
    pub table_name: Option<String>,
    /// Supprimer et recréer la table selon la structure du fichier
    pub create_table: Option<bool>,
    /// Schéma cible
    pub schema_name: Option<String>,
    /// Créer le schéma
    pub create_schema: Option<bool>,
    /// Promouvoir les géométries en multi-géométries (ex: MultiPolygon)
    pub promote_to_multi: Option<bool>,
    /// Ignorer les features en échec au lieu d'abandonner
    pub skip_failures: Option<bool>,
    /// Écrire le dump SQL dans ce fichier au lieu de l'envoyer à psql
    pub output_path: Option<PathBuf>,
}

impl ImportOptions {
    /// Applique les valeurs par défaut.
    ///
    /// Aucune validation : un chemin ou un nom de table absent devient une
    /// valeur vide et l'import échouera à l'exécution.
    pub fn normalize(self) -> ImportRequest {
        let schema_name = self
            .schema_name
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SCHEMA.to_string());

        // Un encodage vide n'est pas transmis à ogr2ogr
        let encoding = self.encoding.filter(|e| !e.trim().is_empty());
        if let Some(ref label) = encoding {
            if encoding_rs::Encoding::for_label(label.as_bytes()).is_none() {
                warn!(encoding = %label, "Unknown encoding label, passed as-is to ogr2ogr");
            }
        }

        ImportRequest {
            input_path: self.input_path.unwrap_or_default(),
            table_name: self.table_name.unwrap_or_default(),
            schema_name,
            encoding,
            create_table: self.create_table.unwrap_or(false),
            create_schema: self.create_schema.unwrap_or(false),
            promote_to_multi: self.promote_to_multi.unwrap_or(false),
            skip_failures: self.skip_failures.unwrap_or(false),
            output_path: self.output_path,
        }
    }
}

/// Requête d'import normalisée
///
/// Les noms de schéma et de table sont repris tels quels dans la commande,
/// sans échappement SQL : c'est à l'appelant de fournir des identifiants sûrs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    pub input_path: PathBuf,
    pub table_name: String,
    pub schema_name: String,
    pub encoding: Option<String>,
    pub create_table: bool,
    pub create_schema: bool,
    pub promote_to_multi: bool,
    pub skip_failures: bool,
    pub output_path: Option<PathBuf>,
}

impl ImportRequest {
    /// Crée une requête avec les valeurs par défaut
    pub fn new(input_path: impl Into<PathBuf>, table_name: impl Into<String>) -> Self {
        ImportOptions {
            input_path: Some(input_path.into()),
            table_name: Some(table_name.into()),
            ..Default::default()
        }
        .normalize()
    }

    /// Schéma cible (un nom vide est ignoré)
    pub fn schema(mut self, schema_name: impl Into<String>) -> Self {
        let schema_name = schema_name.into();
        if !schema_name.trim().is_empty() {
            self.schema_name = schema_name;
        }
        self
    }

    /// Encodage du fichier source (un encodage vide est ignoré)
    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        let encoding = encoding.into();
        if !encoding.trim().is_empty() {
            self.encoding = Some(encoding);
        }
        self
    }

    pub fn create_table(mut self, yes: bool) -> Self {
        self.create_table = yes;
        self
    }

    pub fn create_schema(mut self, yes: bool) -> Self {
        self.create_schema = yes;
        self
    }

    pub fn promote_to_multi(mut self, yes: bool) -> Self {
        self.promote_to_multi = yes;
        self
    }

    pub fn skip_failures(mut self, yes: bool) -> Self {
        self.skip_failures = yes;
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Le fichier source est-il un CSV (extension insensible à la casse)
    pub fn is_csv(&self) -> bool {
        has_extension(&self.input_path, "csv")
    }
}

impl From<ImportOptions> for ImportRequest {
    fn from(options: ImportOptions) -> Self {
        options.normalize()
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case(ext))
}
