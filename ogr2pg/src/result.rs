//! Résultat uniforme d'un import

use std::path::PathBuf;

use serde::Serialize;

use crate::error::ImportError;

/// Statut d'un import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Import terminé avec succès
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Imported {
    pub input: PathBuf,
    /// Commande exacte exécutée
    pub command: String,
}

/// Résultat rapporté à l'appelant, succès comme échec
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub status: Status,
    pub message: String,
    /// Commande exécutée ou tentée
    pub command: String,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

impl From<Imported> for ExecutionResult {
    fn from(imported: Imported) -> Self {
        Self {
            status: Status::Success,
            message: format!("File imported : {}", imported.input.display()),
            command: imported.command,
        }
    }
}

impl From<ImportError> for ExecutionResult {
    fn from(err: ImportError) -> Self {
        Self {
            status: Status::Error,
            message: err.to_string(),
            command: err.command().to_string(),
        }
    }
}

impl From<Result<Imported, ImportError>> for ExecutionResult {
    fn from(result: Result<Imported, ImportError>) -> Self {
        match result {
            Ok(imported) => imported.into(),
            Err(err) => err.into(),
        }
    }
}
