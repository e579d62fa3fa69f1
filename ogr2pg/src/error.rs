//! Types d'erreurs pour le crate ogr2pg

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Rôle d'un outil externe dans le pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    /// Convertisseur vectoriel (ogr2ogr)
    Converter,
    /// Client de base de données (psql)
    Client,
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tool::Converter => f.write_str("converter"),
            Tool::Client => f.write_str("database client"),
        }
    }
}

/// Erreurs pouvant survenir lors d'un import
///
/// Pas de variante de validation : une requête incomplète produit une
/// commande invalide qui échoue à l'exécution.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Binaire externe introuvable dans le PATH
    #[error("{program} not found")]
    DependencyMissing {
        tool: Tool,
        program: String,
        /// Commande de détection utilisée (ex: `command -v ogr2ogr`)
        probe: String,
    },

    /// Le pipeline s'est terminé avec un code non nul (ou n'a pas pu démarrer)
    #[error("Fail to import {}", .input.display())]
    ExecutionFailed {
        input: PathBuf,
        command: String,
        /// Code de sortie, `None` si tué par un signal ou jamais lancé
        code: Option<i32>,
    },
}

impl ImportError {
    /// Crée une erreur de dépendance manquante
    pub fn dependency_missing(
        tool: Tool,
        program: impl Into<String>,
        probe: impl Into<String>,
    ) -> Self {
        Self::DependencyMissing {
            tool,
            program: program.into(),
            probe: probe.into(),
        }
    }

    /// Crée une erreur d'exécution
    pub fn execution_failed(
        input: impl Into<PathBuf>,
        command: impl Into<String>,
        code: Option<i32>,
    ) -> Self {
        Self::ExecutionFailed {
            input: input.into(),
            command: command.into(),
            code,
        }
    }

    /// Commande exécutée ou tentée (commande de détection pour une dépendance)
    pub fn command(&self) -> &str {
        match self {
            Self::DependencyMissing { probe, .. } => probe,
            Self::ExecutionFailed { command, .. } => command,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_missing_message() {
        let err = ImportError::dependency_missing(Tool::Client, "psql", "command -v psql");
        assert_eq!(err.to_string(), "psql not found");
        assert_eq!(err.command(), "command -v psql");
    }

    #[test]
    fn test_execution_failed_message() {
        let err = ImportError::execution_failed("/data/a.shp", "ogr2ogr ...", Some(1));
        assert_eq!(err.to_string(), "Fail to import /data/a.shp");
        assert_eq!(err.command(), "ogr2ogr ...");
    }

    #[test]
    fn test_tool_display() {
        assert_eq!(Tool::Converter.to_string(), "converter");
        assert_eq!(Tool::Client.to_string(), "database client");
    }
}
