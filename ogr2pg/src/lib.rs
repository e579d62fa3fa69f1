//! # ogr2pg
//!
//! Import de fichiers spatiaux (shp, geojson, csv...) dans PostGIS avec
//! `ogr2ogr` et `psql`.
//!
//! ## Fonctionnement
//!
//! - Normalisation des options (valeurs par défaut)
//! - Vérification de la présence de `ogr2ogr` et `psql`
//! - Construction déterministe de la commande ogr2ogr (sortie PGDump)
//! - Exécution `ogr2ogr | psql --quiet`, ou écriture du dump dans un fichier
//! - Résultat uniforme : statut, message et commande exacte
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ogr2pg::{import_spatial_file, ImportRequest};
//!
//! let request = ImportRequest::new("communes.geojson", "communes")
//!     .schema("cadastre")
//!     .create_table(true)
//!     .promote_to_multi(true);
//!
//! let result = import_spatial_file(&request).await;
//! println!("{:?}: {}", result.status, result.command);
//! ```

pub mod command;
pub mod error;
pub mod invoke;
pub mod probe;
pub mod request;
pub mod result;
pub mod toolchain;

pub use command::{ImportCommand, Invocation, OutputRouting};
pub use error::{ImportError, Tool};
pub use probe::{Probe, Prober, ShellProber};
pub use request::{ImportOptions, ImportRequest};
pub use result::{ExecutionResult, Imported, Status};
pub use toolchain::Toolchain;

use std::sync::Arc;

use tracing::{debug, info, warn};

/// Importe un fichier avec les binaires configurés par l'environnement.
///
/// Ne renvoie jamais d'erreur : les échecs sont portés par le résultat.
pub async fn import_spatial_file(request: &ImportRequest) -> ExecutionResult {
    Importer::from_env().run(request).await
}

/// Orchestrateur d'import : détection, construction, exécution
#[derive(Clone)]
pub struct Importer {
    tools: Toolchain,
    prober: Arc<dyn Prober>,
}

impl Importer {
    pub fn new(tools: Toolchain) -> Self {
        Self {
            tools,
            prober: Arc::new(ShellProber),
        }
    }

    /// Binaires lus depuis `OGR2PG_CONVERTER` / `OGR2PG_CLIENT`
    pub fn from_env() -> Self {
        Self::new(Toolchain::from_env())
    }

    /// Remplace la détection des dépendances
    pub fn with_prober(mut self, prober: impl Prober + 'static) -> Self {
        self.prober = Arc::new(prober);
        self
    }

    pub fn toolchain(&self) -> &Toolchain {
        &self.tools
    }

    /// Commande qui serait exécutée pour cette requête
    pub fn command(&self, request: &ImportRequest) -> ImportCommand {
        ImportCommand::build(request, &self.tools)
    }

    /// Importe un fichier.
    ///
    /// Aucun processus d'import n'est lancé si une dépendance manque.
    pub async fn import(&self, request: &ImportRequest) -> Result<Imported, ImportError> {
        probe::check_dependencies(self.prober.as_ref(), &self.tools).await?;

        let command = self.command(request);
        let rendered = command.to_string();
        debug!(command = %rendered, "Running import");

        let status = match invoke::execute(&command).await {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "Failed to start pipeline");
                return Err(ImportError::execution_failed(
                    request.input_path.clone(),
                    rendered,
                    None,
                ));
            }
        };

        if !status.success {
            return Err(ImportError::execution_failed(
                request.input_path.clone(),
                rendered,
                status.code,
            ));
        }

        info!(
            input = %request.input_path.display(),
            schema = %request.schema_name,
            table = %request.table_name,
            "File imported"
        );

        Ok(Imported {
            input: request.input_path.clone(),
            command: rendered,
        })
    }

    /// Importe un fichier et convertit l'issue en `ExecutionResult`
    pub async fn run(&self, request: &ImportRequest) -> ExecutionResult {
        self.import(request).await.into()
    }
}

impl Default for Importer {
    fn default() -> Self {
        Self::new(Toolchain::default())
    }
}

impl std::fmt::Debug for Importer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Importer")
            .field("tools", &self.tools)
            .finish_non_exhaustive()
    }
}
