//! Détection des binaires externes avant l'import

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{ImportError, Tool};
use crate::toolchain::Toolchain;

/// Résultat de la détection d'un programme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub program: String,
    /// Commande de détection, telle que rapportée à l'appelant
    pub command: String,
    pub found: bool,
}

/// Détection d'un programme dans l'environnement d'exécution
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, program: &str) -> Probe;
}

/// Un chemin explicite doit être un fichier exécutable (`command -v` de dash
/// accepte n'importe quel fichier existant), un nom nu est cherché dans le PATH
const PROBE_SCRIPT: &str = r#"case "$1" in
*/*) test -f "$1" && test -x "$1" ;;
*) command -v "$1" ;;
esac"#;

/// Détection via `command -v` dans un shell POSIX
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellProber;

#[async_trait]
impl Prober for ShellProber {
    async fn probe(&self, program: &str) -> Probe {
        // Le nom est passé en paramètre positionnel, jamais interpolé dans le script
        let status = Command::new("sh")
            .arg("-c")
            .arg(PROBE_SCRIPT)
            .arg("sh")
            .arg(program)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        let found = matches!(status, Ok(s) if s.success());
        debug!(program, found, "Probed dependency");

        Probe {
            program: program.to_string(),
            command: probe_command(program),
            found,
        }
    }
}

/// Commande de détection affichée pour un programme
pub fn probe_command(program: &str) -> String {
    format!("command -v {program}")
}

/// Vérifie que le convertisseur et le client sont disponibles.
///
/// Les deux détections sont toujours évaluées ; si les deux manquent,
/// le convertisseur est rapporté.
pub async fn check_dependencies(prober: &dyn Prober, tools: &Toolchain) -> Result<(), ImportError> {
    let (converter, client) = tokio::join!(
        prober.probe(&tools.converter),
        prober.probe(&tools.client)
    );

    for (tool, probe) in [(Tool::Converter, converter), (Tool::Client, client)] {
        if !probe.found {
            return Err(ImportError::dependency_missing(
                tool,
                probe.program,
                probe.command,
            ));
        }
    }

    Ok(())
}
