//! Exécution du pipeline ogr2ogr → psql (ou ogr2ogr → fichier)
//!
//! Aucun shell n'est utilisé : les deux processus sont lancés directement et
//! la sortie standard du convertisseur est branchée sur l'entrée du client.
//! Ce que le client écrit sur sa sortie standard est renvoyé sur stderr.

use std::io;
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tracing::{debug, warn};

use crate::command::{ImportCommand, Invocation, OutputRouting, ENCODING_VAR};

/// Statut de fin du pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStatus {
    pub success: bool,
    /// Code de la première étape en échec (ou 0), `None` si tuée par un signal
    pub code: Option<i32>,
}

impl PipelineStatus {
    /// Combine les statuts des étapes, comme `set -o pipefail`
    fn from_stages(stages: &[(&str, ExitStatus)]) -> Self {
        for (program, status) in stages {
            if !status.success() {
                warn!(program = *program, status = %status, "Pipeline stage failed");
                return Self {
                    success: false,
                    code: status.code(),
                };
            }
        }
        Self {
            success: true,
            code: Some(0),
        }
    }
}

/// Lance la commande et attend la fin de toutes les étapes
pub async fn execute(command: &ImportCommand) -> io::Result<PipelineStatus> {
    match &command.routing {
        OutputRouting::File(path) => {
            let file = tokio::fs::File::create(path).await?.into_std().await;

            let mut ogr = converter(command);
            ogr.stdout(Stdio::from(file));
            let status = ogr.status().await?;

            Ok(PipelineStatus::from_stages(&[(
                command.converter.program.as_str(),
                status,
            )]))
        }
        OutputRouting::Client(client) => pipe_to_client(command, client).await,
    }
}

async fn pipe_to_client(command: &ImportCommand, client: &Invocation) -> io::Result<PipelineStatus> {
    let mut ogr = converter(command).stdout(Stdio::piped()).spawn()?;

    let pipe: Stdio = match ogr.stdout.take() {
        Some(stdout) => stdout.try_into()?,
        None => {
            let _ = ogr.kill().await;
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "converter stdout not captured",
            ));
        }
    };

    // La sortie standard de l'appelant reste libre pour son propre résultat
    let spawned = Command::new(&client.program)
        .args(&client.args)
        .stdin(pipe)
        .stdout(io::stderr())
        .spawn();

    let mut psql = match spawned {
        Ok(child) => child,
        Err(e) => {
            let _ = ogr.kill().await;
            return Err(e);
        }
    };

    debug!(
        converter = ?ogr.id(),
        client = ?psql.id(),
        "Pipeline started"
    );

    let (ogr_status, psql_status) = tokio::join!(ogr.wait(), psql.wait());

    Ok(PipelineStatus::from_stages(&[
        (command.converter.program.as_str(), ogr_status?),
        (client.program.as_str(), psql_status?),
    ]))
}

/// Processus ogr2ogr, sortie standard non configurée
fn converter(command: &ImportCommand) -> Command {
    let mut cmd = Command::new(&command.converter.program);
    cmd.args(&command.converter.args)
        .arg(&command.source)
        .stdin(Stdio::null());

    if let Some(ref encoding) = command.encoding {
        cmd.env(ENCODING_VAR, encoding);
    }

    cmd
}
