//! Construction de la commande ogr2ogr → psql
//!
//! La commande est gardée sous forme structurée (programme + arguments
//! distincts). Les guillemets autour du fichier source et les opérateurs
//! `|` / `>` n'existent que dans le rendu texte ; à l'exécution chaque
//! argument est passé tel quel au processus.

use std::fmt;
use std::path::PathBuf;

use crate::request::ImportRequest;
use crate::toolchain::Toolchain;

/// Variable de configuration GDAL pour l'encodage des shapefiles
pub const ENCODING_VAR: &str = "SHAPE_ENCODING";

/// Arguments passés au client SQL
const CLIENT_ARGS: &[&str] = &["--quiet"];

/// Un programme et ses arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    fn arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    fn flag(&mut self, flag: &str, value: impl Into<String>) -> &mut Self {
        self.arg(flag).arg(value)
    }

    /// Option de création de couche (`-lco KEY=VALUE`)
    fn lco(&mut self, key: &str, value: &str) -> &mut Self {
        self.flag("-lco", format!("{key}={value}"))
    }
}

/// Destination de la sortie PGDump
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputRouting {
    /// Redirection dans un fichier SQL (psql n'est pas invoqué)
    File(PathBuf),
    /// Pipe vers le client SQL
    Client(Invocation),
}

/// Commande complète d'import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportCommand {
    /// Encodage appliqué au seul processus ogr2ogr
    pub encoding: Option<String>,
    pub converter: Invocation,
    /// Fichier source, dernier argument positionnel du convertisseur
    pub source: PathBuf,
    pub routing: OutputRouting,
}

impl ImportCommand {
    /// Construit la commande pour une requête normalisée.
    ///
    /// L'ordre des arguments est fixe : ogr2ogr interprète certaines options
    /// par rapport à la source, et la redirection doit rester en dernier.
    /// Ne renvoie jamais d'erreur, même pour une requête incomplète.
    pub fn build(request: &ImportRequest, tools: &Toolchain) -> Self {
        let mut ogr = Invocation::new(&tools.converter);

        ogr.flag("--config", "PG_USE_COPY").arg("YES");
        ogr.flag("-f", "PGDump").arg("/vsistdout/");
        ogr.lco("GEOMETRY_NAME", "geom");
        ogr.flag("-t_srs", "EPSG:4326");
        ogr.lco("precision", "NO");

        if request.skip_failures {
            ogr.arg("-skipfailures");
        }

        if request.promote_to_multi {
            ogr.flag("-nlt", "PROMOTE_TO_MULTI");
        }

        ogr.lco("CREATE_SCHEMA", on_off(request.create_schema));
        ogr.lco("SCHEMA", &request.schema_name);

        let table_lifecycle = on_off(request.create_table);
        ogr.lco("DROP_TABLE", table_lifecycle);
        ogr.lco("CREATE_TABLE", table_lifecycle);

        // csv
        if request.is_csv() {
            ogr.flag("-oo", "EMPTY_STRING_AS_NULL=YES");
        }

        ogr.flag("-nln", &request.table_name);

        let routing = match &request.output_path {
            Some(path) => OutputRouting::File(path.clone()),
            None => {
                let mut psql = Invocation::new(&tools.client);
                for arg in CLIENT_ARGS {
                    psql.arg(*arg);
                }
                OutputRouting::Client(psql)
            }
        };

        Self {
            encoding: request.encoding.clone(),
            converter: ogr,
            source: request.input_path.clone(),
            routing,
        }
    }

    /// Tokens affichés, dans l'ordre d'exécution
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens = Vec::with_capacity(self.converter.args.len() + 6);

        if let Some(ref encoding) = self.encoding {
            tokens.push(format!("{ENCODING_VAR}=\"{encoding}\""));
        }
        tokens.push(self.converter.program.clone());
        tokens.extend(self.converter.args.iter().cloned());
        tokens.push(format!("\"{}\"", self.source.display()));

        match &self.routing {
            OutputRouting::File(path) => {
                tokens.push(">".to_string());
                tokens.push(path.display().to_string());
            }
            OutputRouting::Client(client) => {
                tokens.push("|".to_string());
                tokens.push(client.program.clone());
                tokens.extend(client.args.iter().cloned());
            }
        }

        tokens
    }

    /// La sortie est-elle écrite dans un fichier
    pub fn writes_to_file(&self) -> bool {
        matches!(self.routing, OutputRouting::File(_))
    }
}

impl fmt::Display for ImportCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens().join(" "))
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "ON"
    } else {
        "OFF"
    }
}
