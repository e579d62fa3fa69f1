//! Binaires externes utilisés par le pipeline

/// Variable d'environnement pour surcharger le convertisseur
pub const CONVERTER_ENV: &str = "OGR2PG_CONVERTER";
/// Variable d'environnement pour surcharger le client SQL
pub const CLIENT_ENV: &str = "OGR2PG_CLIENT";

/// Programmes à invoquer (noms résolus via le PATH, ou chemins)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub converter: String,
    pub client: String,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            converter: "ogr2ogr".into(),
            client: "psql".into(),
        }
    }
}

impl Toolchain {
    pub fn new(converter: impl Into<String>, client: impl Into<String>) -> Self {
        Self {
            converter: converter.into(),
            client: client.into(),
        }
    }

    /// Charge la configuration depuis les variables d'environnement
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            converter: non_empty_var(CONVERTER_ENV).unwrap_or(defaults.converter),
            client: non_empty_var(CLIENT_ENV).unwrap_or(defaults.client),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
