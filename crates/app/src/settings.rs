//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` in the working directory, then overridden by
//! `SPLITWAYS__<SECTION>__<KEY>` environment variables.
//!
//! See `settings.example.toml` for the configuration.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

/// Where the ledger lives.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    /// In-memory store, lost on exit.
    Memory,
    /// Path of a SQLite file, created if missing.
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("SPLITWAYS").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn memory_database_and_default_level() {
        let settings = parse(
            r#"
            [server]
            port = 3000
            database = "memory"
            "#,
        );
        assert_eq!(settings.app.level, "info");
        let server = settings.server.unwrap();
        assert_eq!(server.port, 3000);
        assert_eq!(server.bind, None);
        assert_eq!(server.database, Database::Memory);
    }

    #[test]
    fn sqlite_database_path() {
        let settings = parse(
            r#"
            [app]
            level = "debug"

            [server]
            bind = "0.0.0.0"
            port = 8080
            database = { sqlite = "ledger.db" }
            "#,
        );
        assert_eq!(settings.app.level, "debug");
        let server = settings.server.unwrap();
        assert_eq!(server.database, Database::Sqlite("ledger.db".to_string()));
    }

    #[test]
    fn server_section_is_optional() {
        let settings = parse("[app]\nlevel = \"warn\"\n");
        assert!(settings.server.is_none());
    }
}
