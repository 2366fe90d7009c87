use crate::config::{LoggingConfig, ServerConfig, TransportConfig};
use crate::error::{Error, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub transport: TransportConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Layers `config/default.toml`, `config/{env}.toml` and `STOCKWATCH__*` variables.
    pub fn load(env: &str) -> Result<Self> {
        Self::load_from("config", env)
    }

    pub fn load_from(dir: impl AsRef<Path>, env: &str) -> Result<Self> {
        let dir = dir.as_ref();
        let config = Config::builder()
            .add_source(File::from(dir.join("default")).required(false))
            .add_source(File::from(dir.join(env)).required(false))
            .add_source(
                Environment::with_prefix("STOCKWATCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        config.try_deserialize()
            .map_err(|e| Error::ConfigError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransportKind;
    use std::fs;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("stock-watch-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn missing_files_fall_back_to_defaults() {
        let dir = scratch_dir("empty");
        let config = AppConfig::load_from(&dir, "nowhere").unwrap();

        assert_eq!(config.server.bind_address, "0.0.0.0:3000");
        assert_eq!(config.transport.kind, TransportKind::Iex);
        assert_eq!(config.transport.timeout_ms, 5_000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn environment_file_overrides_default_file() {
        let dir = scratch_dir("layered");
        fs::write(
            dir.join("default.toml"),
            "[server]\nbind_address = \"127.0.0.1:8080\"\n\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();
        fs::write(
            dir.join("test.toml"),
            "[transport]\nkind = \"fixture\"\nfixtures_path = \"quotes.json\"\n\n[logging]\njson = true\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&dir, "test").unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:8080");
        assert_eq!(config.transport.kind, TransportKind::Fixture);
        assert_eq!(config.transport.fixtures_path.as_deref(), Some("quotes.json"));
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn unknown_transport_kind_is_a_config_error() {
        let dir = scratch_dir("bad-kind");
        fs::write(dir.join("default.toml"), "[transport]\nkind = \"carrier-pigeon\"\n").unwrap();

        let err = AppConfig::load_from(&dir, "none").unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn fixture_transport_needs_a_path() {
        let mut config = AppConfig::default();
        config.transport.kind = TransportKind::Fixture;

        assert!(matches!(config.transport.connector(), Err(Error::ConfigError(_))));
    }

    #[test]
    fn shipped_default_file_parses() {
        let config = AppConfig::load_from(concat!(env!("CARGO_MANIFEST_DIR"), "/config"), "default").unwrap();
        assert_eq!(config.transport.kind, TransportKind::Iex);
    }
}
