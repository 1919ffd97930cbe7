use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "FILMOTHEQUE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/filmotheque.toml";
const ENV_PREFIX: &str = "FILMOTHEQUE";
const ENV_SEPARATOR: &str = "__";
const PORT_ENV_VAR: &str = "PORT";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load(path_override: Option<PathBuf>) -> Result<Config, ConfigError> {
    // Load .env file if it exists (ignore errors if file doesn't exist)
    let _ = dotenvy::dotenv();

    let config_path = path_override.unwrap_or_else(|| {
        env::var(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
    });

    let mut config = load_from_sources(config_path)?;
    apply_port(&mut config, env::var(PORT_ENV_VAR).ok().as_deref());

    Ok(config)
}

/// A bare `PORT` variable (as set by most hosting platforms) replaces the
/// port of `server.bind_addr`, keeping its host
pub fn apply_port(config: &mut Config, port: Option<&str>) {
    let Some(raw) = port else {
        return;
    };

    match raw.trim().parse::<u16>() {
        Ok(port) => config.server.bind_addr.set_port(port),
        Err(_) => tracing::warn!(value = raw, "Ignoring unparsable PORT variable"),
    }
}

/// Load configuration from a specific path and environment
/// Useful for testing with custom config files
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // FILMOTHEQUE__SERVER__BIND_ADDR -> server.bind_addr
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("cors.allowed_origins"),
    );

    let config = builder.build()?;
    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_only() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[server]
bind_addr = "127.0.0.1:9000"
data_path = "/tmp/films"
public_dir = "/srv/public"

[server.api]
max_payload_bytes = "1MB"

[cors]
allowed_origins = ["https://films.example"]

[validation]
description_min_chars = 30
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.server.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(config.server.data_path, PathBuf::from("/tmp/films"));
        assert_eq!(config.server.api.max_payload_bytes.as_u64(), 1024 * 1024);
        assert_eq!(config.cors.allowed_origins, vec!["https://films.example"]);
        assert_eq!(config.validation.description_min_chars, 30);
        assert_eq!(config.validation.password_max_chars, 20);
    }

    #[test]
    fn test_apply_port() {
        let mut config = Config::default();
        apply_port(&mut config, Some("8081"));
        assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:8081");

        apply_port(&mut config, Some("not-a-port"));
        assert_eq!(config.server.bind_addr.port(), 8081);

        apply_port(&mut config, None);
        assert_eq!(config.server.bind_addr.port(), 8081);
    }
}
