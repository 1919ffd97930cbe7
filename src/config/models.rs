use crate::humanize::ByteSize;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub validation: ValidationLimits,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    /// Directory of the embedded document store
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,
    /// Static assets served for non-API paths when the directory exists
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
    #[serde(default)]
    pub api: ApiLimits,
}

/// API request limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiLimits {
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: ByteSize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            data_path: default_data_path(),
            public_dir: default_public_dir(),
            api: ApiLimits::default(),
        }
    }
}

impl Default for ApiLimits {
    fn default() -> Self {
        Self {
            max_payload_bytes: default_max_payload_bytes(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data/store")
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_max_payload_bytes() -> ByteSize {
    ByteSize(100 * 1024)
}

/// Cross-origin policy; an empty origin list allows any origin
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Bounds applied to user-supplied film and account fields
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValidationLimits {
    #[serde(default = "default_description_min_chars")]
    pub description_min_chars: usize,
    #[serde(default = "default_password_min_chars")]
    pub password_min_chars: usize,
    #[serde(default = "default_password_max_chars")]
    pub password_max_chars: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            description_min_chars: default_description_min_chars(),
            password_min_chars: default_password_min_chars(),
            password_max_chars: default_password_max_chars(),
        }
    }
}

fn default_description_min_chars() -> usize {
    20
}

fn default_password_min_chars() -> usize {
    8
}

fn default_password_max_chars() -> usize {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:3000");
        assert_eq!(config.server.api.max_payload_bytes.as_u64(), 100 * 1024);
        assert!(config.cors.allowed_origins.is_empty());
        assert_eq!(config.validation.description_min_chars, 20);
        assert_eq!(config.validation.password_min_chars, 8);
        assert_eq!(config.validation.password_max_chars, 20);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
[server]
data_path = "/var/lib/filmotheque"

[validation]
password_max_chars = 64
            "#,
        )
        .unwrap();

        assert_eq!(config.server.data_path, PathBuf::from("/var/lib/filmotheque"));
        assert_eq!(config.server.public_dir, PathBuf::from("public"));
        assert_eq!(config.validation.password_max_chars, 64);
        assert_eq!(config.validation.password_min_chars, 8);
    }
}
