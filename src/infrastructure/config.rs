use serde::Deserialize;
use std::net::SocketAddr;

/// Prefix for environment overrides, e.g. `CLIMBING_STATS__SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "CLIMBING_STATS";

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub data: DataSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DataSettings {
    /// JSON array of snapshots loaded at startup; none when unset.
    pub seed_path: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// `config/server.{toml,json,...}` if present, then environment overrides.
pub fn load_server_config() -> anyhow::Result<ServerConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/server").required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Socket address for the configured host and port
pub fn bind_address(settings: &ServerSettings) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", settings.host, settings.port).parse()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(text: &str) -> ServerConfig {
        config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config = from_toml("");
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert!(config.data.seed_path.is_none());
    }

    #[test]
    fn test_file_values_override_defaults() {
        let config = from_toml(
            r#"
            [server]
            host = "127.0.0.1"
            port = 3000

            [data]
            seed_path = "data/seed_snapshots.json"
            "#,
        );
        assert_eq!(config.data.seed_path.as_deref(), Some("data/seed_snapshots.json"));
        assert_eq!(
            bind_address(&config.server).unwrap(),
            "127.0.0.1:3000".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_bind_address_rejects_bad_host() {
        let settings = ServerSettings {
            host: "not a host".to_string(),
            port: 80,
        };
        assert!(bind_address(&settings).is_err());
    }
}
