use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_VAR: &str = "NETWORK_BUILDER_CONFIG";

// One year
pub const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("auth.token_ttl_secs must be between 1 and {max}, got {0}", max = MAX_TOKEN_TTL_SECS)]
    InvalidTokenTtl(u64),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    // Directory to read layer icons from; the built-in icons are used when unset
    pub assets_dir: Option<PathBuf>,
    pub log_filter: String,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub require_auth: bool,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 5001,
            assets_dir: None,
            log_filter: "network_builder=debug,tower_http=debug,axum=debug".to_string(),
            auth: AuthConfig::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            require_auth: false,
            jwt_secret: "network-builder-demo-secret".to_string(),
            token_ttl_secs: 3600,
        }
    }
}

impl Config {
    /// Reads the optional TOML file named by `NETWORK_BUILDER_CONFIG`, then applies
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var_os(CONFIG_PATH_VAR) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ttl = self.auth.token_ttl_secs;
        if ttl == 0 || ttl > MAX_TOKEN_TTL_SECS {
            return Err(ConfigError::InvalidTokenTtl(ttl));
        }
        Ok(())
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("NETWORK_BUILDER_HOST") {
            self.host = parse_env("NETWORK_BUILDER_HOST", value)?;
        }
        if let Some(value) = lookup("NETWORK_BUILDER_PORT") {
            self.port = parse_env("NETWORK_BUILDER_PORT", value)?;
        }
        if let Some(value) = lookup("NETWORK_BUILDER_ASSETS_DIR") {
            self.assets_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup("NETWORK_BUILDER_LOG") {
            self.log_filter = value;
        }
        if let Some(value) = lookup("NETWORK_BUILDER_REQUIRE_AUTH") {
            self.auth.require_auth = parse_env("NETWORK_BUILDER_REQUIRE_AUTH", value)?;
        }
        if let Some(value) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = value;
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_env<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv { var, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn defaults_match_the_demo_server() {
        let config = Config::default();
        assert_eq!(config.addr(), "127.0.0.1:5001".parse().unwrap());
        assert!(!config.auth.require_auth);
        assert_eq!(config.auth.token_ttl_secs, 3600);
        assert!(config.assets_dir.is_none());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            port = 8080
            assets_dir = "/srv/icons"

            [auth]
            require_auth = true
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, IpAddr::from([127, 0, 0, 1]));
        assert_eq!(config.assets_dir, Some(PathBuf::from("/srv/icons")));
        assert!(config.auth.require_auth);
        assert_eq!(config.auth.jwt_secret, AuthConfig::default().jwt_secret);
    }

    #[test]
    fn token_ttl_must_stay_within_a_year() {
        assert!(matches!(
            Config::from_toml_str("[auth]\ntoken_ttl_secs = 9223372036854775807\n"),
            Err(ConfigError::InvalidTokenTtl(ttl)) if ttl == i64::MAX as u64
        ));
        assert!(matches!(
            Config::from_toml_str("[auth]\ntoken_ttl_secs = 0\n"),
            Err(ConfigError::InvalidTokenTtl(0))
        ));
        let config = Config::from_toml_str("[auth]\ntoken_ttl_secs = 86400\n").unwrap();
        assert_eq!(config.auth.token_ttl_secs, 86400);
    }

    #[test]
    fn malformed_toml_is_rejected() {
        assert!(matches!(Config::from_toml_str("port = \"eighty\""), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("NETWORK_BUILDER_HOST", "0.0.0.0"),
                ("NETWORK_BUILDER_PORT", "9000"),
                ("NETWORK_BUILDER_REQUIRE_AUTH", "true"),
                ("JWT_SECRET", "s3cret"),
            ]))
            .unwrap();
        assert_eq!(config.addr(), "0.0.0.0:9000".parse().unwrap());
        assert!(config.auth.require_auth);
        assert_eq!(config.auth.jwt_secret, "s3cret");
    }

    #[test]
    fn invalid_environment_value_names_the_variable() {
        let mut config = Config::default();
        let err = config.apply_env(env(&[("NETWORK_BUILDER_PORT", "http")])).unwrap_err();
        assert_eq!(err.to_string(), "invalid value \"http\" for NETWORK_BUILDER_PORT");
    }

    #[test]
    fn reads_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backend.toml");
        std::fs::write(&path, "log_filter = \"info\"\n").unwrap();
        assert_eq!(Config::from_file(&path).unwrap().log_filter, "info");
        assert!(matches!(
            Config::from_file(&dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
