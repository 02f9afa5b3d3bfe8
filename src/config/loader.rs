//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::ShellConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load, override from the environment, and validate a TOML config file.
pub fn load_config(path: &Path) -> Result<ShellConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config = parse_config(&content, std::env::var("PORT").ok().as_deref())?;
    tracing::info!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

/// Defaults plus environment overrides, for running without a file.
pub fn default_config() -> Result<ShellConfig, ConfigError> {
    parse_config("", std::env::var("PORT").ok().as_deref())
}

fn parse_config(content: &str, port: Option<&str>) -> Result<ShellConfig, ConfigError> {
    let mut config: ShellConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    apply_env_overrides(&mut config, port);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// `PORT` replaces the port of `api.bind_address`.
pub fn apply_env_overrides(config: &mut ShellConfig, port: Option<&str>) {
    let Some(port) = port.map(str::trim).filter(|p| !p.is_empty()) else {
        return;
    };
    let host = config
        .api
        .bind_address
        .rsplit_once(':')
        .map(|(host, _)| host)
        .unwrap_or(&config.api.bind_address);
    config.api.bind_address = format!("{}:{}", host, port);
    tracing::debug!(bind_address = %config.api.bind_address, "Applied PORT override");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_override() {
        let config = parse_config("", Some("5050")).unwrap();
        assert_eq!(config.api.bind_address, "0.0.0.0:5050");

        let config = parse_config("[api]\nbind_address = \"127.0.0.1:4000\"", None).unwrap();
        assert_eq!(config.api.bind_address, "127.0.0.1:4000");
    }

    #[test]
    fn test_invalid_port_fails_validation() {
        let err = parse_config("", Some("not-a-port")).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().starts_with("Validation failed: api.bind_address"));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(parse_config("[api", None), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_config(Path::new("/nonexistent/shell.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
