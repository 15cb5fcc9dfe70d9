use std::{fs, path::Path, path::PathBuf, time::Duration};

use anyhow::Context;
use ews::net::{TransportConfig, DEFAULT_ENDPOINT};
use serde::Deserialize;

/// Settings read from the optional TOML configuration file.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// URL of the EWS endpoint.
    pub endpoint: String,

    /// The email address to log in as. Prompted for if absent.
    pub username: Option<String>,

    /// Where to keep a copy of the session transcript.
    pub log_file: PathBuf,

    /// Give up on a request after this many seconds.
    pub timeout_secs: Option<u64>,

    pub https_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            username: None,
            log_file: PathBuf::from("GetStartedWithEWS.log"),
            timeout_secs: None,
            https_only: true,
        }
    }
}

impl Config {
    /// Reads the configuration at `path`, falling back to the defaults if
    /// there is no such file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            log::info!("no config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("unable to read {}", path.display()))?;

        toml::from_str(&content).with_context(|| format!("unable to parse {}", path.display()))
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            endpoint: self.endpoint.clone(),
            timeout: self.timeout_secs.map(Duration::from_secs),
            https_only: self.https_only,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.username, None);
        assert_eq!(config.log_file, PathBuf::from("GetStartedWithEWS.log"));
        assert!(config.https_only);

        let transport = config.transport();
        assert_eq!(transport.timeout, None);
    }

    #[test]
    fn reads_all_fields() {
        let config: Config = toml::from_str(
            r#"
            endpoint = "https://mail.example.com/EWS/Exchange.asmx"
            username = "user@example.com"
            log_file = "/tmp/ews.log"
            timeout_secs = 100
            https_only = false
            "#,
        )
        .unwrap();

        assert_eq!(config.username.as_deref(), Some("user@example.com"));
        assert_eq!(config.log_file, PathBuf::from("/tmp/ews.log"));

        let transport = config.transport();
        assert_eq!(
            transport.endpoint,
            "https://mail.example.com/EWS/Exchange.asmx"
        );
        assert_eq!(transport.timeout, Some(Duration::from_secs(100)));
        assert!(!transport.https_only);
    }

    #[test]
    fn rejects_unknown_fields() {
        let result: Result<Config, _> = toml::from_str(r#"password = "hunter2""#);
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = Config::load(Path::new("/nonexistent/ews.toml")).unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }
}
