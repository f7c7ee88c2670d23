use anyhow::{anyhow, Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::github::DEFAULT_API_URL;

/// Optional configuration file for ghmon
///
/// Every value can also come from the command line; flags win over the
/// environment, which wins over this file.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    /// GitHub API access
    #[serde(default)]
    pub github: GitHubConfig,

    /// Report delivery
    #[serde(default)]
    pub notify: NotifyConfig,

    /// HTTP behaviour
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// GitHub configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GitHubConfig {
    /// REST API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Organization to monitor
    pub org: Option<String>,

    /// Personal access token
    pub token: Option<String>,
}

/// Notification configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct NotifyConfig {
    /// Chat webhook URL; reports go to the console when unset
    pub webhook_url: Option<String>,
}

/// HTTP client configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    /// Timeout for each HTTP call in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Maximum member repository fetches in flight
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String, // "info"
}

// Default value functions
fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}
fn default_timeout() -> u64 {
    30
}
fn default_max_parallel() -> usize {
    4
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            org: None,
            token: None,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            max_parallel: default_max_parallel(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Validated values for a single run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub org: String,
    pub webhook_url: Option<String>,
    pub token: String,
    pub api_url: String,
    pub timeout: Duration,
    pub max_parallel: usize,
}

impl Config {
    /// Load from `path` if given, else from the default location when it exists
    ///
    /// Unlike an explicit path, a missing default file is not an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Self::default_config_path()?;
                if default_path.exists() {
                    Self::load(&default_path)
                } else {
                    tracing::debug!("No configuration at {:?}, using defaults", default_path);
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        config.expand_values()?;

        tracing::debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Get the default configuration file path (XDG compliant)
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().context("Failed to get user config directory")?;

        Ok(config_dir.join("ghmon").join("config.yml"))
    }

    /// Expand `${VAR}` and `~` in string values
    pub fn expand_values(&mut self) -> Result<()> {
        fn expand(value: &mut Option<String>, name: &str) -> Result<()> {
            if let Some(raw) = value.as_deref() {
                let expanded = shellexpand::full(raw)
                    .with_context(|| format!("Failed to expand {}", name))?
                    .into_owned();
                *value = Some(expanded);
            }
            Ok(())
        }

        self.github.api_url = shellexpand::full(&self.github.api_url)
            .context("Failed to expand github.api_url")?
            .into_owned();
        expand(&mut self.github.org, "github.org")?;
        expand(&mut self.github.token, "github.token")?;
        expand(&mut self.notify.webhook_url, "notify.webhook_url")?;

        Ok(())
    }

    /// Organization from the command line, falling back to the file
    pub fn resolve_org(&self, org: Option<String>) -> Option<String> {
        non_empty(org).or_else(|| non_empty(self.github.org.clone()))
    }

    /// Combine command-line values with this file into run settings
    ///
    /// Fails when no organization or no token is available. An empty
    /// webhook URL means console output.
    pub fn settings(
        &self,
        org: Option<String>,
        webhook_url: Option<String>,
        token: Option<String>,
    ) -> Result<Settings> {
        let org = self
            .resolve_org(org)
            .ok_or_else(|| anyhow!("Please specify --org or set github.org in the config file"))?;

        let token = non_empty(token)
            .or_else(|| non_empty(self.github.token.clone()))
            .ok_or_else(|| {
                anyhow!("Please specify --pat or set GITHUB_PAT environment variable")
            })?;

        let webhook_url = non_empty(webhook_url).or_else(|| non_empty(self.notify.webhook_url.clone()));

        Ok(Settings {
            org,
            webhook_url,
            token,
            api_url: self.github.api_url.clone(),
            timeout: Duration::from_secs(self.http.timeout.max(1)),
            max_parallel: self.http.max_parallel.max(1),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
