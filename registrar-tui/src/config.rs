//! Configuration loading for the registrar console.
//!
//! All fields are required unless explicitly marked optional. No defaults.

use crate::nav::View;
use registrar_grid::PageParams;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TuiConfig {
    pub api_base_url: String,
    pub auth: AuthConfig,
    pub request_timeout_ms: u64,
    pub refresh_interval_ms: u64,
    pub toast_ttl_ms: u64,
    pub persistence_path: PathBuf,
    pub log_path: PathBuf,
    pub grid: GridConfig,
    /// Per-screen overrides keyed by screen (`instructors`, `courses`, ...).
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    pub token: String,
    /// Header carrying the token, e.g. `Authorization` or `x-access-token`.
    pub header: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridConfig {
    pub default_page_size: u32,
    pub page_sizes: Vec<u32>,
    pub page_param: String,
    pub limit_param: String,
    pub stale_while_error: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceConfig {
    pub path: Option<String>,
    pub base_query: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or REGISTRAR_TUI_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl GridConfig {
    pub fn page_params(&self) -> PageParams {
        PageParams::new(self.page_param.clone(), self.limit_param.clone())
    }
}

impl TuiConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path_from_args().or_else(config_path_from_env);
        let path = path.ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Override for `view`, if configured.
    pub fn resource(&self, view: View) -> Option<&ResourceConfig> {
        self.resources.get(view.key())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.api_base_url.trim();
        if base.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must start with http:// or https://".to_string(),
            });
        }
        if self.auth.token.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "auth.token",
                reason: "must not be empty".to_string(),
            });
        }
        if self.auth.header.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "auth.header",
                reason: "must not be empty".to_string(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.refresh_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "refresh_interval_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.toast_ttl_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "toast_ttl_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.persistence_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "persistence_path",
                reason: "must not be empty".to_string(),
            });
        }
        if self.log_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "log_path",
                reason: "must not be empty".to_string(),
            });
        }
        if self.grid.page_sizes.is_empty() || self.grid.page_sizes.contains(&0) {
            return Err(ConfigError::InvalidValue {
                field: "grid.page_sizes",
                reason: "must be a non-empty list of positive sizes".to_string(),
            });
        }
        if !self.grid.page_sizes.contains(&self.grid.default_page_size) {
            return Err(ConfigError::InvalidValue {
                field: "grid.default_page_size",
                reason: format!("must be one of {:?}", self.grid.page_sizes),
            });
        }
        if self.grid.page_param.trim().is_empty() || self.grid.limit_param.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "grid.page_param",
                reason: "page_param and limit_param must not be empty".to_string(),
            });
        }
        if self.grid.page_param == self.grid.limit_param {
            return Err(ConfigError::InvalidValue {
                field: "grid.limit_param",
                reason: "must differ from page_param".to_string(),
            });
        }
        for (key, resource) in &self.resources {
            if View::from_key(key).is_none() {
                return Err(ConfigError::InvalidValue {
                    field: "resources",
                    reason: format!("unknown screen '{}'", key),
                });
            }
            if resource.path.as_deref().is_some_and(|p| p.trim().is_empty()) {
                return Err(ConfigError::InvalidValue {
                    field: "resources.path",
                    reason: format!("path for '{}' must not be empty", key),
                });
            }
        }

        // Fetch outcomes are routed back to screens by resource path.
        let mut seen = HashSet::new();
        for view in View::all() {
            let path = crate::views::resource_path(self, *view);
            if !seen.insert(path.clone()) {
                return Err(ConfigError::InvalidValue {
                    field: "resources.path",
                    reason: format!("'{}' is used by more than one screen", path),
                });
            }
        }
        Ok(())
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var("REGISTRAR_TUI_CONFIG").ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
api_base_url = "http://localhost:3001"
request_timeout_ms = 5000
refresh_interval_ms = 250
toast_ttl_ms = 4000
persistence_path = "tmp/registrar-tui.json"
log_path = "tmp/registrar-tui.log"

[auth]
token = "secret"
header = "x-access-token"

[grid]
default_page_size = 10
page_sizes = [3, 5, 10]
page_param = "page"
limit_param = "limit"
stale_while_error = false

[resources.courses]
path = "api/courses"
"#;

    #[test]
    fn test_parses_sample() {
        let config = TuiConfig::from_toml(SAMPLE).unwrap();
        config.validate().unwrap();
        assert_eq!(config.auth.header, "x-access-token");
        assert_eq!(
            config.resource(View::Courses).and_then(|r| r.path.as_deref()),
            Some("api/courses")
        );
        assert!(config.resource(View::Batches).is_none());
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let contents = SAMPLE.replace("toast_ttl_ms = 4000", "toast_ttl_ms = 4000\ntheme = \"dark\"");
        assert!(matches!(
            TuiConfig::from_toml(&contents),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_duplicate_resource_paths_are_rejected() {
        let contents = format!("{SAMPLE}\n[resources.batches]\npath = \"api/courses\"\n");
        let config = TuiConfig::from_toml(&contents).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "resources.path", .. })
        ));
    }

    #[test]
    fn test_unknown_screen_is_rejected() {
        let contents = format!("{SAMPLE}\n[resources.tenants]\npath = \"tenants\"\n");
        let config = TuiConfig::from_toml(&contents).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "resources", .. })
        ));
    }
}
