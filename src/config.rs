//! Runtime configuration
//!
//! Values come from the environment; command-line flags override them.

use std::path::PathBuf;

/// Overrides the log directory
pub const LOG_DIR_ENV: &str = "GPO_MANAGER_LOG_DIR";

/// Domain used when `--domain` is not given
pub const DOMAIN_ENV: &str = "GPO_MANAGER_DOMAIN";

/// Filter directive for the log file, e.g. `gpo_manager=debug`
pub const LOG_FILTER_ENV: &str = "GPO_MANAGER_LOG";

/// Default filter for the log file
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub log_dir: PathBuf,
    pub log_filter: String,
    pub default_domain: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_dir: get_executable_dir(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            default_domain: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            log_dir: get(LOG_DIR_ENV).map(PathBuf::from).unwrap_or(defaults.log_dir),
            log_filter: get(LOG_FILTER_ENV)
                .or_else(|| get("RUST_LOG"))
                .unwrap_or(defaults.log_filter),
            default_domain: get(DOMAIN_ENV).map(|d| d.trim().to_string()),
        }
    }

    /// The domain to operate on: the flag wins over the environment
    pub fn resolve_domain(&self, flag: Option<&str>) -> Option<String> {
        flag.map(str::to_string).or_else(|| self.default_domain.clone())
    }
}

/// Get the directory containing the executable
fn get_executable_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}
