use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key) {
        Some(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub descriptors: DescriptorConfig,
    pub monitoring: MonitoringConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `RACKER_PROFILE` env var. When set (e.g. `LAB`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("RACKER_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            descriptors: DescriptorConfig::from_env_profiled(p),
            monitoring: MonitoringConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  descriptors: data_dir={}, url_root={}",
            self.descriptors.data_dir.display(),
            self.descriptors.url_root
        );
        tracing::info!(
            "  monitoring:  enabled={}, states_file={}",
            self.monitoring.enabled,
            self.monitoring
                .states_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(none)".to_string())
        );
    }
}

// ── Descriptors ───────────────────────────────────────────────

/// Where rack and model descriptors live, and the URL prefix images are served under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptorConfig {
    pub data_dir: PathBuf,
    pub url_root: String,
}

impl DescriptorConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            data_dir: PathBuf::from(profiled_env_or(p, "RACKER_DATA_DIR", "data/racker-stacker")),
            url_root: profiled_env_or(p, "RACKER_URL_ROOT", "/local/racker-stacker")
                .trim_end_matches('/')
                .to_string(),
        }
    }
}

// ── Monitoring ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// When false no state lookups are made and every sensor reads nominal.
    pub enabled: bool,
    /// Snapshot of live entity states, if one is configured.
    pub states_file: Option<PathBuf>,
}

impl MonitoringConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            enabled: profiled_env_bool(p, "RACKER_MONITORING", true),
            states_file: profiled_env_opt(p, "RACKER_STATES_FILE").map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env vars are process-global, so each test uses its own profile prefix.

    #[test]
    fn profiled_key_wins_over_plain_key() {
        env::set_var("CFGTEST_RACKER_URL_ROOT", "/profiled/");
        let config = Config::for_profile("cfgtest");
        assert_eq!(config.profile, "CFGTEST");
        assert_eq!(config.descriptors.url_root, "/profiled");
        env::remove_var("CFGTEST_RACKER_URL_ROOT");
    }

    #[test]
    fn monitoring_flag_parses_common_spellings() {
        env::set_var("MONTEST_RACKER_MONITORING", "off");
        assert!(!Config::for_profile("montest").monitoring.enabled);
        env::set_var("MONTEST_RACKER_MONITORING", "Yes");
        assert!(Config::for_profile("montest").monitoring.enabled);
        env::remove_var("MONTEST_RACKER_MONITORING");
    }

    #[test]
    fn default_profile_label() {
        let config = Config::for_profile("");
        assert_eq!(config.profile_label(), "default");
    }
}
