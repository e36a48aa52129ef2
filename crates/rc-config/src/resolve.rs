//! Policy file resolution and path discovery.
//!
//! Resolution order: CLI argument → environment variables → XDG path →
//! system path → built-in defaults.

use std::path::{Path, PathBuf};

/// Where the policy file was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/riskcast/.
    SystemConfig,

    /// Selected by preset name.
    Preset,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::SystemConfig => write!(f, "system config"),
            ConfigSource::Preset => write!(f, "preset"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Discovered policy path.
#[derive(Debug, Clone, Default)]
pub struct PolicyPath {
    /// Path to policy.json (or None if not found).
    pub path: Option<PathBuf>,

    /// Source of the policy (for diagnostics).
    pub source: ConfigSource,
}

/// Environment variable names.
pub const ENV_POLICY_PATH: &str = "RC_POLICY";
pub const ENV_CONFIG_DIR: &str = "RC_CONFIG_DIR";

/// Standard config file name.
const POLICY_FILENAME: &str = "policy.json";

/// Application name for XDG directories.
const APP_NAME: &str = "riskcast";

/// Resolve the policy path.
///
/// 1. Explicit CLI path (returned even if missing, so the load reports it)
/// 2. `RC_POLICY`
/// 3. `RC_CONFIG_DIR` + `policy.json`
/// 4. XDG config directory (`~/.config/riskcast/`)
/// 5. System config (`/etc/riskcast/`)
/// 6. Built-in defaults (None)
pub fn resolve_policy(cli_policy: Option<&Path>) -> PolicyPath {
    if let Some(path) = cli_policy {
        return PolicyPath {
            path: Some(path.to_path_buf()),
            source: ConfigSource::CliArgument,
        };
    }

    if let Ok(env_path) = std::env::var(ENV_POLICY_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return PolicyPath {
                path: Some(path),
                source: ConfigSource::Environment,
            };
        }
    }

    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = PathBuf::from(config_dir).join(POLICY_FILENAME);
        if path.exists() {
            return PolicyPath {
                path: Some(path),
                source: ConfigSource::Environment,
            };
        }
    }

    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(POLICY_FILENAME);
        if path.exists() {
            return PolicyPath {
                path: Some(path),
                source: ConfigSource::XdgConfig,
            };
        }
    }

    let system_path = system_config_dir().join(POLICY_FILENAME);
    if system_path.exists() {
        return PolicyPath {
            path: Some(system_path),
            source: ConfigSource::SystemConfig,
        };
    }

    PolicyPath::default()
}

/// Get the XDG config directory for riskcast.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the system config directory.
pub fn system_config_dir() -> PathBuf {
    PathBuf::from("/etc").join(APP_NAME)
}
