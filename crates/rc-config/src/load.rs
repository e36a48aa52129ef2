//! Policy loading: resolve, read, validate, snapshot.

use std::path::Path;

use crate::policy::Policy;
use crate::preset::{get_preset, PresetName};
use crate::resolve::{resolve_policy, ConfigSource, PolicyPath};
use crate::snapshot::ConfigSnapshot;
use crate::validate::{validate_policy, ValidationError, ValidationResult};

/// A validated policy plus how it was obtained.
#[derive(Debug, Clone)]
pub struct LoadedPolicy {
    pub policy: Policy,
    pub snapshot: ConfigSnapshot,
}

/// Load the effective policy.
///
/// An explicit preset takes precedence over file discovery; otherwise the
/// resolution order of [`resolve_policy`] applies and the built-in default
/// is used when no file is found. The result is always validated.
pub fn load_policy(
    cli_policy: Option<&Path>,
    preset: Option<PresetName>,
) -> ValidationResult<LoadedPolicy> {
    if let Some(name) = preset {
        let policy = get_preset(name);
        validate_policy(&policy)?;
        let path = PolicyPath {
            path: None,
            source: ConfigSource::Preset,
        };
        let snapshot = ConfigSnapshot::new(&policy, &path, None);
        return Ok(LoadedPolicy { policy, snapshot });
    }

    let resolved = resolve_policy(cli_policy);
    let (policy, raw) = match &resolved.path {
        Some(path) => {
            let raw = std::fs::read_to_string(path).map_err(|e| {
                ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
            })?;
            (Policy::parse_json(&raw)?, Some(raw))
        }
        None => (Policy::default(), None),
    };

    validate_policy(&policy)?;
    let snapshot = ConfigSnapshot::new(&policy, &resolved, raw.as_deref());
    Ok(LoadedPolicy { policy, snapshot })
}
