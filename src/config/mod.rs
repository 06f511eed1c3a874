mod init;

pub use init::{run_init_wizard, write_profile};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::estimator::{Preset, Profile};

/// Get the config directory path (~/.config/salary-estimator/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("salary-estimator"))
}

/// Get the default profile path (~/.config/salary-estimator/profile.yaml)
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("profile.yaml"))
}

/// Ensure the parent directory of `path` exists
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory at {}", dir.display()))?;
        }
    }
    Ok(())
}

/// Resolve the profile to score with.
///
/// Precedence: an explicit `path`, then an explicit `preset`, then the
/// default profile file if one exists, then the standard preset.
///
/// # Errors
///
/// Returns an error if:
/// - An explicit profile file does not exist
/// - A profile file cannot be read
/// - The YAML cannot be parsed
pub fn load_profile(path: Option<PathBuf>, preset: Option<Preset>) -> Result<Profile> {
    if let Some(path) = path {
        if !path.exists() {
            anyhow::bail!("Profile file not found at {}", path.display());
        }
        return load_profile_file(&path);
    }

    if let Some(preset) = preset {
        info!(%preset, "using built-in preset");
        return Ok(preset.profile());
    }

    // No home directory just means no default file
    match get_config_path() {
        Ok(default_path) if default_path.exists() => load_profile_file(&default_path),
        _ => {
            info!("no profile file found, using standard preset");
            Ok(Preset::Standard.profile())
        }
    }
}

/// Load a profile from a YAML file
pub fn load_profile_file(path: &Path) -> Result<Profile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile at {}", path.display()))?;

    let profile: Profile = serde_saphyr::from_str(&content)
        .with_context(|| format!("Failed to parse profile: invalid YAML in {}", path.display()))?;

    info!(path = %path.display(), name = %profile.name, "loaded profile");
    Ok(profile)
}
