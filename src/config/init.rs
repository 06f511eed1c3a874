use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use clap::ValueEnum;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::config::{ensure_parent_dir, get_config_path};
use crate::estimator::{validate_profile, Preset, Profile};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Serialize a profile as YAML and write it atomically.
pub fn write_profile(path: &Path, profile: &Profile) -> Result<()> {
    ensure_parent_dir(path)?;

    let yaml = serde_saphyr::to_string(profile).context("Failed to serialize profile")?;

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(yaml.as_bytes())
        .with_context(|| format!("Failed to write profile to {}", path.display()))?;
    file.commit().context("Failed to save profile")?;

    Ok(())
}

/// Run the interactive init wizard to create a profile file.
///
/// If `default_path` is Some, uses that as the profile file path.
/// Otherwise, prompts the user with the default profile path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    println!("Salary Estimator Profile Wizard");
    println!("===============================");
    println!();
    println!("A profile holds the salary tables and rules used for every estimate.");
    println!("  standard  -- median survey salaries, flat language premiums");
    println!("  temporal  -- recent survey years weighted up (2017-2024)");
    println!();

    let preset = loop {
        let input = prompt_with_default("Start from preset", "standard")?;
        match Preset::from_str(&input, true) {
            Ok(preset) => break preset,
            Err(_) => println!("  Invalid: choose 'standard' or 'temporal'. Try again."),
        }
    };

    let mut profile = preset.profile();
    let name = prompt_with_default("Profile name", &profile.name)?;
    profile.name = name;

    let profile_path = match default_path {
        Some(path) => path,
        None => {
            let default = get_config_path()?;
            let input = prompt_with_default("Profile path", &default.display().to_string())?;
            PathBuf::from(input)
        }
    };

    if profile_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Profile already exists at {}. Overwrite?",
                profile_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted. Existing profile left untouched.");
            return Ok(());
        }
    }

    if let Err(errors) = validate_profile(&profile) {
        anyhow::bail!("Generated profile is invalid: {}", errors.join("; "));
    }

    write_profile(&profile_path, &profile)?;

    println!();
    println!("Profile written to {}", profile_path.display());
    println!("Edit the tables there; run `salary-estimator validate` after changes.");
    Ok(())
}
