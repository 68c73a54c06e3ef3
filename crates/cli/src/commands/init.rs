use anyhow::{Context, Result};
use std::{env, path::Path, path::PathBuf};
use tracing::info;

use runs_core::config::{RunsConfig, Toggle, CONFIG_FILE_NAMES};

pub fn init_command(cwd: Option<&Path>, force: bool) -> Result<()> {
    let project_root = match cwd {
        Some(cwd) => PathBuf::from(cwd),
        None => env::current_dir().context("Failed to get current directory")?,
    };

    let config_path = project_root.join(CONFIG_FILE_NAMES[0]);
    if config_path.exists() && !force {
        println!("❌ Config already exists at: {}", config_path.display());
        println!("   Use --force to overwrite");
        return Ok(());
    }

    let config = default_config();
    config
        .save_to_file(&config_path)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    info!("Wrote {}", config_path.display());
    println!("✅ Created config: {}", config_path.display());
    Ok(())
}

/// Starting point written by `init`: echo lines, stop on the first failure
pub fn default_config() -> RunsConfig {
    RunsConfig {
        echo: Some(Toggle::Enabled(true)),
        on_exception: Some(Toggle::Enabled(false)),
        encoding: Some("utf8".to_string()),
        ..Default::default()
    }
}
