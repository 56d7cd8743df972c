use anyhow::{Context, Result};
use hemo_infrastructure::ConfigService;
use hemo_types::ModeCatalog;
use std::path::Path;

pub fn run(config_path: Option<&Path>) -> Result<()> {
    let config = ConfigService::from_env(config_path)?.get_config()?;
    let catalog = ModeCatalog::new(
        &config.modes,
        &config.magnifications,
        &config.engine.default_magnification,
    );

    let json = serde_json::to_string_pretty(&catalog).context("Failed to serialize mode catalog")?;
    println!("{json}");
    Ok(())
}
