use anyhow::Result;
use hemo_infrastructure::ConfigService;
use std::path::Path;

/// Prints the resolved config path, or the effective configuration as TOML.
pub fn run(config_path: Option<&Path>, path_only: bool) -> Result<()> {
    let service = ConfigService::from_env(config_path)?;
    if path_only {
        println!("{}", service.path().display());
        return Ok(());
    }

    let config = service.get_config()?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}
