// ABOUTME: Config command implementation.
// ABOUTME: Prints the config path or effective settings and writes a default file.

use chirp_core::Config;

use super::ConfigAction;
use crate::error::{AppError, Result};

/// Effective configuration as TOML
pub fn render_config(config: &Config) -> Result<String> {
    toml::to_string_pretty(config).map_err(|e| AppError::Config(e.to_string()))
}

pub fn run(action: Option<ConfigAction>, config: &Config) -> Result<()> {
    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Path => println!("{}", Config::config_path().display()),
        ConfigAction::Show => print!("{}", render_config(config)?),
        ConfigAction::Init => {
            let path = Config::init()?;
            println!("Config file: {}", path.display());
        }
    }
    Ok(())
}
