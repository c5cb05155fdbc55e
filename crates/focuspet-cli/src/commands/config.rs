use clap::Subcommand;
use focuspet_core::error::Result;
use focuspet_core::{Config, ConfigError};
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "session.focus_minutes", "growth.teen_threshold")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction, dir: &Path) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load(dir);
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(ConfigError::UnknownKey(key).into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load(dir);
            config.set(&key, &value)?;
            config.save(dir)?;
            println!("ok");
        }
        ConfigAction::List => {
            let config = Config::load(dir);
            for (key, value) in config.entries() {
                println!("{key} = {value}");
            }
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save(dir)?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
