//! Fill the process environment from a project `.env` and the user's
//! `<config home>/<app>/config.toml` `[env]` table.
//!
//! Precedence for each key: **existing environment > `.env` > config.toml**. Keys that
//! are already set are never touched.

mod dotenv;
mod xdg_toml;

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

pub use dotenv::parse as parse_dotenv;
pub use xdg_toml::config_home;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("read config.toml: {0}")]
    XdgRead(std::io::Error),
    #[error("parse config.toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("read .env: {0}")]
    DotenvRead(std::io::Error),
}

/// Values found in both sources, before they are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSources {
    pub dotenv: HashMap<String, String>,
    pub xdg: HashMap<String, String>,
}

impl EnvSources {
    /// Reads `.env` from `dotenv_dir` (or the current directory) and config.toml from
    /// `config_home` (or [`config_home()`]).
    pub fn load(
        app_name: &str,
        dotenv_dir: Option<&Path>,
        config_home: Option<&Path>,
    ) -> Result<Self, LoadError> {
        let xdg = match config_home {
            Some(home) => xdg_toml::load_env_map_in(home, app_name)?,
            None => xdg_toml::load_env_map(app_name)?,
        };
        let dotenv = dotenv::load_env_map(dotenv_dir).map_err(LoadError::DotenvRead)?;
        Ok(Self { dotenv, xdg })
    }

    /// Values to set: `.env` over config.toml, minus keys for which `is_set` is true.
    pub fn resolve<F>(&self, is_set: F) -> HashMap<String, String>
    where
        F: Fn(&str) -> bool,
    {
        let mut merged = self.xdg.clone();
        merged.extend(self.dotenv.clone());
        merged.retain(|key, _| !is_set(key));
        merged
    }
}

/// Loads both sources and sets every variable that is not already in the environment.
///
/// * `app_name`: directory under the config home, e.g. `"deepresearch"`.
/// * `override_dir`: directory holding `.env`; defaults to the current directory.
pub fn load_and_apply(app_name: &str, override_dir: Option<&Path>) -> Result<(), LoadError> {
    let sources = EnvSources::load(app_name, override_dir, None)?;
    for (key, value) in sources.resolve(|key| std::env::var_os(key).is_some()) {
        std::env::set_var(key, value);
    }
    Ok(())
}
