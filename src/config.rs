use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::api::ApiOptions;
use crate::error::CargoError;
use crate::export::DEFAULT_COLUMN_WIDTH;

pub const DEFAULT_CONFIG_FILE: &str = "cargodesk.toml";
pub const ENV_PREFIX: &str = "CARGODESK";

#[derive(Debug, Clone, Deserialize)]
pub struct ExportSettings {
    #[serde(default = "default_column_width")]
    pub column_width: f64,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_column_width() -> f64 {
    DEFAULT_COLUMN_WIDTH
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            column_width: default_column_width(),
            output_dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiOptions,
    #[serde(default)]
    pub export: ExportSettings,
    #[serde(default)]
    pub log: LogSettings,
}

impl Settings {
    /// Layers an optional TOML file under `CARGODESK__SECTION__KEY` environment
    /// variables. A missing file is fine; a malformed one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, CargoError> {
        let (file, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let settings = Config::builder()
            .add_source(File::from(file.as_path()).required(required))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let s = Settings::default();
        assert_eq!(s.api.timeout_secs, 30);
        assert_eq!(s.export.column_width, DEFAULT_COLUMN_WIDTH);
        assert_eq!(s.log.level, "warn");
        assert!(s.api.token.is_none());
    }
}
