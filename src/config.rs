use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::error::EbeyeError;

pub const DEFAULT_CONFIG_FILE: &str = "pride-ebeye.json";

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub datasets: Vec<DatasetEntry>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DatasetEntry {
    pub px: String,
    pub submission: String,
    #[serde(default)]
    pub proteins: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub output_dir: Utf8PathBuf,
    pub datasets: Vec<ResolvedDataset>,
}

#[derive(Debug, Clone)]
pub struct ResolvedDataset {
    pub px: Utf8PathBuf,
    pub submission: Utf8PathBuf,
    pub proteins: Option<Utf8PathBuf>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, EbeyeError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Err(EbeyeError::MissingConfig);
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| EbeyeError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| EbeyeError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, EbeyeError> {
        let schema_version = config.schema_version.unwrap_or(1);
        let output_dir = Utf8PathBuf::from(config.output_dir.unwrap_or_else(|| ".".to_string()));

        let datasets = config
            .datasets
            .into_iter()
            .map(|entry| ResolvedDataset {
                px: Utf8PathBuf::from(entry.px),
                submission: Utf8PathBuf::from(entry.submission),
                proteins: entry.proteins.map(Utf8PathBuf::from),
            })
            .collect();

        Ok(ResolvedConfig {
            schema_version,
            output_dir,
            datasets,
        })
    }
}
