use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::net::DEFAULT_CONFIGURATION;

/// Simulation settings read from a TOML file. Every key is optional.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct SimConfig {
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_configuration")]
    pub configuration: String,
    #[serde(default)]
    pub stop_at_final: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            seed: None,
            configuration: default_configuration(),
            stop_at_final: false,
        }
    }
}

impl SimConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

fn default_max_steps() -> usize {
    1000
}

fn default_configuration() -> String {
    DEFAULT_CONFIGURATION.to_string()
}
