//! Collaborator tables supplied by the host tool.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::debug;

use crate::{format::Format, Result};

fn default_formats() -> Vec<Format> {
    Format::ALL.to_vec()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Formats the parsers will accept, in order of preference.
    #[serde(default = "default_formats")]
    pub accepted_formats: Vec<Format>,

    /// NDK label -> install path.
    #[serde(default)]
    pub ndk_paths: BTreeMap<String, PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            accepted_formats: default_formats(),
            ndk_paths: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        debug!(
            "Loaded config from {}: formats [{}], {} NDK path(s)",
            path.display(),
            config
                .accepted_formats
                .iter()
                .map(Format::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            config.ndk_paths.len()
        );
        Ok(config)
    }
}
