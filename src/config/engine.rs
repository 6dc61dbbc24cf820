//! Engine configuration (_mustache.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::render::{DEFAULT_EXTENSION, DEFAULT_MAX_PARTIAL_DEPTH};

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "_mustache.yml";

/// How name tags are escaped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscapeMode {
    #[default]
    Html,
    None,
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory templates and partials are read from
    pub template_dir: String,
    /// Extension of template files, without the dot
    pub extension: String,
    /// Maximum nesting of partial inclusion
    pub max_partial_depth: usize,
    pub escape: EscapeMode,
    /// Data file used when none is given on the command line
    pub data: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            template_dir: ".".to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            max_partial_depth: DEFAULT_MAX_PARTIAL_DEPTH,
            escape: EscapeMode::Html,
            data: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: EngineConfig = serde_yaml::from_str(&content)?;
        tracing::debug!("Loaded config from {:?}", path.as_ref());
        Ok(config)
    }

    /// Load `_mustache.yml` from `base_dir`, or fall back to defaults
    pub fn load_or_default<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let path = base_dir.as_ref().join(CONFIG_FILE);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Template directory resolved against `base_dir`
    pub fn template_root(&self, base_dir: &Path) -> PathBuf {
        let dir = Path::new(&self.template_dir);
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            base_dir.join(dir)
        }
    }

    /// Append the template extension to `name` unless it already has one
    pub fn template_file(&self, name: &str) -> PathBuf {
        let path = PathBuf::from(name);
        if path.extension().is_some() || self.extension.is_empty() {
            path
        } else {
            path.with_extension(&self.extension)
        }
    }
}
