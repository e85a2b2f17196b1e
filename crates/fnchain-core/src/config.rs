use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::percent::Percentage;
use crate::synth::{DEFAULT_ATTRIBUTE, SourceMarking, SynthesisOptions};
use crate::templates::TEMPLATE_SUFFIX;

/// Project config file, looked up in the project root.
pub const PROJECT_CONFIG_FILE: &str = ".fnchain.toml";

/// Backend config file name used when none is configured.
pub const DEFAULT_BACKEND_CONFIG: &str = "backend-config.json";

/// Directory holding one sub-directory per function.
pub const DEFAULT_FUNCTION_DIR: &str = "function";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub serialize: SerializeConfig,
    #[serde(default)]
    pub templates: TemplateConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializeConfig {
    #[serde(default)]
    pub percentage: Percentage,
    #[serde(default = "default_attribute")]
    pub attribute: String,
    #[serde(default = "default_backend_config")]
    pub config_file: PathBuf,
    #[serde(default)]
    pub every_source: bool,
}

impl Default for SerializeConfig {
    fn default() -> Self {
        Self {
            percentage: Percentage::default(),
            attribute: default_attribute(),
            config_file: default_backend_config(),
            every_source: false,
        }
    }
}

impl SerializeConfig {
    #[must_use]
    pub fn synthesis_options(&self) -> SynthesisOptions {
        SynthesisOptions {
            percentage: self.percentage,
            attribute: self.attribute.clone(),
            marking: if self.every_source {
                SourceMarking::EverySource
            } else {
                SourceMarking::FirstEdgeOnly
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    #[serde(default = "default_function_dir")]
    pub function_dir: PathBuf,
    #[serde(default = "default_template_suffix")]
    pub suffix: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            function_dir: default_function_dir(),
            suffix: default_template_suffix(),
        }
    }
}

/// Load `<project_root>/.fnchain.toml`, or defaults when it does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed
/// (including an out-of-range `percentage`).
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(PROJECT_CONFIG_FILE);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn default_attribute() -> String {
    DEFAULT_ATTRIBUTE.to_string()
}

fn default_backend_config() -> PathBuf {
    PathBuf::from(DEFAULT_BACKEND_CONFIG)
}

fn default_function_dir() -> PathBuf {
    PathBuf::from(DEFAULT_FUNCTION_DIR)
}

fn default_template_suffix() -> String {
    TEMPLATE_SUFFIX.to_string()
}
