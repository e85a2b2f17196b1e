//! Template parameter updater.
//!
//! Every function directory (`<root>/<function_dir>/<name>/`) holds a
//! CloudFormation template. A function that depends on another function
//! needs one template parameter per consumed attribute, named
//! `function<ResourceName><Attribute>`. This module adds the parameters that
//! are missing.
//!
//! The update is all-or-nothing at the locate step: if any function has no
//! template, the missing names are returned as one batch and no template is
//! touched.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{debug, info, instrument, warn};

use crate::config::TemplateConfig;
use crate::error::ErrorCode;
use crate::model::{Function, FunctionSet};

/// File name suffix identifying a function's template.
pub const TEMPLATE_SUFFIX: &str = "cloudformation-template.json";

const PARAMETERS_KEY: &str = "Parameters";

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("failed to read template {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid JSON in template {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("template {} is not a JSON object", path.display())]
    NotAnObject { path: PathBuf },

    #[error("\"Parameters\" in template {} is not a JSON object", path.display())]
    InvalidParameters { path: PathBuf },

    #[error("failed to write template {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

impl TemplateError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Read { .. }
            | Self::Parse { .. }
            | Self::NotAnObject { .. }
            | Self::InvalidParameters { .. } => ErrorCode::TemplateParseError,
            Self::Write { .. } => ErrorCode::TemplateWriteFailed,
        }
    }
}

/// Outcome of [`update_templates`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TemplateReport {
    /// Functions without a template. Nothing was updated.
    Missing { functions: Vec<String> },
    /// Every template was found.
    Updated {
        /// Templates rewritten because at least one parameter was added.
        templates: usize,
        parameters_added: usize,
    },
}

impl TemplateReport {
    #[must_use]
    pub const fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Missing { .. } => Some(ErrorCode::TemplateMissing),
            Self::Updated { .. } => None,
        }
    }
}

/// Where templates live on disk.
#[derive(Debug, Clone)]
pub struct TemplateLayout {
    function_root: PathBuf,
    suffix: String,
}

impl TemplateLayout {
    #[must_use]
    pub fn new(project_root: &Path, config: &TemplateConfig) -> Self {
        Self {
            function_root: project_root.join(&config.function_dir),
            suffix: config.suffix.clone(),
        }
    }

    #[must_use]
    pub fn function_dir(&self, name: &str) -> PathBuf {
        self.function_root.join(name)
    }

    /// First file (by name) in the function's directory ending with the
    /// template suffix. Symlinks are followed. An unreadable or absent
    /// directory has no template.
    #[must_use]
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        let dir = self.function_dir(name);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "function directory unreadable");
                return None;
            }
        };

        let mut candidates: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_file())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(&self.suffix))
            .map(|entry| entry.path())
            .collect();
        candidates.sort();
        candidates.into_iter().next()
    }
}

/// `function<ResourceName><Attribute>` for every attribute of every
/// `"function"` dependency, in declaration order.
#[must_use]
pub fn parameter_names(function: &Function) -> Vec<String> {
    function
        .dependencies()
        .iter()
        .filter(|dep| dep.is_function())
        .flat_map(|dep| {
            dep.attributes
                .iter()
                .map(move |attr| format!("function{}{}", dep.resource_name, attr))
        })
        .collect()
}

/// Insert each missing parameter into `parameters`. Existing entries are
/// never overwritten. Returns the number added.
pub fn add_parameters(parameters: &mut Map<String, Value>, function_name: &str, names: &[String]) -> usize {
    let mut added = 0;
    for name in names {
        if parameters.contains_key(name) {
            continue;
        }
        parameters.insert(
            name.clone(),
            json!({
                "Type": "String",
                "Description": format!("Parameter for function {function_name}"),
                "Default": name,
            }),
        );
        added += 1;
    }
    added
}

/// Add missing dependency parameters to every function's template.
///
/// # Errors
///
/// Returns a [`TemplateError`] if a located template cannot be read, parsed,
/// or written. Missing templates are not an error; see
/// [`TemplateReport::Missing`].
#[instrument(skip_all, fields(functions = functions.len()))]
pub fn update_templates(
    layout: &TemplateLayout,
    functions: &FunctionSet,
) -> Result<TemplateReport, TemplateError> {
    let mut located = Vec::with_capacity(functions.len());
    let mut missing = Vec::new();
    for (name, function) in functions.iter() {
        match layout.locate(name) {
            Some(path) => located.push((name, function, path)),
            None => missing.push(name.to_string()),
        }
    }

    if !missing.is_empty() {
        warn!(missing = %missing.join(", "), "missing templates; skipping parameter update");
        return Ok(TemplateReport::Missing { functions: missing });
    }

    info!("all function templates found");

    let mut templates = 0;
    let mut parameters_added = 0;
    for (name, function, path) in located {
        let names = parameter_names(function);
        if names.is_empty() {
            continue;
        }
        let added = update_template(&path, name, &names)?;
        if added > 0 {
            templates += 1;
            parameters_added += added;
            debug!(function = name, added, "updated template parameters");
        }
    }

    Ok(TemplateReport::Updated {
        templates,
        parameters_added,
    })
}

fn update_template(path: &Path, function_name: &str, names: &[String]) -> Result<usize, TemplateError> {
    let text = fs::read_to_string(path).map_err(|source| TemplateError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut template: Value = serde_json::from_str(&text).map_err(|source| TemplateError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let Some(root) = template.as_object_mut() else {
        return Err(TemplateError::NotAnObject {
            path: path.to_path_buf(),
        });
    };

    let parameters = root
        .entry(PARAMETERS_KEY)
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(parameters) = parameters.as_object_mut() else {
        return Err(TemplateError::InvalidParameters {
            path: path.to_path_buf(),
        });
    };

    let added = add_parameters(parameters, function_name, names);
    if added == 0 {
        return Ok(0);
    }

    let mut out = serde_json::to_string_pretty(&template).map_err(|source| TemplateError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    out.push('\n');
    fs::write(path, out).map_err(|source| TemplateError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(added)
}
