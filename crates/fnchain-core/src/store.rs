//! Backend config document I/O.
//!
//! The document is a JSON object whose `function` property maps function
//! names to config items. Only that property is parsed; every other
//! top-level property is carried through untouched and written back in its
//! original position.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::error::ErrorCode;
use crate::model::FunctionSet;

/// Top-level property holding the function map.
pub const FUNCTIONS_KEY: &str = "function";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("invalid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("backend config must be a JSON object")]
    NotAnObject,

    #[error("the \"function\" property is missing in the backend config")]
    MissingFunctions,

    #[error("the \"function\" property of the backend config has no entries")]
    EmptyFunctions,

    #[error("invalid \"function\" property: {0}")]
    InvalidFunctions(#[source] serde_json::Error),

    #[error("failed to encode backend config: {0}")]
    Encode(#[source] serde_json::Error),
}

impl StoreError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::ConfigNotFound,
            Self::Read { .. } | Self::Parse(_) | Self::NotAnObject => ErrorCode::ConfigParseError,
            Self::MissingFunctions | Self::EmptyFunctions | Self::InvalidFunctions(_) => {
                ErrorCode::MissingFunctions
            }
            Self::Write { .. } => ErrorCode::ConfigWriteFailed,
            Self::Encode(_) => ErrorCode::InternalUnexpected,
        }
    }
}

/// A parsed backend config.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    document: Map<String, Value>,
    functions: FunctionSet,
}

impl BackendConfig {
    /// Read and parse the document at `path`.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the file does not exist, otherwise any
    /// read or parse error from [`BackendConfig::parse`].
    #[instrument]
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let text = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                StoreError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let config = Self::parse(&text)?;
        debug!(functions = config.functions.len(), "loaded backend config");
        Ok(config)
    }

    /// Parse a document from text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a JSON object, lacks a `function`
    /// property, or the property is not a well-formed, non-empty function map.
    pub fn parse(text: &str) -> Result<Self, StoreError> {
        let value: Value = serde_json::from_str(text).map_err(StoreError::Parse)?;
        let Value::Object(document) = value else {
            return Err(StoreError::NotAnObject);
        };
        let raw = match document.get(FUNCTIONS_KEY) {
            None | Some(Value::Null) => return Err(StoreError::MissingFunctions),
            Some(raw) => raw.clone(),
        };
        let functions: FunctionSet =
            serde_json::from_value(raw).map_err(StoreError::InvalidFunctions)?;
        if functions.is_empty() {
            return Err(StoreError::EmptyFunctions);
        }
        Ok(Self {
            document,
            functions,
        })
    }

    #[must_use]
    pub fn functions(&self) -> &FunctionSet {
        &self.functions
    }

    /// Swap in a new function map. The rest of the document is kept.
    pub fn replace_functions(&mut self, functions: FunctionSet) {
        self.functions = functions;
    }

    /// Render the document as pretty JSON (2-space indent).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Encode`] if serialization fails.
    pub fn to_json_string(&self) -> Result<String, StoreError> {
        let mut document = self.document.clone();
        let functions = serde_json::to_value(&self.functions).map_err(StoreError::Encode)?;
        document.insert(FUNCTIONS_KEY.to_string(), functions);
        let mut text =
            serde_json::to_string_pretty(&Value::Object(document)).map_err(StoreError::Encode)?;
        text.push('\n');
        Ok(text)
    }

    /// Write the document to `path`, replacing its contents.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] on I/O failure.
    #[instrument(skip(self))]
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let text = self.to_json_string()?;
        fs::write(path, text).map_err(|source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("wrote backend config");
        Ok(())
    }
}
