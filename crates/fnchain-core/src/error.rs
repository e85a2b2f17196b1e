use std::fmt;

use crate::percent::PercentageError;
use crate::store::StoreError;
use crate::synth::ChainError;
use crate::templates::TemplateError;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigNotFound,
    ConfigParseError,
    MissingFunctions,
    InvalidPercentage,
    ProjectConfigError,
    CycleDetected,
    TemplateMissing,
    TemplateParseError,
    ConfigWriteFailed,
    TemplateWriteFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigNotFound => "E1001",
            Self::ConfigParseError => "E1002",
            Self::MissingFunctions => "E1003",
            Self::InvalidPercentage => "E1004",
            Self::ProjectConfigError => "E1005",
            Self::CycleDetected => "E2001",
            Self::TemplateMissing => "E3001",
            Self::TemplateParseError => "E3002",
            Self::ConfigWriteFailed => "E5001",
            Self::TemplateWriteFailed => "E5002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigNotFound => "Backend config not found",
            Self::ConfigParseError => "Backend config parse error",
            Self::MissingFunctions => "Backend config has no function map",
            Self::InvalidPercentage => "Invalid serialization percentage",
            Self::ProjectConfigError => "Project config error",
            Self::CycleDetected => "Circular dependency detected",
            Self::TemplateMissing => "Function template missing",
            Self::TemplateParseError => "Function template parse error",
            Self::ConfigWriteFailed => "Backend config write failed",
            Self::TemplateWriteFailed => "Function template write failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigNotFound => {
                Some("Run from the backend directory or pass --config <PATH>.")
            }
            Self::ConfigParseError => Some("Fix the JSON syntax of the backend config and retry."),
            Self::MissingFunctions => {
                Some("Add a \"function\" object mapping function names to config items.")
            }
            Self::InvalidPercentage => Some("Pass --serialization with a value from 0 to 100."),
            Self::ProjectConfigError => Some("Fix syntax in .fnchain.toml and retry."),
            Self::CycleDetected => Some(
                "Nothing was written. Remove a dependency on the reported path or lower --serialization.",
            ),
            Self::TemplateMissing => Some(
                "Add a *cloudformation-template.json to each listed function directory, then rerun.",
            ),
            Self::TemplateParseError => Some("Fix the JSON syntax of the function template."),
            Self::ConfigWriteFailed | Self::TemplateWriteFailed => {
                Some("Check disk space and write permissions.")
            }
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Any failure surfaced by the core, tagged with its [`ErrorCode`].
#[derive(Debug, thiserror::Error)]
pub enum FnchainError {
    #[error(transparent)]
    Percentage(#[from] PercentageError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl FnchainError {
    #[must_use]
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Percentage(e) => e.error_code(),
            Self::Store(e) => e.error_code(),
            Self::Chain(e) => e.error_code(),
            Self::Template(e) => e.error_code(),
        }
    }

    /// Remediation text for operators; falls back to the code's message.
    #[must_use]
    pub fn suggestion(&self) -> String {
        let code = self.error_code();
        code.hint().unwrap_or(code.message()).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorCode, FnchainError};
    use crate::percent::Percentage;
    use std::collections::HashSet;

    const ALL: [ErrorCode; 11] = [
        ErrorCode::ConfigNotFound,
        ErrorCode::ConfigParseError,
        ErrorCode::MissingFunctions,
        ErrorCode::InvalidPercentage,
        ErrorCode::ProjectConfigError,
        ErrorCode::CycleDetected,
        ErrorCode::TemplateMissing,
        ErrorCode::TemplateParseError,
        ErrorCode::ConfigWriteFailed,
        ErrorCode::TemplateWriteFailed,
        ErrorCode::InternalUnexpected,
    ];

    #[test]
    fn all_codes_are_unique() {
        let mut seen = HashSet::new();
        for code in ALL {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        for code in ALL {
            let s = code.code();
            assert_eq!(s.len(), 5);
            assert!(s.starts_with('E'));
            assert!(s.chars().skip(1).all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn wrapped_error_keeps_code_and_suggestion() {
        let err = FnchainError::from(Percentage::new(120).expect_err("out of range"));
        assert_eq!(err.error_code(), ErrorCode::InvalidPercentage);
        assert!(err.suggestion().contains("--serialization"));
        assert!(err.to_string().contains("120"));
    }
}
