//! Error taxonomy for the synthesis core.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Validation rule families, in the order the validator evaluates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationRule {
    FormatVersion,
    Name,
    Version,
    Description,
    Metadata,
    Requirements,
    Install,
    CommandSafety,
    Services,
    ConfigSchema,
}

impl ValidationRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationRule::FormatVersion => "format-version",
            ValidationRule::Name => "name",
            ValidationRule::Version => "version",
            ValidationRule::Description => "description",
            ValidationRule::Metadata => "metadata",
            ValidationRule::Requirements => "requirements",
            ValidationRule::Install => "install",
            ValidationRule::CommandSafety => "command-safety",
            ValidationRule::Services => "services",
            ValidationRule::ConfigSchema => "config-schema",
        }
    }
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A manifest violated a structural or security rule.
///
/// Only the first violated rule is reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("manifest '{manifest}' failed {rule} check: {message}")]
pub struct ValidationError {
    pub manifest: String,
    pub rule: ValidationRule,
    pub message: String,
}

impl ValidationError {
    pub fn new(manifest: &str, rule: ValidationRule, message: impl Into<String>) -> Self {
        Self {
            manifest: manifest.to_string(),
            rule,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("manifest name '{0}' is declared more than once")]
    DuplicateManifest(String),

    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown client '{0}'")]
    UnknownClient(String),

    #[error("unexpected structure in {}: {message}", path.display())]
    MalformedArtifact { path: PathBuf, message: String },
}

impl Error {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
