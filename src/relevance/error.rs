use thiserror::Error;

use crate::command::CommandError;
use crate::graph::TreeError;
use crate::parser::ParseError;

/// Reasons a file or scope cannot see the instrumented package.
///
/// Payloads are rendered to strings so a failed dependency-tree load can be
/// cached and handed to every caller that asks for the same key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelevanceError {
    #[error("no installation of {package} reachable from {path}")]
    NoInstallationFound { package: String, path: String },

    #[error("no node_modules directory found above {0}")]
    NoNodeModulesFound(String),

    #[error("no package.json found above {0}")]
    NoPackageJsonFound(String),

    #[error("{path} is not inside root {root}")]
    InvalidRootPath { root: String, path: String },

    #[error("command failed: {0}")]
    Command(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("invalid JSON: {0}")]
    Json(String),
}

impl From<CommandError> for RelevanceError {
    fn from(e: CommandError) -> Self {
        RelevanceError::Command(e.to_string())
    }
}

impl From<TreeError> for RelevanceError {
    fn from(e: TreeError) -> Self {
        RelevanceError::Json(e.to_string())
    }
}

impl From<ParseError> for RelevanceError {
    fn from(e: ParseError) -> Self {
        match e {
            ParseError::IoError(e) => RelevanceError::Io(e.to_string()),
            other => RelevanceError::Json(other.to_string()),
        }
    }
}

impl From<std::io::Error> for RelevanceError {
    fn from(e: std::io::Error) -> Self {
        RelevanceError::Io(e.to_string())
    }
}
