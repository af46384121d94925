use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Closed set of reasons a path can be refused. None of them is transient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidInput,
    NotExist,
    NotDirectory,
    OutsideWorkspace,
    PathEscape,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::NotExist => "NOT_EXIST",
            ErrorCode::NotDirectory => "NOT_DIRECTORY",
            ErrorCode::OutsideWorkspace => "OUTSIDE_WORKSPACE",
            ErrorCode::PathEscape => "PATH_ESCAPE",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const RECREATE_HINT: &str =
    "delete the stored project root reference and recreate it by selecting the project folder again";

const UNRESOLVABLE_HINT: &str =
    "check that every symbolic link along the path points somewhere that exists and is readable";

/// A refused path. The message always names the offending path; the display
/// form appends the remediation hint when there is one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}{}", hint_suffix(.hint))]
pub struct ValidationError {
    code: ErrorCode,
    message: String,
    path: PathBuf,
    hint: Option<String>,
}

impl ValidationError {
    pub fn invalid_input(path: &Path, reason: &str) -> Self {
        Self {
            code: ErrorCode::InvalidInput,
            message: format!("invalid path {:?}: {reason}", path.as_os_str()),
            path: path.to_path_buf(),
            hint: Some(RECREATE_HINT.to_string()),
        }
    }

    pub fn unresolvable(path: &Path, err: &std::io::Error) -> Self {
        Self {
            code: ErrorCode::InvalidInput,
            message: format!("cannot resolve path {}: {err}", path.display()),
            path: path.to_path_buf(),
            hint: Some(UNRESOLVABLE_HINT.to_string()),
        }
    }

    pub fn not_exist(path: &Path) -> Self {
        Self {
            code: ErrorCode::NotExist,
            message: format!("base directory does not exist: {}", path.display()),
            path: path.to_path_buf(),
            hint: Some(RECREATE_HINT.to_string()),
        }
    }

    pub fn not_directory(path: &Path) -> Self {
        Self {
            code: ErrorCode::NotDirectory,
            message: format!("base directory is not a directory: {}", path.display()),
            path: path.to_path_buf(),
            hint: Some(RECREATE_HINT.to_string()),
        }
    }

    pub fn outside_workspace(path: &Path, workspace_root: &Path) -> Self {
        Self {
            code: ErrorCode::OutsideWorkspace,
            message: format!(
                "base directory {} is outside the workspace root {}",
                path.display(),
                workspace_root.display()
            ),
            path: path.to_path_buf(),
            hint: Some("choose a project folder inside the open workspace".to_string()),
        }
    }

    pub fn path_escape(requested: &Path, resolved: &Path, base_dir: &Path) -> Self {
        Self {
            code: ErrorCode::PathEscape,
            message: format!(
                "path {} resolves to {} which escapes base directory {}",
                requested.display(),
                resolved.display(),
                base_dir.display()
            ),
            path: requested.to_path_buf(),
            hint: None,
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The path as the caller supplied it.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }
}

fn hint_suffix(hint: &Option<String>) -> String {
    hint.as_deref().map(|h| format!(" (hint: {h})")).unwrap_or_default()
}

pub type ValidationResult<T> = Result<T, ValidationError>;
