//! The base-directory gate.
//!
//! [`BaseDirValidator::validate_base_dir`] establishes a project root and
//! [`BaseDirValidator::validate_path_within_base_dir`] checks every path
//! requested beneath it. Both return canonical paths; callers must do their
//! I/O on the returned path, never on the string they were handed.
//!
//! Nothing is cached between calls. The filesystem can still change between
//! validation and use (a symlink swapped in afterwards); callers narrow that
//! window by using the canonical path immediately and by opening with
//! `O_NOFOLLOW` where the platform offers it.

use crate::canonical::{self, has_null_byte, normalize_lexical};
use crate::containment::is_within;
use crate::validation_error::{ValidationError, ValidationResult};
use crate::workspace;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Require the base dir to sit inside the workspace root, if one is set.
    pub check_within_workspace: bool,
}

impl ValidateOptions {
    pub fn within_workspace() -> Self {
        Self { check_within_workspace: true }
    }
}

/// Validator bound to an explicit workspace root (`None` disables the
/// workspace check).
#[derive(Debug, Clone, Default)]
pub struct BaseDirValidator {
    workspace_root: Option<PathBuf>,
}

impl BaseDirValidator {
    pub fn new(workspace_root: Option<PathBuf>) -> Self {
        Self { workspace_root }
    }

    /// Snapshot of the process-wide registry at call time.
    pub fn from_registry() -> Self {
        Self::new(workspace::current_workspace_root())
    }

    pub fn workspace_root(&self) -> Option<&Path> {
        self.workspace_root.as_deref()
    }

    pub fn validate_base_dir(
        &self,
        path: impl AsRef<Path>,
        options: ValidateOptions,
    ) -> ValidationResult<PathBuf> {
        let path = path.as_ref();
        let real = self.check_base_dir(path, options).map_err(log_rejection)?;
        debug!(base_dir = %real.display(), "base directory accepted");
        Ok(real)
    }

    pub fn validate_path_within_base_dir(
        &self,
        candidate: impl AsRef<Path>,
        base_dir: impl AsRef<Path>,
    ) -> ValidationResult<PathBuf> {
        let candidate = candidate.as_ref();
        let resolved = self
            .check_candidate(candidate, base_dir.as_ref())
            .map_err(log_rejection)?;
        debug!(path = %candidate.display(), resolved = %resolved.display(), "path accepted");
        Ok(resolved)
    }

    fn check_base_dir(&self, path: &Path, options: ValidateOptions) -> ValidationResult<PathBuf> {
        check_input(path)?;

        let real = match dunce::canonicalize(path) {
            Ok(real) => real,
            Err(e) if canonical::is_missing(&e) => return Err(ValidationError::not_exist(path)),
            Err(e) => return Err(ValidationError::unresolvable(path, &e)),
        };
        let meta = fs::metadata(&real).map_err(|e| ValidationError::unresolvable(path, &e))?;
        if !meta.is_dir() {
            return Err(ValidationError::not_directory(path));
        }

        if options.check_within_workspace {
            if let Some(root) = &self.workspace_root {
                let real_root = canonical::resolve(root)
                    .map_err(|e| ValidationError::unresolvable(root, &e))?;
                if !is_within(&real, &real_root) {
                    return Err(ValidationError::outside_workspace(path, &real_root));
                }
            }
        }
        Ok(real)
    }

    fn check_candidate(&self, candidate: &Path, base_dir: &Path) -> ValidationResult<PathBuf> {
        check_input(candidate)?;
        let real_base = self.check_base_dir(base_dir, ValidateOptions::default())?;

        let joined = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            real_base.join(candidate)
        };
        let resolved = canonical::resolve(&normalize_lexical(&joined))
            .map_err(|e| ValidationError::unresolvable(candidate, &e))?;

        if !is_within(&resolved, &real_base) {
            return Err(ValidationError::path_escape(candidate, &resolved, &real_base));
        }
        Ok(resolved)
    }
}

fn check_input(path: &Path) -> ValidationResult<()> {
    if path.as_os_str().is_empty() {
        return Err(ValidationError::invalid_input(path, "path is empty"));
    }
    if has_null_byte(path) {
        return Err(ValidationError::invalid_input(path, "path contains a null byte"));
    }
    Ok(())
}

fn log_rejection(err: ValidationError) -> ValidationError {
    warn!(code = err.code().as_str(), path = %err.path().display(), "path rejected");
    err
}

/// [`BaseDirValidator::validate_base_dir`] against the registered workspace root.
pub fn validate_base_dir(
    path: impl AsRef<Path>,
    options: ValidateOptions,
) -> ValidationResult<PathBuf> {
    BaseDirValidator::from_registry().validate_base_dir(path, options)
}

/// [`BaseDirValidator::validate_path_within_base_dir`] against the registered
/// workspace root.
pub fn validate_path_within_base_dir(
    candidate: impl AsRef<Path>,
    base_dir: impl AsRef<Path>,
) -> ValidationResult<PathBuf> {
    BaseDirValidator::from_registry().validate_path_within_base_dir(candidate, base_dir)
}
