pub mod fs_read;
pub mod fs_write;
pub mod resolve_path;

use crate::errors::AppError;
use crate::validator::BaseDirValidator;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// The project root every document tool is confined to.
#[derive(Debug, Clone)]
pub struct DocumentRoot {
    validator: BaseDirValidator,
    base_dir: PathBuf,
}

impl DocumentRoot {
    pub fn new(validator: BaseDirValidator, base_dir: PathBuf) -> Self {
        Self { validator, base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Canonical path for `requested`; tools do their I/O on this only.
    pub fn resolve(&self, requested: &str) -> Result<PathBuf, AppError> {
        Ok(self.validator.validate_path_within_base_dir(requested, &self.base_dir)?)
    }
}

pub(crate) fn required_str<'a>(params: &'a serde_json::Value, key: &str) -> Result<&'a str, AppError> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| AppError::ToolError(format!("missing {key}")))
}

pub(crate) fn open_for_read(path: &Path) -> io::Result<File> {
    let mut opts = OpenOptions::new();
    opts.read(true);
    no_follow(&mut opts);
    opts.open(path)
}

pub(crate) fn open_for_write(path: &Path, mode: Option<u32>) -> io::Result<File> {
    let mut opts = OpenOptions::new();
    opts.write(true).create(true).truncate(true);
    no_follow(&mut opts);
    if let Some(m) = mode {
        create_mode(&mut opts, m);
    }
    opts.open(path)
}

#[cfg(unix)]
fn no_follow(opts: &mut OpenOptions) {
    use std::os::unix::fs::OpenOptionsExt;
    opts.custom_flags(libc::O_NOFOLLOW);
}

#[cfg(not(unix))]
fn no_follow(_opts: &mut OpenOptions) {}

#[cfg(unix)]
fn create_mode(opts: &mut OpenOptions, mode: u32) {
    use std::os::unix::fs::OpenOptionsExt;
    opts.mode(mode);
}

#[cfg(not(unix))]
fn create_mode(_opts: &mut OpenOptions, _mode: u32) {}

#[cfg(unix)]
fn is_symlink_refusal(e: &io::Error) -> bool {
    e.raw_os_error() == Some(libc::ELOOP)
}

#[cfg(not(unix))]
fn is_symlink_refusal(_e: &io::Error) -> bool {
    false
}

/// Maps an open/read failure on an already validated path.
pub(crate) fn io_error(path: &Path, e: io::Error) -> AppError {
    if is_symlink_refusal(&e) {
        return AppError::SymlinkRefused(path.display().to_string());
    }
    match e.kind() {
        io::ErrorKind::NotFound => AppError::NotFound(path.display().to_string()),
        _ => AppError::Internal(format!("{}: {e}", path.display())),
    }
}
