//! Process-wide workspace root: the outer boundary a project base dir must
//! sit inside when the workspace check is requested.
//!
//! The host value is registered once at startup. Tests may override it with
//! [`set_test_workspace_root`]; clearing the override falls back to the host
//! value, or to no boundary at all when no host value was registered.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Environment variable consulted by [`host_workspace_root_from_env`].
pub const WORKSPACE_ROOT_ENV: &str = "BASEGATE_WORKSPACE_ROOT";

struct Registry {
    host: Option<PathBuf>,
    test_override: Option<PathBuf>,
}

static REGISTRY: RwLock<Registry> = RwLock::new(Registry { host: None, test_override: None });

pub fn set_host_workspace_root(root: Option<PathBuf>) {
    let mut reg = REGISTRY.write().unwrap_or_else(|e| e.into_inner());
    reg.host = root;
}

/// Test-only override. `None` reverts to the host value.
pub fn set_test_workspace_root(root: Option<&Path>) {
    let mut reg = REGISTRY.write().unwrap_or_else(|e| e.into_inner());
    reg.test_override = root.map(Path::to_path_buf);
}

/// The root currently in force, as registered (not canonicalized).
pub fn current_workspace_root() -> Option<PathBuf> {
    let reg = REGISTRY.read().unwrap_or_else(|e| e.into_inner());
    reg.test_override.clone().or_else(|| reg.host.clone())
}

pub fn host_workspace_root_from_env() -> Option<PathBuf> {
    std::env::var_os(WORKSPACE_ROOT_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Serializes tests that touch the registry.
#[cfg(test)]
pub(crate) static TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
