use crate::validator::{BaseDirValidator, ValidateOptions};
use crate::workspace;
use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub project: Project,
    #[serde(default)]
    pub workspace: Workspace,
    pub server: Server,
    pub auth: Auth,
    #[serde(default)]
    pub limits: Limits,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Project {
    pub base_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Workspace {
    #[serde(default)]
    pub root: Option<PathBuf>,
    /// Require `project.base_dir` to sit inside `root`.
    #[serde(default = "default_enforce")]
    pub enforce: bool,
}
fn default_enforce() -> bool { true }

impl Default for Workspace {
    fn default() -> Self {
        Self { root: None, enforce: default_enforce() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Server {
    pub bind_addr: String,
    pub port: u16,
    #[serde(default = "default_base_path")]
    pub base_path: String,
}
fn default_base_path() -> String { "/mcp".to_string() }

#[derive(Debug, Deserialize, Clone)]
pub struct Auth {
    pub bearer_token: String,
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Limits {
    #[serde(default = "default_max_request_kb")]
    pub max_request_kb: usize,
    #[serde(default = "default_max_read_kb")]
    pub max_read_kb: usize,
}
fn default_max_request_kb() -> usize { 1024 }
fn default_max_read_kb() -> usize { 4096 }

impl Default for Limits {
    fn default() -> Self {
        Self { max_request_kb: default_max_request_kb(), max_read_kb: default_max_read_kb() }
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)?;
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            Ok(serde_json::from_str(&raw)?)
        } else {
            Ok(toml::from_str(&raw)?)
        }
    }

    /// Configured workspace root, else the host environment's.
    pub fn workspace_root(&self) -> Option<PathBuf> {
        self.workspace.root.clone().or_else(workspace::host_workspace_root_from_env)
    }

    pub fn validator(&self) -> BaseDirValidator {
        BaseDirValidator::new(self.workspace_root())
    }

    /// Checks settings and returns the canonical project base dir.
    pub fn validate(&self) -> anyhow::Result<PathBuf> {
        if self.auth.bearer_token.trim().is_empty() { anyhow::bail!("bearer_token must not be empty"); }
        if self.auth.allowed_origins.is_empty() { anyhow::bail!("allowed_origins must not be empty"); }
        if self.limits.max_request_kb == 0 { anyhow::bail!("max_request_kb must be > 0"); }
        if self.limits.max_read_kb == 0 { anyhow::bail!("max_read_kb must be > 0"); }
        let options = ValidateOptions { check_within_workspace: self.workspace.enforce };
        let base = self
            .validator()
            .validate_base_dir(&self.project.base_dir, options)
            .context("validating project.base_dir")?;
        Ok(base)
    }
}
