//! Project context shared by every workflow of a project

use crate::error::{Result, WorkflowError};
use serde::{Deserialize, Serialize};

/// Directory workflow files are written to, relative to the project root
pub const WORKFLOWS_DIR: &str = ".github/workflows";

/// Node.js package manager used by the project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    #[default]
    Npm,
    Yarn,
    Pnpm,
}

impl PackageManager {
    /// Frozen-lockfile install command
    pub fn install_command(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm ci",
            PackageManager::Yarn => "yarn install --check-files --frozen-lockfile",
            PackageManager::Pnpm => "pnpm i --frozen-lockfile",
        }
    }

    pub fn lock_file(&self) -> &'static str {
        match self {
            PackageManager::Npm => "package-lock.json",
            PackageManager::Yarn => "yarn.lock",
            PackageManager::Pnpm => "pnpm-lock.yaml",
        }
    }
}

/// GitHub integration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_enabled() -> bool {
    true
}

/// Project-level information workflows are built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    pub name: String,
    pub github: GitHubSettings,
    pub node_version: Option<String>,
    pub package_manager: PackageManager,
}

impl ProjectContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            github: GitHubSettings::default(),
            node_version: None,
            package_manager: PackageManager::default(),
        }
    }

    /// Fails with [`WorkflowError::NoGithubSupport`] when GitHub is disabled
    pub fn require_github(&self) -> Result<&GitHubSettings> {
        if self.github.enabled {
            Ok(&self.github)
        } else {
            Err(WorkflowError::NoGithubSupport)
        }
    }

    /// Command running a projen task
    pub fn run_task_command(&self, task: &str) -> String {
        format!("npx projen {task}")
    }
}
