//! Workflow generation error types

use thiserror::Error;

/// Workflow generation errors
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("GitHub support is not enabled for this project (github.enabled = false)")]
    NoGithubSupport,

    #[error("\"{0}\" should not be used as a trigger due to a security issue")]
    ForbiddenTrigger(String),

    #[error("Job already registered in workflow: {0}")]
    DuplicateJob(String),

    #[error("Job not found in workflow: {0}")]
    JobNotFound(String),

    #[error("Failed to write workflow file {path}: {message}")]
    Io { path: String, message: String },

    #[error("Invalid workflow configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Graph(#[from] stackflow_core::GraphError),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, WorkflowError>;
