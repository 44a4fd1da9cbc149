//! Deploy workflow options
//!
//! Every field has a default so a workflow entry in `stackflow.yaml`
//! only needs to name what differs.

use crate::model::{JobPermissions, Step, StepInputs, Triggers};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_BUILD_JOB_ID: &str = "build";
pub const DEFAULT_ARTIFACT_DIRECTORY: &str = "cdk.out";
pub const DEFAULT_ARTIFACT_NAME: &str = "build-artifact";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_ROLE_SECRET: &str = "OIDC_ROLE";
pub const DEFAULT_ROLE_DURATION_SECONDS: u32 = 1200;
pub const DEFAULT_DEPLOY_TIMEOUT_MINUTES: u32 = 20;

/// Kind of deploy workflow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowKind {
    /// Build job only
    Basic,
    /// One job per stack, following the stack graph
    #[default]
    Graph,
    /// One job per stage deploying all stacks in order
    Serial,
}

impl std::fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowKind::Basic => write!(f, "basic"),
            WorkflowKind::Graph => write!(f, "graph"),
            WorkflowKind::Serial => write!(f, "serial"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployWorkflowOptions {
    pub name: String,

    /// Id of the primary build job
    pub build_job_id: String,

    /// Stages in deployment order (graph and serial workflows)
    pub stages: Vec<String>,

    pub trigger: Option<Triggers>,

    /// `if` condition of the build job
    pub condition: Option<String>,

    pub pre_checkout_steps: Vec<Step>,
    pub pre_build_steps: Vec<Step>,
    pub post_steps: Vec<Step>,

    pub checkout_with: StepInputs,

    pub antitamper_disabled: bool,

    /// Extra environment variables of the build job
    pub environment: BTreeMap<String, String>,

    /// Extra permissions of the build job
    pub permissions: JobPermissions,

    /// Container image jobs run in
    pub image: Option<String>,

    pub artifact_directory: Option<String>,
    pub artifact_name: Option<String>,

    pub region: String,
    pub role_secret: String,
    pub role_duration_seconds: u32,
    pub deploy_timeout_minutes: u32,
}

impl Default for DeployWorkflowOptions {
    fn default() -> Self {
        Self {
            name: "Deploy".to_string(),
            build_job_id: DEFAULT_BUILD_JOB_ID.to_string(),
            stages: stackflow_core::default_stages(),
            trigger: None,
            condition: None,
            pre_checkout_steps: Vec::new(),
            pre_build_steps: Vec::new(),
            post_steps: Vec::new(),
            checkout_with: StepInputs::new(),
            antitamper_disabled: false,
            environment: BTreeMap::new(),
            permissions: JobPermissions::default(),
            image: None,
            artifact_directory: None,
            artifact_name: None,
            region: DEFAULT_REGION.to_string(),
            role_secret: DEFAULT_ROLE_SECRET.to_string(),
            role_duration_seconds: DEFAULT_ROLE_DURATION_SECONDS,
            deploy_timeout_minutes: DEFAULT_DEPLOY_TIMEOUT_MINUTES,
        }
    }
}

impl DeployWorkflowOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn artifact_directory(&self) -> &str {
        self.artifact_directory
            .as_deref()
            .unwrap_or(DEFAULT_ARTIFACT_DIRECTORY)
    }
}

/// Name of the artifact a stage's build job uploads
pub fn stage_artifact_name(stage: &str) -> String {
    format!("{stage}-build")
}

/// Id of the build job of a later stage
pub fn promote_job_id(stage: &str) -> String {
    format!("build_{}", stackflow_core::job_id(stage))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_partial_yaml() {
        let options: DeployWorkflowOptions = serde_yaml::from_str("name: GraphDeploy\n").unwrap();

        assert_eq!(options.name, "GraphDeploy");
        assert_eq!(options.build_job_id, "build");
        assert_eq!(options.stages, vec!["demo", "prod"]);
        assert_eq!(options.region, "us-east-1");
        assert_eq!(options.role_secret, "OIDC_ROLE");
        assert_eq!(options.deploy_timeout_minutes, 20);
        assert_eq!(options.artifact_directory(), "cdk.out");
        assert!(!options.antitamper_disabled);
    }

    #[test]
    fn test_steps_from_yaml() {
        let yaml = r#"
name: Deploy
pre_build_steps:
  - name: Lint
    run: npm run lint
    timeout-minutes: 5
"#;
        let options: DeployWorkflowOptions = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(options.pre_build_steps.len(), 1);
        assert_eq!(options.pre_build_steps[0].run.as_deref(), Some("npm run lint"));
        assert_eq!(options.pre_build_steps[0].timeout_minutes, Some(5));
    }

    #[test]
    fn test_stage_job_names() {
        assert_eq!(stage_artifact_name("prod"), "prod-build");
        assert_eq!(promote_job_id("prod"), "build_prod");
        assert_eq!(promote_job_id("eu-west"), "build_eu_west");
    }
}
