//! Build-only deploy workflow

use crate::error::Result;
use crate::model::{Container, Job, JobPermission, JobPermissions, Step, Workflow};
use crate::options::{DEFAULT_ARTIFACT_NAME, DeployWorkflowOptions};
use crate::project::ProjectContext;
use crate::steps;
use std::collections::BTreeMap;
use tracing::debug;

/// Workflow with a single build job.
///
/// The build job checks out the repository, installs dependencies, runs the
/// projen build and uploads the synthesized app when an artifact is
/// configured. Graph and serial workflows extend it with deploy jobs.
#[derive(Debug, Clone)]
pub struct BasicDeployWorkflow {
    workflow: Workflow,
    build_job_id: String,
}

impl BasicDeployWorkflow {
    pub fn new(project: &ProjectContext, options: &DeployWorkflowOptions) -> Result<Self> {
        project.require_github()?;

        let mut workflow = Workflow::new(&options.name);
        if let Some(trigger) = &options.trigger {
            workflow.on(trigger.clone())?;
        }

        let build_job_id = options.build_job_id.clone();
        workflow.add_job(&build_job_id, build_job(project, options))?;
        debug!(workflow = %options.name, job_id = %build_job_id, "Added build job");

        Ok(Self {
            workflow,
            build_job_id,
        })
    }

    pub fn build_job_id(&self) -> &str {
        &self.build_job_id
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    pub fn workflow_mut(&mut self) -> &mut Workflow {
        &mut self.workflow
    }

    pub fn into_workflow(self) -> Workflow {
        self.workflow
    }
}

fn build_job(project: &ProjectContext, options: &DeployWorkflowOptions) -> Job {
    let mut job_steps = options.pre_checkout_steps.clone();
    job_steps.push(steps::checkout(&options.checkout_with));
    job_steps.push(steps::git_identity());
    job_steps.extend(steps::install(project));
    job_steps.extend(steps::anti_tamper(options));
    job_steps.extend(options.pre_build_steps.iter().cloned());
    job_steps.push(Step::run("Build", project.run_task_command("build")));
    job_steps.extend(steps::anti_tamper(options));
    job_steps.extend(options.post_steps.iter().cloned());

    if options.artifact_directory.is_some() || options.artifact_name.is_some() {
        let name = options
            .artifact_name
            .as_deref()
            .unwrap_or(DEFAULT_ARTIFACT_NAME);
        job_steps.push(steps::upload_artifact(name, options.artifact_directory()));
    }

    let mut env = BTreeMap::from([("CI".to_string(), "true".to_string())]);
    env.extend(options.environment.clone());

    let mut job = Job::new();
    job.condition = options.condition.clone();
    job.permissions = JobPermissions::contents(JobPermission::Read).merged(&options.permissions);
    job.env = env;
    job.container = options.image.clone().map(|image| Container { image });
    job.steps = job_steps;
    job
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkflowError;
    use crate::model::{IssueCommentTrigger, Triggers};

    fn step_names(job: &Job) -> Vec<&str> {
        job.steps
            .iter()
            .filter_map(|step| step.name.as_deref())
            .collect()
    }

    #[test]
    fn test_build_job_steps() {
        let basic = BasicDeployWorkflow::new(
            &ProjectContext::new("cdkday"),
            &DeployWorkflowOptions::default(),
        )
        .unwrap();
        let job = basic.workflow().job("build").unwrap();

        assert_eq!(
            step_names(job),
            vec![
                "Checkout",
                "Set git identity",
                "Setup Node.js",
                "Cache Node Modules",
                "Install dependencies",
                "Anti-tamper check",
                "Build",
                "Anti-tamper check",
            ]
        );
        assert_eq!(job.env["CI"], "true");
        assert_eq!(job.permissions.contents, Some(JobPermission::Read));
        assert!(basic.workflow().triggers().is_empty());
    }

    #[test]
    fn test_custom_steps_and_artifact() {
        let options = DeployWorkflowOptions {
            pre_checkout_steps: vec![Step::run("Warm up", "echo warm")],
            pre_build_steps: vec![Step::run("Lint", "npm run lint")],
            post_steps: vec![Step::run("Report", "echo done")],
            antitamper_disabled: true,
            artifact_name: Some("demo-build".to_string()),
            environment: BTreeMap::from([("STAGE".to_string(), "demo".to_string())]),
            permissions: JobPermissions::contents(JobPermission::Write),
            condition: Some("github.ref == 'refs/heads/main'".to_string()),
            ..Default::default()
        };
        let basic = BasicDeployWorkflow::new(&ProjectContext::new("cdkday"), &options).unwrap();
        let job = basic.workflow().job("build").unwrap();

        assert_eq!(
            step_names(job),
            vec![
                "Warm up",
                "Checkout",
                "Set git identity",
                "Setup Node.js",
                "Cache Node Modules",
                "Install dependencies",
                "Lint",
                "Build",
                "Report",
                "Upload artifact",
            ]
        );
        let upload = job.steps.last().unwrap();
        assert_eq!(upload.with["name"], "demo-build");
        assert_eq!(upload.with["path"], "cdk.out");
        assert_eq!(job.env["STAGE"], "demo");
        assert_eq!(job.permissions.contents, Some(JobPermission::Write));
        assert_eq!(job.condition.as_deref(), Some("github.ref == 'refs/heads/main'"));
    }

    #[test]
    fn test_no_github_support() {
        let mut project = ProjectContext::new("cdkday");
        project.github.enabled = false;

        let result = BasicDeployWorkflow::new(&project, &DeployWorkflowOptions::default());
        assert!(matches!(result, Err(WorkflowError::NoGithubSupport)));
    }

    #[test]
    fn test_issue_comment_trigger() {
        let options = DeployWorkflowOptions {
            trigger: Some(Triggers {
                issue_comment: Some(IssueCommentTrigger::default()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let result = BasicDeployWorkflow::new(&ProjectContext::new("cdkday"), &options);
        assert!(matches!(result, Err(WorkflowError::ForbiddenTrigger(_))));
    }
}
