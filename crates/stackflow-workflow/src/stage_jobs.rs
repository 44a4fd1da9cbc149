//! Per-stage deploy job construction
//!
//! [`StageJobGraphBuilder`] turns the stacks of one stage into deploy jobs
//! whose `needs` mirror the stack dependencies. Stages are chained through
//! `extra_needs`: passing the ids returned for one stage to the next one
//! keeps the later stage behind a barrier.
//!
//! ```text
//! build ──► Datastore ──► Api ──┐
//!   │                           ├──► build_prod ──► Datastore(prod) ...
//!   └─────► Secrets ────────────┘
//! ```

use crate::error::{Result, WorkflowError};
use crate::model::{
    Concurrency, Container, Job, JobPermission, JobPermissions, Step, StepInputs, Workflow,
};
use crate::options::{DeployWorkflowOptions, stage_artifact_name};
use crate::project::ProjectContext;
use crate::steps;
use stackflow_core::{StackNode, StageGraph, check_job_id_collisions};
use tracing::{debug, info};

/// Shared shape of every deploy job of a workflow
#[derive(Debug, Clone)]
pub struct DeployJobTemplate {
    checkout_with: StepInputs,
    install_steps: Vec<Step>,
    credentials: Step,
    synth_command: String,
    image: Option<String>,
    artifact_directory: String,
    timeout_minutes: u32,
}

impl DeployJobTemplate {
    pub fn new(project: &ProjectContext, options: &DeployWorkflowOptions) -> Self {
        Self {
            checkout_with: options.checkout_with.clone(),
            install_steps: steps::install(project),
            credentials: steps::aws_credentials(options),
            synth_command: project.run_task_command("synth"),
            image: options.image.clone(),
            artifact_directory: options.artifact_directory().to_string(),
            timeout_minutes: options.deploy_timeout_minutes,
        }
    }

    /// Job deploying a single stack.
    ///
    /// The concurrency group is the job id so two runs never deploy the
    /// same stack at once.
    pub fn stack_job(&self, stack: &StackNode, stage: &str, needs: Vec<String>) -> Job {
        self.deploy_job(
            stack.job_id(),
            stage,
            needs,
            vec![steps::cdk_deploy(
                &stack.name,
                &self.artifact_directory,
                self.timeout_minutes,
            )],
        )
    }

    /// Build job of a later stage: re-synthesizes the app for `stage` and
    /// uploads its artifact
    pub fn promote_job(&self, job_id: &str, stage: &str, build_job_id: &str) -> Job {
        let mut job_steps = vec![steps::checkout(&self.checkout_with)];
        job_steps.extend(self.install_steps.iter().cloned());
        job_steps.push(Step::run("Synth", self.synth_command.as_str()));
        job_steps.push(steps::upload_artifact(
            &stage_artifact_name(stage),
            &self.artifact_directory,
        ));

        let mut job = Job::new();
        job.needs = vec![build_job_id.to_string()];
        job.permissions = JobPermissions::contents(JobPermission::Write);
        job.environment = Some(stage.to_string());
        job.concurrency = Some(Concurrency::queued(job_id));
        job.env.insert("STAGE".to_string(), stage.to_string());
        job.steps = job_steps;
        job
    }

    /// Job deploying several stacks one after another
    pub fn sequential_job(
        &self,
        job_id: &str,
        stacks: &[&StackNode],
        stage: &str,
        needs: Vec<String>,
    ) -> Job {
        let deploy_steps = stacks
            .iter()
            .map(|stack| {
                steps::cdk_deploy(&stack.name, &self.artifact_directory, self.timeout_minutes)
            })
            .collect();
        self.deploy_job(job_id.to_string(), stage, needs, deploy_steps)
    }

    fn deploy_job(
        &self,
        job_id: String,
        stage: &str,
        needs: Vec<String>,
        deploy_steps: Vec<Step>,
    ) -> Job {
        let mut job_steps = vec![
            steps::checkout(&self.checkout_with),
            steps::download_artifact(&stage_artifact_name(stage), &self.artifact_directory),
        ];
        job_steps.extend(self.install_steps.iter().cloned());
        job_steps.push(self.credentials.clone());
        job_steps.extend(deploy_steps);

        let mut job = Job::new();
        job.needs = needs;
        job.permissions = JobPermissions {
            contents: Some(JobPermission::Read),
            id_token: Some(JobPermission::Write),
            ..Default::default()
        };
        job.environment = Some(stage.to_string());
        job.concurrency = Some(Concurrency::queued(job_id));
        job.env.insert("STAGE".to_string(), stage.to_string());
        job.container = self.image.clone().map(|image| Container { image });
        job.steps = job_steps;
        job
    }
}

/// One entry of a [`StagePlan`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStage {
    pub stage: String,
    /// Job producing the artifact this stage deploys
    pub build_job_id: String,
}

/// Ordered chain of stages. Every stage waits for all jobs of the one before.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagePlan {
    stages: Vec<PlannedStage>,
}

impl StagePlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, stage: impl Into<String>, build_job_id: impl Into<String>) -> Self {
        self.stages.push(PlannedStage {
            stage: stage.into(),
            build_job_id: build_job_id.into(),
        });
        self
    }

    pub fn stages(&self) -> &[PlannedStage] {
        &self.stages
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// Job ids created for one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageJobs {
    pub stage: String,
    pub job_ids: Vec<String>,
}

pub struct StageJobGraphBuilder<'a> {
    graph: &'a StageGraph,
    template: &'a DeployJobTemplate,
}

impl<'a> StageJobGraphBuilder<'a> {
    pub fn new(graph: &'a StageGraph, template: &'a DeployJobTemplate) -> Self {
        Self { graph, template }
    }

    /// Deploy jobs of `stage` in graph order, without registering them.
    ///
    /// `needs` of each job is the build job, then its dependencies, then
    /// `extra_needs`. Duplicates are kept.
    pub fn plan_stage_jobs(
        &self,
        build_job_id: &str,
        stage: &str,
        extra_needs: &[String],
    ) -> Result<Vec<(String, Job)>> {
        let stacks = self.graph.stage(stage)?;
        check_job_id_collisions(stacks.iter().map(|stack| stack.name.as_str()))?;

        let jobs = stacks
            .iter()
            .map(|stack| {
                let mut needs = Vec::with_capacity(1 + stack.dependencies.len() + extra_needs.len());
                needs.push(build_job_id.to_string());
                needs.extend(stack.dependency_job_ids());
                needs.extend(extra_needs.iter().cloned());

                let job_id = stack.job_id();
                debug!(job_id = %job_id, stage = %stage, needs = ?needs, "Planned deploy job");
                let job = self.template.stack_job(stack, stage, needs);
                (job_id, job)
            })
            .collect();

        Ok(jobs)
    }

    /// Register the deploy jobs of `stage` and return their ids in order.
    ///
    /// The build job must already be registered. Nothing is registered when
    /// the stage is missing or a job id collides.
    pub fn build_stage_jobs(
        &self,
        workflow: &mut Workflow,
        build_job_id: &str,
        stage: &str,
        extra_needs: &[String],
    ) -> Result<Vec<String>> {
        if !workflow.contains_job(build_job_id) {
            return Err(WorkflowError::JobNotFound(build_job_id.to_string()));
        }

        let jobs = self.plan_stage_jobs(build_job_id, stage, extra_needs)?;
        let job_ids: Vec<String> = jobs.iter().map(|(id, _)| id.clone()).collect();
        workflow.add_jobs(jobs)?;

        info!(
            workflow = %workflow.name(),
            stage = %stage,
            jobs = job_ids.len(),
            "Registered stage deploy jobs"
        );
        Ok(job_ids)
    }

    /// Register every stage of `plan`, each behind the previous one.
    ///
    /// Build jobs named by the plan must already be registered.
    pub fn build_plan(&self, workflow: &mut Workflow, plan: &StagePlan) -> Result<Vec<StageJobs>> {
        let mut built: Vec<StageJobs> = Vec::with_capacity(plan.stages().len());
        for planned in plan.stages() {
            let barrier = built
                .last()
                .map(|previous| previous.job_ids.as_slice())
                .unwrap_or_default();
            let job_ids =
                self.build_stage_jobs(workflow, &planned.build_job_id, &planned.stage, barrier)?;
            built.push(StageJobs {
                stage: planned.stage.clone(),
                job_ids,
            });
        }
        Ok(built)
    }
}
