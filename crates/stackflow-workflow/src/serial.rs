//! Deploy workflow with one job per stage

use crate::basic::BasicDeployWorkflow;
use crate::error::{Result, WorkflowError};
use crate::graph_deploy::stage_build_options;
use crate::model::Workflow;
use crate::options::{DeployWorkflowOptions, promote_job_id};
use crate::project::ProjectContext;
use crate::stage_jobs::DeployJobTemplate;
use stackflow_core::{StageGraph, job_id, topological_order};
use tracing::debug;

/// Id of the job deploying every stack of `stage`
pub fn stage_deploy_job_id(stage: &str) -> String {
    format!("deploy_{}", job_id(stage))
}

/// Build job, then a single `deploy_<stage>` job per stage.
///
/// Each deploy job runs `cdk deploy` for every stack of its stage in
/// dependency order and waits for the deploy job of the previous stage.
#[derive(Debug, Clone)]
pub struct SerialDeployWorkflow {
    base: BasicDeployWorkflow,
    deploy_job_ids: Vec<String>,
}

impl SerialDeployWorkflow {
    pub fn new(
        project: &ProjectContext,
        options: &DeployWorkflowOptions,
        graph: Option<&StageGraph>,
    ) -> Result<Self> {
        let first_stage = options.stages.first().ok_or_else(|| {
            WorkflowError::InvalidConfig(format!("workflow {} has no stages", options.name))
        })?;

        let mut base = BasicDeployWorkflow::new(project, &stage_build_options(options, first_stage))?;
        let Some(graph) = graph else {
            return Ok(Self {
                base,
                deploy_job_ids: Vec::new(),
            });
        };

        let template = DeployJobTemplate::new(project, options);
        let primary_build = base.build_job_id().to_string();
        let mut deploy_job_ids: Vec<String> = Vec::with_capacity(options.stages.len());

        for (index, stage) in options.stages.iter().enumerate() {
            let stacks = graph.stage(stage)?;
            let ordered = topological_order(stacks)?;

            let build_job_id = if index == 0 {
                primary_build.clone()
            } else {
                let promote_id = promote_job_id(stage);
                base.workflow_mut()
                    .add_job(&promote_id, template.promote_job(&promote_id, stage, &primary_build))?;
                promote_id
            };

            let mut needs = vec![build_job_id];
            needs.extend(deploy_job_ids.last().cloned());

            let deploy_id = stage_deploy_job_id(stage);
            let job = template.sequential_job(&deploy_id, &ordered, stage, needs);
            base.workflow_mut().add_job(&deploy_id, job)?;
            debug!(job_id = %deploy_id, stacks = ordered.len(), "Added stage deploy job");
            deploy_job_ids.push(deploy_id);
        }

        Ok(Self {
            base,
            deploy_job_ids,
        })
    }

    pub fn workflow(&self) -> &Workflow {
        self.base.workflow()
    }

    pub fn into_workflow(self) -> Workflow {
        self.base.into_workflow()
    }

    pub fn deploy_job_ids(&self) -> &[String] {
        &self.deploy_job_ids
    }
}
