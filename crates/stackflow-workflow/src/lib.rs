//! GitHub Actions deploy workflow generation
//!
//! Turns a project's stack graph into workflows that deploy every stack in
//! dependency order, stage after stage.
//!
//! ```text
//! ┌──────────────────┐     ┌───────────────────────┐     ┌──────────────┐
//! │ StageGraph       │────►│ StageJobGraphBuilder  │────►│ Workflow     │
//! │ (graph.json)     │     │ (needs, concurrency)  │     │ (YAML file)  │
//! └──────────────────┘     └───────────────────────┘     └──────────────┘
//! ```

pub mod basic;
pub mod error;
pub mod graph_deploy;
pub mod model;
pub mod options;
pub mod project;
pub mod render;
pub mod serial;
pub mod stage_jobs;
pub mod steps;

// Workflows
pub use basic::BasicDeployWorkflow;
pub use graph_deploy::GraphDeployWorkflow;
pub use serial::{SerialDeployWorkflow, stage_deploy_job_id};

// Building blocks
pub use error::{Result, WorkflowError};
pub use model::{
    BranchFilter, Concurrency, Container, Job, JobPermission, JobPermissions, Step, StepInputs,
    Triggers, Workflow, WorkflowDispatch,
};
pub use options::{DeployWorkflowOptions, WorkflowKind, promote_job_id, stage_artifact_name};
pub use project::{GitHubSettings, PackageManager, ProjectContext, WORKFLOWS_DIR};
pub use render::{GENERATED_HEADER, render_workflow, workflow_path, write_workflow};
pub use stage_jobs::{
    DeployJobTemplate, PlannedStage, StageJobGraphBuilder, StageJobs, StagePlan,
};

use stackflow_core::StageGraph;

/// Build the workflow of the given kind
pub fn synthesize(
    kind: WorkflowKind,
    project: &ProjectContext,
    options: &DeployWorkflowOptions,
    graph: Option<&StageGraph>,
) -> Result<Workflow> {
    let workflow = match kind {
        WorkflowKind::Basic => BasicDeployWorkflow::new(project, options)?.into_workflow(),
        WorkflowKind::Graph => GraphDeployWorkflow::new(project, options, graph)?.into_workflow(),
        WorkflowKind::Serial => SerialDeployWorkflow::new(project, options, graph)?.into_workflow(),
    };
    tracing::debug!(workflow = %workflow.name(), kind = %kind, jobs = workflow.jobs().len(), "Synthesized workflow");
    Ok(workflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackflow_core::StackNode;

    #[test]
    fn test_synthesize_each_kind() {
        let mut graph = StageGraph::new();
        graph.insert_stage("demo", vec![StackNode::new("Api-demo", Vec::<String>::new())]);
        graph.insert_stage("prod", vec![StackNode::new("Api-prod", Vec::<String>::new())]);
        let project = ProjectContext::new("cdkday");
        let options = DeployWorkflowOptions::named("Deploy");

        let basic = synthesize(WorkflowKind::Basic, &project, &options, Some(&graph)).unwrap();
        assert_eq!(basic.jobs().len(), 1);

        let graph_workflow = synthesize(WorkflowKind::Graph, &project, &options, Some(&graph)).unwrap();
        assert!(graph_workflow.contains_job("Api_prod"));

        let serial = synthesize(WorkflowKind::Serial, &project, &options, Some(&graph)).unwrap();
        assert!(serial.contains_job("deploy_prod"));
    }
}
