//! Deploy workflow with one job per stack

use crate::basic::BasicDeployWorkflow;
use crate::error::{Result, WorkflowError};
use crate::model::{BranchFilter, Triggers, Workflow, WorkflowDispatch};
use crate::options::{DeployWorkflowOptions, promote_job_id, stage_artifact_name};
use crate::project::ProjectContext;
use crate::stage_jobs::{DeployJobTemplate, StageJobGraphBuilder, StageJobs, StagePlan};
use stackflow_core::StageGraph;
use tracing::info;

/// Branch whose pushes trigger the graph workflow
pub const DEPLOY_BRANCH: &str = "main";

/// Build job, then the stack graph of every stage behind the previous one.
///
/// Without a stack graph only the build job is generated and no triggers
/// are added, so the workflow never runs.
#[derive(Debug, Clone)]
pub struct GraphDeployWorkflow {
    base: BasicDeployWorkflow,
    stages: Vec<StageJobs>,
}

impl GraphDeployWorkflow {
    pub fn new(
        project: &ProjectContext,
        options: &DeployWorkflowOptions,
        graph: Option<&StageGraph>,
    ) -> Result<Self> {
        let (first_stage, later_stages) = options.stages.split_first().ok_or_else(|| {
            WorkflowError::InvalidConfig(format!("workflow {} has no stages", options.name))
        })?;

        let mut base = BasicDeployWorkflow::new(project, &stage_build_options(options, first_stage))?;

        let Some(graph) = graph else {
            info!(workflow = %options.name, "No stack graph found, generating the build job only");
            return Ok(Self {
                base,
                stages: Vec::new(),
            });
        };

        base.workflow_mut().on(Triggers {
            workflow_dispatch: Some(WorkflowDispatch {}),
            push: Some(BranchFilter::branches([DEPLOY_BRANCH])),
            ..Default::default()
        })?;

        let template = DeployJobTemplate::new(project, options);
        let build_job_id = base.build_job_id().to_string();
        let mut plan = StagePlan::new().then(first_stage.as_str(), build_job_id.as_str());
        for stage in later_stages {
            let promote_id = promote_job_id(stage);
            base.workflow_mut()
                .add_job(&promote_id, template.promote_job(&promote_id, stage, &build_job_id))?;
            plan = plan.then(stage.as_str(), promote_id);
        }

        let stages = StageJobGraphBuilder::new(graph, &template).build_plan(base.workflow_mut(), &plan)?;
        Ok(Self { base, stages })
    }

    pub fn workflow(&self) -> &Workflow {
        self.base.workflow()
    }

    pub fn into_workflow(self) -> Workflow {
        self.base.into_workflow()
    }

    /// Deploy job ids per stage, in deployment order
    pub fn stage_jobs(&self) -> &[StageJobs] {
        &self.stages
    }
}

/// Options of the primary build job: uploads the first stage's artifact
pub(crate) fn stage_build_options(options: &DeployWorkflowOptions, stage: &str) -> DeployWorkflowOptions {
    let mut build_options = options.clone();
    build_options.artifact_directory = Some(options.artifact_directory().to_string());
    build_options.artifact_name = Some(stage_artifact_name(stage));
    build_options
        .environment
        .insert("STAGE".to_string(), stage.to_string());
    build_options
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackflow_core::{GraphError, StackNode};

    fn graph() -> StageGraph {
        let mut graph = StageGraph::new();
        for stage in ["demo", "prod"] {
            let datastore = format!("Datastore-{stage}");
            graph.insert_stage(
                stage,
                vec![
                    StackNode::new(datastore.clone(), Vec::<String>::new()),
                    StackNode::new(format!("Api-{stage}"), [datastore]),
                ],
            );
        }
        graph
    }

    fn options() -> DeployWorkflowOptions {
        DeployWorkflowOptions::named("GraphDeploy")
    }

    #[test]
    fn test_two_stage_graph() {
        let graph = graph();
        let deploy =
            GraphDeployWorkflow::new(&ProjectContext::new("cdkday"), &options(), Some(&graph)).unwrap();
        let workflow = deploy.workflow();

        assert_eq!(
            workflow.job_ids().collect::<Vec<_>>(),
            vec!["build", "build_prod", "Datastore_demo", "Api_demo", "Datastore_prod", "Api_prod"]
        );
        assert_eq!(workflow.job("Api_demo").unwrap().needs, vec!["build", "Datastore_demo"]);
        assert_eq!(workflow.job("build_prod").unwrap().needs, vec!["build"]);
        assert_eq!(
            workflow.job("Api_prod").unwrap().needs,
            vec!["build_prod", "Datastore_prod", "Datastore_demo", "Api_demo"]
        );
        assert_eq!(deploy.stage_jobs().len(), 2);
        assert_eq!(deploy.stage_jobs()[1].stage, "prod");
    }

    #[test]
    fn test_later_stage_waits_for_every_earlier_job() {
        let graph = graph();
        let deploy =
            GraphDeployWorkflow::new(&ProjectContext::new("cdkday"), &options(), Some(&graph)).unwrap();
        let demo_jobs = &deploy.stage_jobs()[0].job_ids;

        for id in &deploy.stage_jobs()[1].job_ids {
            let needs = &deploy.workflow().job(id).unwrap().needs;
            assert!(demo_jobs.iter().all(|demo| needs.contains(demo)));
        }
    }

    #[test]
    fn test_missing_graph_yields_build_job_only() {
        let deploy =
            GraphDeployWorkflow::new(&ProjectContext::new("cdkday"), &options(), None).unwrap();
        let workflow = deploy.workflow();

        assert_eq!(workflow.job_ids().collect::<Vec<_>>(), vec!["build"]);
        assert!(workflow.triggers().is_empty());
        assert!(deploy.stage_jobs().is_empty());
    }

    #[test]
    fn test_build_job_uploads_first_stage_artifact() {
        let deploy =
            GraphDeployWorkflow::new(&ProjectContext::new("cdkday"), &options(), None).unwrap();
        let build = deploy.workflow().job("build").unwrap();

        let upload = build.steps.last().unwrap();
        assert_eq!(upload.name.as_deref(), Some("Upload artifact"));
        assert_eq!(upload.with["name"], "demo-build");
        assert_eq!(upload.with["path"], "cdk.out");
        assert_eq!(build.env["STAGE"], "demo");
    }

    #[test]
    fn test_graph_adds_triggers() {
        let graph = graph();
        let deploy =
            GraphDeployWorkflow::new(&ProjectContext::new("cdkday"), &options(), Some(&graph)).unwrap();
        let triggers = deploy.workflow().triggers();

        assert!(triggers.workflow_dispatch.is_some());
        assert_eq!(triggers.push.as_ref().unwrap().branches, vec!["main"]);
    }

    #[test]
    fn test_missing_stage_in_graph() {
        let mut graph = StageGraph::new();
        graph.insert_stage("demo", vec![StackNode::new("A", Vec::<String>::new())]);

        let result = GraphDeployWorkflow::new(&ProjectContext::new("cdkday"), &options(), Some(&graph));
        assert!(matches!(
            result,
            Err(WorkflowError::Graph(GraphError::StageNotFound { stage, .. })) if stage == "prod"
        ));
    }

    #[test]
    fn test_no_stages() {
        let options = DeployWorkflowOptions {
            stages: Vec::new(),
            ..options()
        };
        let result = GraphDeployWorkflow::new(&ProjectContext::new("cdkday"), &options, None);
        assert!(matches!(result, Err(WorkflowError::InvalidConfig(_))));
    }
}
