//! Workflow file output

use crate::error::{Result, WorkflowError};
use crate::model::Workflow;
use crate::project::WORKFLOWS_DIR;
use std::path::{Path, PathBuf};
use tracing::info;

pub const GENERATED_HEADER: &str =
    "# ~~ Generated by stackflow. To modify, edit stackflow.yaml and run \"stackflow synth\".\n\n";

pub fn render_workflow(workflow: &Workflow) -> Result<String> {
    let body = serde_yaml::to_string(workflow)?;
    Ok(format!("{GENERATED_HEADER}{body}"))
}

pub fn workflow_path(project_root: &Path, workflow: &Workflow) -> PathBuf {
    project_root.join(WORKFLOWS_DIR).join(workflow.file_name())
}

/// Write the workflow under `.github/workflows/` and return the file path
#[tracing::instrument(skip(project_root, workflow), fields(workflow = %workflow.name()))]
pub fn write_workflow(project_root: &Path, workflow: &Workflow) -> Result<PathBuf> {
    let path = workflow_path(project_root, workflow);
    let content = render_workflow(workflow)?;

    let io_error = |e: std::io::Error| WorkflowError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    std::fs::write(&path, content).map_err(io_error)?;

    info!(path = %path.display(), "Wrote workflow file");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BranchFilter, Job, Triggers, WorkflowDispatch};
    use tempfile::TempDir;

    fn workflow() -> Workflow {
        let mut workflow = Workflow::new("GraphDeploy");
        workflow
            .on(Triggers {
                workflow_dispatch: Some(WorkflowDispatch {}),
                push: Some(BranchFilter::branches(["main"])),
                ..Default::default()
            })
            .unwrap();
        workflow.add_job("build", Job::new()).unwrap();
        let mut deploy = Job::new();
        deploy.needs = vec!["build".to_string()];
        workflow.add_job("Api", deploy).unwrap();
        workflow
    }

    #[test]
    fn test_render_keeps_header_and_job_order() {
        let content = render_workflow(&workflow()).unwrap();

        assert!(content.starts_with(GENERATED_HEADER));
        let build = content.find("  build:").unwrap();
        let api = content.find("  Api:").unwrap();
        assert!(build < api);

        let value: serde_yaml::Value = serde_yaml::from_str(&content).unwrap();
        assert_eq!(value["name"], "GraphDeploy");
        assert_eq!(value["jobs"]["Api"]["needs"][0], "build");
        assert_eq!(value["on"]["push"]["branches"][0], "main");
    }

    #[test]
    fn test_write_workflow() {
        let temp_dir = TempDir::new().unwrap();

        let path = write_workflow(temp_dir.path(), &workflow()).unwrap();

        assert_eq!(path, temp_dir.path().join(".github/workflows/graphdeploy.yml"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("GraphDeploy"));
    }
}
