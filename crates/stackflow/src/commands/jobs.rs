use anyhow::Context;
use colored::Colorize;
use stackflow_config::LoadedProject;
use stackflow_workflow::{GraphDeployWorkflow, WorkflowKind};

pub fn handle(
    project: &LoadedProject,
    stage: &str,
    workflow_name: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let graph = stackflow_core::load_stage_graph_from_root(&project.root)?.with_context(|| {
        format!(
            "{} がありません。先に `stackflow graph` を実行してください",
            stackflow_core::GRAPH_FILE
        )
    })?;
    // 存在しないステージは StageNotFound
    graph.stage(stage)?;

    let config = &project.config;
    let entry = match workflow_name {
        Some(name) => config
            .workflow(name)
            .with_context(|| format!("ワークフローが見つかりません: {name}"))?,
        None => config
            .workflows
            .iter()
            .find(|w| w.kind == WorkflowKind::Graph)
            .context("graph ワークフローが設定されていません")?,
    };
    if entry.kind != WorkflowKind::Graph {
        anyhow::bail!(
            "ワークフロー {} は graph ではありません ({})",
            entry.options.name,
            entry.kind
        );
    }

    let deploy = GraphDeployWorkflow::new(&config.project_context(), &entry.options, Some(&graph))?;
    let stage_jobs = deploy
        .stage_jobs()
        .iter()
        .find(|s| s.stage == stage)
        .with_context(|| {
            format!(
                "ワークフロー {} はステージ {} をデプロイしません",
                entry.options.name, stage
            )
        })?;

    let workflow = deploy.workflow();
    let jobs: Vec<_> = stage_jobs
        .job_ids
        .iter()
        .filter_map(|id| workflow.job(id).map(|job| (id, job)))
        .collect();

    if json {
        let value: Vec<serde_json::Value> = jobs
            .iter()
            .map(|(id, job)| {
                serde_json::json!({
                    "job_id": id,
                    "needs": job.needs,
                    "concurrency": job.concurrency.as_ref().map(|c| c.group.as_str()),
                    "environment": job.environment,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!(
        "ステージ: {} ({})",
        stage.cyan().bold(),
        entry.options.name
    );
    for (id, job) in &jobs {
        println!("  - {}", id.green());
        println!("      needs: {}", job.needs.join(", "));
    }
    println!("{}個のジョブ", jobs.len());

    Ok(())
}
