use colored::Colorize;
use stackflow_config::LoadedProject;
use stackflow_workflow::{render_workflow, synthesize, write_workflow};

pub fn handle(project: &LoadedProject, dry_run: bool) -> anyhow::Result<()> {
    let graph = stackflow_core::load_stage_graph_from_root(&project.root)?;
    if graph.is_none() {
        // dry-run の標準出力は YAML のみにする
        eprintln!(
            "{}",
            "⚠ generated/graph.json がありません。ビルドジョブのみ生成します".yellow()
        );
        eprintln!("  先に {} を実行してください", "stackflow graph".cyan());
    }

    let context = project.config.project_context();
    for entry in &project.config.workflows {
        let workflow = synthesize(entry.kind, &context, &entry.options, graph.as_ref())?;

        if dry_run {
            print!("{}", render_workflow(&workflow)?);
            continue;
        }

        let path = write_workflow(&project.root, &workflow)?;
        println!(
            "{} {} ({}, {}個のジョブ)",
            "✓".green(),
            path.display().to_string().cyan(),
            entry.kind,
            workflow.jobs().len()
        );
    }

    Ok(())
}
