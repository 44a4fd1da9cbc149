use colored::Colorize;
use stackflow_config::LoadedProject;
use std::path::PathBuf;

pub fn handle(project: &LoadedProject, output: Option<PathBuf>) -> anyhow::Result<()> {
    println!("{}", "スタック依存グラフを生成中...".blue());

    let config = &project.config;
    let graph = stackflow_core::generate_stage_graph_for_project(&config.app, &config.name)?;

    let path = match output {
        Some(path) if path.is_relative() => project.root.join(path),
        Some(path) => path,
        None => stackflow_core::graph_path(&project.root),
    };
    stackflow_core::write_stage_graph(&path, &graph)?;

    println!(
        "{} {}",
        "✓ グラフを書き出しました:".green(),
        path.display().to_string().cyan()
    );
    for stage in graph.stage_names() {
        let stacks = graph.stage(stage)?;
        println!("  {} ({}個のスタック)", stage.cyan(), stacks.len());
    }

    Ok(())
}
