use colored::Colorize;
use stackflow_config::LoadedProject;
use stackflow_workflow::synthesize;

pub fn handle(project: &LoadedProject) -> anyhow::Result<()> {
    println!("{}", "設定を検証中...".blue());
    println!(
        "設定ファイル: {}",
        project.config_path.display().to_string().cyan()
    );

    let config = &project.config;

    // スタック宣言（未知の依存、循環、ジョブID衝突）
    if let Err(e) = stackflow_core::generate_stage_graph_for_project(&config.app, &config.name) {
        fail("スタック宣言にエラーがあります", &e.to_string());
    }

    // generated/graph.json
    let graph = match stackflow_core::load_stage_graph_from_root(&project.root) {
        Ok(graph) => graph,
        Err(e) => fail("graph.json を読み込めません", &e.to_string()),
    };
    match &graph {
        Some(graph) => {
            for stage in graph.stage_names() {
                let result = graph
                    .stage(stage)
                    .and_then(stackflow_core::validate_stage);
                if let Err(e) = result {
                    fail(&format!("ステージ {stage} のグラフにエラーがあります"), &e.to_string());
                }
            }
        }
        None => {
            println!(
                "{}",
                "⚠ generated/graph.json がありません（ビルドジョブのみ生成されます）".yellow()
            );
        }
    }

    // ワークフロー
    let context = config.project_context();
    for entry in &config.workflows {
        if let Err(e) = synthesize(entry.kind, &context, &entry.options, graph.as_ref()) {
            fail(
                &format!("ワークフロー {} を生成できません", entry.options.name),
                &e.to_string(),
            );
        }
    }

    println!("{}", "✓ 設定ファイルは正常です！".green().bold());
    println!();
    println!("サマリー:");
    println!("  スタック: {}個", config.app.stacks.len());
    for stack in &config.app.stacks {
        if stack.depends_on.is_empty() {
            println!("    - {}", stack.name.cyan());
        } else {
            println!(
                "    - {} (依存: {})",
                stack.name.cyan(),
                stack.depends_on.join(", ")
            );
        }
    }
    println!("  ステージ: {}", config.app.stages.join(", "));
    println!("  ワークフロー: {}個", config.workflows.len());
    for entry in &config.workflows {
        println!("    - {} ({})", entry.options.name.cyan(), entry.kind);
    }

    Ok(())
}

fn fail(title: &str, detail: &str) -> ! {
    eprintln!();
    eprintln!("{}", format!("✗ {title}").red().bold());
    eprintln!("  {}", detail);
    std::process::exit(1);
}
