mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stackflow")]
#[command(about = "スタックの依存関係どおりに、ステージ順でデプロイする。", long_about = None)]
struct Cli {
    /// 詳細なログを出力
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// スタック宣言から generated/graph.json を生成
    Graph {
        /// 出力先（省略時は generated/graph.json）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// ワークフローファイルを生成
    Synth {
        /// ファイルを書かずに YAML を標準出力に表示
        #[arg(long)]
        dry_run: bool,
    },
    /// ステージのデプロイジョブと依存関係を表示
    Jobs {
        /// ステージ名 (demo, prod)
        stage: String,
        /// ワークフロー名（省略時は最初の graph ワークフロー）
        #[arg(short, long)]
        workflow: Option<String>,
        /// JSON で出力
        #[arg(long)]
        json: bool,
    },
    /// 設定とスタック依存グラフを検証
    Validate,
    /// バージョン情報を表示
    Version,
}

fn init_tracing(verbose: bool) {
    let mut filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    if verbose {
        filter = filter.add_directive(tracing::Level::DEBUG.into());
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Versionコマンドは設定ファイル不要
    if matches!(cli.command, Commands::Version) {
        println!("stackflow {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let project = match stackflow_config::load_project() {
        Ok(project) => project,
        Err(e) => {
            eprintln!("{}", "✗ 設定ファイルを読み込めません".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };
    tracing::debug!(
        project_root = %project.root.display(),
        config = %project.config_path.display(),
        "Loaded project"
    );

    match cli.command {
        Commands::Graph { output } => commands::graph::handle(&project, output)?,
        Commands::Synth { dry_run } => commands::synth::handle(&project, dry_run)?,
        Commands::Jobs {
            stage,
            workflow,
            json,
        } => commands::jobs::handle(&project, &stage, workflow.as_deref(), json)?,
        Commands::Validate => commands::validate::handle(&project)?,
        Commands::Version => {
            unreachable!("Version is handled before config loading");
        }
    }

    Ok(())
}
