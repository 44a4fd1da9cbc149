//! グラフ成果物の読み書き
//!
//! `generated/graph.json` が存在しない場合はエラーにせず `None` を返します。
//! グラフ生成前の環境では「グラフ由来のジョブは追加しない」扱いになります。

use crate::error::{GraphError, Result};
use crate::model::StageGraph;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// プロジェクトルートからのグラフ成果物の相対パス
pub const GRAPH_FILE: &str = "generated/graph.json";

pub fn graph_path(project_root: &Path) -> PathBuf {
    project_root.join(GRAPH_FILE)
}

/// グラフ成果物を読み込む
///
/// ファイルがなければ `Ok(None)`。
#[instrument(skip(path), fields(path = %path.display()))]
pub fn load_stage_graph(path: &Path) -> Result<Option<StageGraph>> {
    if !path.exists() {
        info!("Graph artifact not found, no graph-based jobs will be generated");
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|e| GraphError::IoError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let graph = StageGraph::from_json_str(&content)?;
    info!(stages = graph.len(), "Graph artifact loaded");

    Ok(Some(graph))
}

/// プロジェクトルート配下の標準パスから読み込む
#[instrument(skip(project_root), fields(project_root = %project_root.display()))]
pub fn load_stage_graph_from_root(project_root: &Path) -> Result<Option<StageGraph>> {
    load_stage_graph(&graph_path(project_root))
}

/// グラフ成果物を書き出す（親ディレクトリは自動作成）
pub fn write_stage_graph(path: &Path, graph: &StageGraph) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| GraphError::IoError {
            path: parent.to_path_buf(),
            message: e.to_string(),
        })?;
    }

    let mut content = graph.to_json_pretty()?;
    content.push('\n');
    std::fs::write(path, content).map_err(|e| GraphError::IoError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    debug!(path = %path.display(), "Graph artifact written");

    Ok(())
}
