//! プロジェクトルートの検出

use crate::error::{GraphError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// プロジェクトルートを直接指定する環境変数
pub const PROJECT_ROOT_ENV: &str = "STACKFLOW_PROJECT_ROOT";

/// プロジェクト設定ファイル名（優先順）
pub const CONFIG_FILE_CANDIDATES: &[&str] = &["stackflow.local.yaml", "stackflow.yaml"];

/// 設定ファイルを置けるサブディレクトリ
pub const CONFIG_DIR: &str = ".stackflow";

/// プロジェクトルートを検出
///
/// 以下の優先順位で検索:
/// 1. 環境変数 STACKFLOW_PROJECT_ROOT
/// 2. カレントディレクトリから上に向かって以下を探す:
///    - stackflow.yaml / stackflow.local.yaml
///    - .stackflow/stackflow.yaml
#[tracing::instrument]
pub fn find_project_root() -> Result<PathBuf> {
    if let Ok(root) = std::env::var(PROJECT_ROOT_ENV) {
        let path = PathBuf::from(&root);
        debug!(env_root = %root, "Checking STACKFLOW_PROJECT_ROOT");
        if has_config(&path) {
            info!(project_root = %path.display(), "Found project root from environment variable");
            return Ok(path);
        }
    }

    let start_dir = std::env::current_dir()?;
    find_project_root_from(&start_dir)
}

/// 指定ディレクトリから上に向かってプロジェクトルートを探す
#[tracing::instrument(skip(start_dir), fields(start_dir = %start_dir.display()))]
pub fn find_project_root_from(start_dir: &Path) -> Result<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        debug!(checking = %current.display(), "Looking for stackflow.yaml");
        if has_config(&current) {
            info!(project_root = %current.display(), "Found project root");
            return Ok(current);
        }

        if !current.pop() {
            break;
        }
    }

    warn!(start_dir = %start_dir.display(), "Project root not found");
    Err(GraphError::ProjectRootNotFound(start_dir.to_path_buf()))
}

fn has_config(dir: &Path) -> bool {
    CONFIG_FILE_CANDIDATES
        .iter()
        .any(|name| dir.join(name).exists() || dir.join(CONFIG_DIR).join(name).exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_find_root_in_start_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("stackflow.yaml"), "name: test\n").unwrap();

        let root = find_project_root_from(temp_dir.path()).unwrap();
        assert_eq!(root, temp_dir.path());
    }

    #[test]
    fn test_find_root_from_subdirectory() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(temp_dir.path().join(".stackflow")).unwrap();
        fs::write(
            temp_dir.path().join(".stackflow/stackflow.yaml"),
            "name: test\n",
        )
        .unwrap();
        let nested = temp_dir.path().join("src/stacks");
        fs::create_dir_all(&nested).unwrap();

        let root = find_project_root_from(&nested).unwrap();
        assert_eq!(root, temp_dir.path());
    }

    #[test]
    fn test_root_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        // 一時ディレクトリの祖先に設定ファイルがないことは前提としない
        let result = find_project_root_from(temp_dir.path());
        if let Err(e) = result {
            assert!(matches!(e, GraphError::ProjectRootNotFound(_)));
        }
    }
}
