pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use stackflow_core::{AppDefinition, CONFIG_DIR, CONFIG_FILE_CANDIDATES};
use stackflow_workflow::{
    DeployWorkflowOptions, GitHubSettings, PackageManager, ProjectContext, WorkflowKind,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 設定ファイルを直接指定する環境変数
pub const CONFIG_PATH_ENV: &str = "STACKFLOW_CONFIG_PATH";

/// グローバル設定ファイル名
const GLOBAL_CONFIG_FILE: &str = "stackflow.yaml";

/// stackflow.yaml の内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// プロジェクト名
    pub name: String,
    #[serde(default)]
    pub github: GitHubSettings,
    /// セットアップする Node.js のバージョン
    #[serde(default)]
    pub node_version: Option<String>,
    #[serde(default)]
    pub package_manager: PackageManager,
    /// スタック宣言
    #[serde(default)]
    pub app: AppDefinition,
    /// 生成するワークフロー（省略時は GraphDeploy のみ）
    #[serde(default = "default_workflows")]
    pub workflows: Vec<WorkflowConfig>,
}

/// ワークフロー1件分の設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    #[serde(default)]
    pub kind: WorkflowKind,
    #[serde(flatten)]
    pub options: DeployWorkflowOptions,
}

fn default_workflows() -> Vec<WorkflowConfig> {
    vec![WorkflowConfig {
        kind: WorkflowKind::Graph,
        options: DeployWorkflowOptions::named("GraphDeploy"),
    }]
}

impl ProjectConfig {
    /// ワークフロー生成用のプロジェクト情報
    pub fn project_context(&self) -> ProjectContext {
        ProjectContext {
            name: self.name.clone(),
            github: self.github.clone(),
            node_version: self.node_version.clone(),
            package_manager: self.package_manager,
        }
    }

    /// 名前でワークフローを探す（大文字小文字は区別しない）
    pub fn workflow(&self, name: &str) -> Option<&WorkflowConfig> {
        self.workflows
            .iter()
            .find(|w| w.options.name.eq_ignore_ascii_case(name))
    }

    /// 設定内容の整合性を検証
    ///
    /// - ワークフロー名が重複していない（出力ファイル名が衝突するため）
    /// - graph / serial ワークフローのステージが空でなく、app.stages に含まれる
    pub fn validate(&self) -> Result<()> {
        let mut file_names = HashSet::new();
        for workflow in &self.workflows {
            let name = &workflow.options.name;
            if !file_names.insert(name.to_lowercase()) {
                return Err(ConfigError::Invalid(format!(
                    "ワークフロー名が重複しています: {name}"
                )));
            }

            if workflow.kind == WorkflowKind::Basic {
                continue;
            }
            if workflow.options.stages.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "ワークフロー {name} にステージがありません"
                )));
            }
            for stage in &workflow.options.stages {
                if !self.app.stages.contains(stage) {
                    return Err(ConfigError::Invalid(format!(
                        "ワークフロー {name} のステージ {stage} が app.stages にありません"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// 読み込み済みのプロジェクト
#[derive(Debug, Clone)]
pub struct LoadedProject {
    pub root: PathBuf,
    pub config_path: PathBuf,
    pub config: ProjectConfig,
}

/// stackflow のグローバル設定ディレクトリ（~/.config/stackflow）
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("stackflow");
    Ok(config_dir)
}

/// プロジェクトの stackflow.yaml を探す
///
/// 以下の優先順位で設定ファイルを検索:
/// 1. 環境変数 STACKFLOW_CONFIG_PATH (直接パス指定)
/// 2. カレントディレクトリ: stackflow.local.yaml, stackflow.yaml
/// 3. ./.stackflow/ ディレクトリ内: 同様の順序
/// 4. プロジェクトルート (STACKFLOW_PROJECT_ROOT または親ディレクトリを遡って検出)
/// 5. ~/.config/stackflow/stackflow.yaml (グローバル設定)
pub fn find_config_file() -> Result<PathBuf> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            debug!(path = %path.display(), "Using STACKFLOW_CONFIG_PATH");
            return Ok(path);
        }
    }

    // 2, 3. カレントディレクトリと ./.stackflow/
    let current_dir = std::env::current_dir()?;
    if let Some(path) = find_config_file_in(&current_dir) {
        return Ok(path);
    }

    // 4. プロジェクトルート
    if let Ok(root) = stackflow_core::find_project_root() {
        if let Some(path) = find_config_file_in(&root) {
            return Ok(path);
        }
    }

    // 5. グローバル設定ファイル
    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("stackflow").join(GLOBAL_CONFIG_FILE);
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}

/// 指定ディレクトリと、その下の .stackflow/ から設定ファイルを探す
pub fn find_config_file_in(dir: &Path) -> Option<PathBuf> {
    let in_dir = CONFIG_FILE_CANDIDATES.iter().map(|name| dir.join(name));
    let in_config_dir = CONFIG_FILE_CANDIDATES
        .iter()
        .map(|name| dir.join(CONFIG_DIR).join(name));

    in_dir.chain(in_config_dir).find(|path| path.is_file())
}

/// 設定ファイルの位置からプロジェクトルートを求める
///
/// `.stackflow/` 内の設定ファイルならその親ディレクトリ
pub fn project_root_for(config_path: &Path) -> PathBuf {
    let parent = config_path.parent().unwrap_or_else(|| Path::new("."));
    match parent.file_name() {
        Some(dir) if dir == CONFIG_DIR => parent.parent().unwrap_or(parent).to_path_buf(),
        _ => parent.to_path_buf(),
    }
}

/// 設定ファイルを読み込んで検証する
#[tracing::instrument(skip(path), fields(path = %path.display()))]
pub fn load_config(path: &Path) -> Result<ProjectConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let config: ProjectConfig =
        serde_yaml::from_str(&content).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;
    config.validate()?;

    info!(
        project = %config.name,
        stacks = config.app.stacks.len(),
        workflows = config.workflows.len(),
        "Loaded project configuration"
    );
    Ok(config)
}

/// 設定ファイルを探して読み込む
pub fn load_project() -> Result<LoadedProject> {
    let config_path = find_config_file()?;
    load_project_from(&config_path)
}

/// 指定された設定ファイルからプロジェクトを読み込む
pub fn load_project_from(config_path: &Path) -> Result<LoadedProject> {
    let config = load_config(config_path)?;
    Ok(LoadedProject {
        root: project_root_for(config_path),
        config_path: config_path.to_path_buf(),
        config,
    })
}
