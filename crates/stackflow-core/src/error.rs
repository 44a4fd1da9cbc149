use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("ファイル読み込みエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO エラー: {path}\n理由: {message}")]
    IoError { path: PathBuf, message: String },

    #[error("グラフJSONのパースエラー: {0}")]
    Json(#[from] serde_json::Error),

    #[error("無効な設定: {0}")]
    InvalidConfig(String),

    #[error("テンプレート展開エラー: {0}")]
    TemplateRenderError(String),

    #[error(
        "プロジェクトルートが見つかりません\n探索開始位置: {0}\nヒント: stackflow.yaml ファイルを含むディレクトリで実行してください"
    )]
    ProjectRootNotFound(PathBuf),

    #[error("ステージが見つかりません: {stage}\n利用可能なステージ: {available}")]
    StageNotFound { stage: String, available: String },

    #[error("スタック '{0}' が重複して定義されています")]
    DuplicateStack(String),

    #[error("スタック '{stack}' の依存先 '{dependency}' が定義されていません")]
    UnknownDependency { stack: String, dependency: String },

    #[error("循環依存が検出されました: {0}")]
    CircularDependency(String),

    #[error("ジョブID '{job_id}' が衝突しています: '{first}' と '{second}'")]
    JobIdCollision {
        job_id: String,
        first: String,
        second: String,
    },
}

pub type Result<T> = std::result::Result<T, GraphError>;
