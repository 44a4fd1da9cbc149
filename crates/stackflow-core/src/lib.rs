//! stackflow のコア機能
//!
//! スタック依存グラフ（`generated/graph.json`）のモデル、読み込み、
//! 生成と検証を提供します。

pub mod discovery;
pub mod error;
pub mod generate;
pub mod job_id;
pub mod loader;
pub mod model;
pub mod order;
pub mod template;

pub use discovery::{
    CONFIG_DIR, CONFIG_FILE_CANDIDATES, PROJECT_ROOT_ENV, find_project_root,
    find_project_root_from,
};
pub use error::{GraphError, Result};
pub use generate::{generate_stage_graph, generate_stage_graph_for_project};
pub use job_id::{check_job_id_collisions, job_id};
pub use loader::{
    GRAPH_FILE, graph_path, load_stage_graph, load_stage_graph_from_root, write_stage_graph,
};
pub use model::*;
pub use order::{detect_cycles, topological_order, validate_stage};
pub use template::StackNameRenderer;
