//! モデル定義
//!
//! グラフ成果物とスタック宣言のデータモデルを定義します。

mod app;
mod graph;
mod stack;

// Re-exports
pub use app::*;
pub use graph::*;
pub use stack::*;
