//! ステージグラフ定義

use super::stack::StackNode;
use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 1ステージ分のスタック一覧
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageStacks {
    #[serde(default)]
    pub stacks: Vec<StackNode>,
}

/// ステージ名 → スタック一覧のマッピング
///
/// 外部のグラフ生成ステップが出力した `generated/graph.json` を表します。
/// 一度ロードしたら変更しません。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageGraph {
    stages: BTreeMap<String, StageStacks>,
}

impl StageGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// JSON文字列からパース
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// 整形済みJSONに変換
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// ステージを追加（同名のステージは置き換え）
    pub fn insert_stage(&mut self, stage: impl Into<String>, stacks: Vec<StackNode>) {
        self.stages.insert(stage.into(), StageStacks { stacks });
    }

    /// ステージのスタック一覧を取得
    ///
    /// 存在しないステージはフォールバックせずにエラーにします。
    pub fn stage(&self, stage: &str) -> Result<&[StackNode]> {
        self.stages
            .get(stage)
            .map(|s| s.stacks.as_slice())
            .ok_or_else(|| GraphError::StageNotFound {
                stage: stage.to_string(),
                available: self.stage_names().collect::<Vec<_>>().join(", "),
            })
    }

    pub fn contains_stage(&self, stage: &str) -> bool {
        self.stages.contains_key(stage)
    }

    pub fn stage_names(&self) -> impl Iterator<Item = &str> {
        self.stages.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}
