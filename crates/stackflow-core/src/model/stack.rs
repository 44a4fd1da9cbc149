//! スタック定義

use crate::job_id::job_id;
use serde::{Deserialize, Serialize};

/// デプロイ単位となるスタック
///
/// graph.json 内の形式:
/// ```json
/// { "name": "CDKDay-Api-demo", "dependencies": ["CDKDay-Datastore-demo"] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackNode {
    /// スタック名（ステージ内で一意）
    pub name: String,
    /// 先にデプロイされている必要があるスタック名
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl StackNode {
    pub fn new<I, S>(name: impl Into<String>, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            dependencies: dependencies.into_iter().map(Into::into).collect(),
        }
    }

    /// スタック名から導出したCIジョブID
    pub fn job_id(&self) -> String {
        job_id(&self.name)
    }

    /// 依存スタックのジョブID（宣言順）
    pub fn dependency_job_ids(&self) -> Vec<String> {
        self.dependencies.iter().map(|d| job_id(d)).collect()
    }
}
