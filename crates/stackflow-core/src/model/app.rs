//! アプリケーション（スタック宣言）定義

use serde::{Deserialize, Serialize};

/// デフォルトのスタック名テンプレート
pub const DEFAULT_STACK_NAME_TEMPLATE: &str = "{{ name }}-{{ stage }}";

/// スタック宣言
///
/// CDKアプリ内でどのスタックがどのスタックの出力を参照するかを記述します。
/// リソースの中身は扱いません。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackDeclaration {
    /// 論理名（例: "Datastore"）
    pub name: String,
    /// 依存する論理名
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// グラフ生成の入力となるアプリ定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppDefinition {
    /// スタック名テンプレート（`name` と `stage` を参照可能）
    #[serde(default = "default_stack_name_template")]
    pub stack_name_template: String,
    /// グラフを生成するステージ
    #[serde(default = "default_stages")]
    pub stages: Vec<String>,
    #[serde(default)]
    pub stacks: Vec<StackDeclaration>,
}

impl Default for AppDefinition {
    fn default() -> Self {
        Self {
            stack_name_template: default_stack_name_template(),
            stages: default_stages(),
            stacks: Vec::new(),
        }
    }
}

fn default_stack_name_template() -> String {
    DEFAULT_STACK_NAME_TEMPLATE.to_string()
}

pub fn default_stages() -> Vec<String> {
    vec!["demo".to_string(), "prod".to_string()]
}
