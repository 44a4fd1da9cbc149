//! スタック名テンプレート
//!
//! Teraを使用して論理名とステージからCDKのスタック名を展開します。
//! 例: `CDKDay-{{ name }}-{{ stage }}` → `CDKDay-Datastore-demo`

use crate::error::{GraphError, Result};
use tera::{Context, Tera};
use tracing::debug;

/// スタック名レンダラー
pub struct StackNameRenderer {
    tera: Tera,
    template: String,
    project: Option<String>,
}

impl StackNameRenderer {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            tera: Tera::default(),
            template: template.into(),
            project: None,
        }
    }

    /// テンプレート内で `{{ project }}` を使えるようにする
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// 論理名とステージからスタック名を展開
    pub fn render(&mut self, name: &str, stage: &str) -> Result<String> {
        let mut context = Context::new();
        context.insert("name", name);
        context.insert("stage", stage);
        if let Some(project) = &self.project {
            context.insert("project", project);
        }

        let rendered = self
            .tera
            .render_str(&self.template, &context)
            .map_err(|e| {
                GraphError::TemplateRenderError(format!(
                    "{}\n理由: {}",
                    self.template,
                    extract_tera_error_detail(&e)
                ))
            })?;
        let rendered = rendered.trim().to_string();

        if rendered.is_empty() {
            return Err(GraphError::InvalidConfig(format!(
                "スタック名テンプレート '{}' の展開結果が空です（name={}, stage={}）",
                self.template, name, stage
            )));
        }

        debug!(name, stage, stack_name = %rendered, "Rendered stack name");
        Ok(rendered)
    }
}

/// Teraエラーから原因メッセージを取り出す
fn extract_tera_error_detail(e: &tera::Error) -> String {
    let mut messages = vec![e.to_string()];
    let mut source = std::error::Error::source(e);
    while let Some(cause) = source {
        messages.push(cause.to_string());
        source = cause.source();
    }
    messages.join(": ")
}
