//! スタック宣言からグラフ成果物を生成
//!
//! 各ステージについて論理名をスタック名に展開し、依存先が先に来る順序で
//! `generated/graph.json` の内容を組み立てます。

use crate::error::{GraphError, Result};
use crate::model::{AppDefinition, StackNode, StageGraph};
use crate::order::{topological_order, validate_stage};
use crate::template::StackNameRenderer;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

#[instrument(skip(app), fields(stacks = app.stacks.len(), stages = app.stages.len()))]
pub fn generate_stage_graph(app: &AppDefinition) -> Result<StageGraph> {
    generate_with_renderer(app, StackNameRenderer::new(app.stack_name_template.clone()))
}

/// プロジェクト名をテンプレート変数に含めて生成
pub fn generate_stage_graph_for_project(app: &AppDefinition, project: &str) -> Result<StageGraph> {
    generate_with_renderer(
        app,
        StackNameRenderer::new(app.stack_name_template.clone()).with_project(project),
    )
}

fn generate_with_renderer(
    app: &AppDefinition,
    mut renderer: StackNameRenderer,
) -> Result<StageGraph> {
    if app.stages.is_empty() {
        return Err(GraphError::InvalidConfig(
            "グラフを生成するステージが指定されていません".to_string(),
        ));
    }

    let logical: Vec<StackNode> = app
        .stacks
        .iter()
        .map(|d| StackNode::new(d.name.clone(), d.depends_on.iter().cloned()))
        .collect();
    validate_stage(&logical)?;
    let ordered = topological_order(&logical)?;

    let mut graph = StageGraph::new();
    for stage in &app.stages {
        let mut rendered: HashMap<&str, String> = HashMap::with_capacity(logical.len());
        for stack in &logical {
            rendered.insert(stack.name.as_str(), renderer.render(&stack.name, stage)?);
        }

        let lookup = |owner: &str, name: &str| -> Result<String> {
            rendered
                .get(name)
                .cloned()
                .ok_or_else(|| GraphError::UnknownDependency {
                    stack: owner.to_string(),
                    dependency: name.to_string(),
                })
        };

        let mut stacks = Vec::with_capacity(ordered.len());
        for stack in &ordered {
            let name = lookup(&stack.name, &stack.name)?;
            let dependencies = stack
                .dependencies
                .iter()
                .map(|d| lookup(&stack.name, d))
                .collect::<Result<Vec<_>>>()?;
            stacks.push(StackNode { name, dependencies });
        }

        // テンプレートによって別々の論理名が同じ名前になっていないか
        validate_stage(&stacks)?;
        debug!(stage = %stage, stacks = stacks.len(), "Stage graph generated");
        graph.insert_stage(stage.clone(), stacks);
    }

    info!(stages = graph.len(), "Stack graph generated");
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StackDeclaration;

    fn decl(name: &str, deps: &[&str]) -> StackDeclaration {
        StackDeclaration {
            name: name.to_string(),
            depends_on: deps.iter().map(|d| d.to_string()).collect(),
            description: None,
        }
    }

    fn cdkday_app() -> AppDefinition {
        AppDefinition {
            stack_name_template: "CDKDay-{{ name }}-{{ stage }}".to_string(),
            stages: vec!["demo".to_string(), "prod".to_string()],
            stacks: vec![
                decl("Dashboard", &["Datastore", "Api", "AsyncJobs", "Webhooks"]),
                decl("Datastore", &[]),
                decl("Secrets", &[]),
                decl("Ingestion", &[]),
                decl("Api", &["Datastore", "Secrets"]),
                decl("AsyncJobs", &["Datastore", "Secrets"]),
                decl("Webhooks", &["Secrets"]),
            ],
        }
    }

    #[test]
    fn test_generate_renders_names_per_stage() {
        let graph = generate_stage_graph(&cdkday_app()).unwrap();

        assert_eq!(graph.len(), 2);
        let demo = graph.stage("demo").unwrap();
        let api = demo.iter().find(|s| s.name == "CDKDay-Api-demo").unwrap();
        assert_eq!(
            api.dependencies,
            vec!["CDKDay-Datastore-demo", "CDKDay-Secrets-demo"]
        );

        let prod = graph.stage("prod").unwrap();
        assert!(prod.iter().all(|s| s.name.ends_with("-prod")));
        assert!(
            prod.iter()
                .flat_map(|s| s.dependencies.iter())
                .all(|d| d.ends_with("-prod"))
        );
    }

    #[test]
    fn test_generate_orders_dependencies_first() {
        let graph = generate_stage_graph(&cdkday_app()).unwrap();
        let demo = graph.stage("demo").unwrap();

        let pos = |n: &str| demo.iter().position(|s| s.name == n).unwrap();
        assert!(pos("CDKDay-Datastore-demo") < pos("CDKDay-Api-demo"));
        assert!(pos("CDKDay-Webhooks-demo") < pos("CDKDay-Dashboard-demo"));
        assert_eq!(demo.last().unwrap().name, "CDKDay-Dashboard-demo");
    }

    #[test]
    fn test_generate_rejects_unknown_dependency() {
        let app = AppDefinition {
            stacks: vec![decl("Api", &["Datastore"])],
            ..Default::default()
        };
        assert!(matches!(
            generate_stage_graph(&app),
            Err(GraphError::UnknownDependency { .. })
        ));
    }

    #[test]
    fn test_generate_rejects_cycle() {
        let app = AppDefinition {
            stacks: vec![decl("A", &["B"]), decl("B", &["A"])],
            ..Default::default()
        };
        assert!(matches!(
            generate_stage_graph(&app),
            Err(GraphError::CircularDependency(_))
        ));
    }

    #[test]
    fn test_generate_rejects_template_collisions() {
        // ステージも名前も含まないテンプレートは全スタックが同名になる
        let app = AppDefinition {
            stack_name_template: "Fixed".to_string(),
            stacks: vec![decl("A", &[]), decl("B", &[])],
            ..Default::default()
        };
        assert!(matches!(
            generate_stage_graph(&app),
            Err(GraphError::DuplicateStack(_))
        ));
    }

    #[test]
    fn test_generate_requires_stages() {
        let app = AppDefinition {
            stages: vec![],
            stacks: vec![decl("A", &[])],
            ..Default::default()
        };
        assert!(matches!(
            generate_stage_graph(&app),
            Err(GraphError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_generate_with_project_variable() {
        let app = AppDefinition {
            stack_name_template: "{{ project }}-{{ name }}-{{ stage }}".to_string(),
            stages: vec!["demo".to_string()],
            stacks: vec![decl("A", &[])],
        };
        let graph = generate_stage_graph_for_project(&app, "cdkday").unwrap();
        assert_eq!(graph.stage("demo").unwrap()[0].name, "cdkday-A-demo");
    }
}
