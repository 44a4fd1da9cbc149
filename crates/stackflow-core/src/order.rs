//! 依存関係の検証と順序付け
//!
//! ジョブグラフ構築そのものは循環を検出しません。
//! グラフ生成時と `validate` コマンドでのみここを使います。

use crate::error::{GraphError, Result};
use crate::job_id::check_job_id_collisions;
use crate::model::StackNode;
use std::collections::{HashMap, HashSet};

/// ステージ内のスタック一覧を検証
///
/// - スタック名の重複
/// - 未定義の依存先
/// - 循環依存
/// - ジョブIDの衝突
pub fn validate_stage(stacks: &[StackNode]) -> Result<()> {
    check_duplicates(stacks)?;
    check_dependencies(stacks)?;
    detect_cycles(stacks)?;
    check_job_id_collisions(stacks.iter().map(|s| s.name.as_str()))
}

fn check_duplicates(stacks: &[StackNode]) -> Result<()> {
    let mut seen = HashSet::new();
    for stack in stacks {
        if !seen.insert(stack.name.as_str()) {
            return Err(GraphError::DuplicateStack(stack.name.clone()));
        }
    }
    Ok(())
}

fn check_dependencies(stacks: &[StackNode]) -> Result<()> {
    let names: HashSet<&str> = stacks.iter().map(|s| s.name.as_str()).collect();
    for stack in stacks {
        if let Some(missing) = stack
            .dependencies
            .iter()
            .find(|d| !names.contains(d.as_str()))
        {
            return Err(GraphError::UnknownDependency {
                stack: stack.name.clone(),
                dependency: missing.clone(),
            });
        }
    }
    Ok(())
}

/// DFSで循環依存を検出
pub fn detect_cycles(stacks: &[StackNode]) -> Result<()> {
    let nodes: HashMap<&str, &StackNode> = stacks.iter().map(|s| (s.name.as_str(), s)).collect();
    let mut visited = HashSet::new();
    let mut rec_stack = HashSet::new();
    let mut path = Vec::new();

    for stack in stacks {
        if !visited.contains(stack.name.as_str()) {
            if let Some(cycle) = dfs_detect_cycle(
                &nodes,
                stack.name.as_str(),
                &mut visited,
                &mut rec_stack,
                &mut path,
            ) {
                return Err(GraphError::CircularDependency(cycle.join(" -> ")));
            }
        }
    }

    Ok(())
}

fn dfs_detect_cycle<'a>(
    nodes: &HashMap<&'a str, &'a StackNode>,
    name: &'a str,
    visited: &mut HashSet<&'a str>,
    rec_stack: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    visited.insert(name);
    rec_stack.insert(name);
    path.push(name);

    if let Some(node) = nodes.get(name).copied() {
        for dep in &node.dependencies {
            let dep = dep.as_str();
            if !visited.contains(dep) {
                if let Some(cycle) = dfs_detect_cycle(nodes, dep, visited, rec_stack, path) {
                    return Some(cycle);
                }
            } else if rec_stack.contains(dep) {
                let mut cycle = vec![dep.to_string()];
                for p in path.iter().rev() {
                    cycle.push(p.to_string());
                    if *p == dep {
                        break;
                    }
                }
                cycle.reverse();
                return Some(cycle);
            }
        }
    }

    path.pop();
    rec_stack.remove(name);
    None
}

/// 依存先が必ず先に来る順序でスタックを並べる
///
/// 依存関係のない部分では入力順を保ちます。
pub fn topological_order(stacks: &[StackNode]) -> Result<Vec<&StackNode>> {
    check_dependencies(stacks)?;

    let mut placed: HashSet<&str> = HashSet::new();
    let mut ordered = Vec::with_capacity(stacks.len());

    while ordered.len() < stacks.len() {
        let before = ordered.len();

        for stack in stacks {
            if placed.contains(stack.name.as_str()) {
                continue;
            }
            if stack
                .dependencies
                .iter()
                .all(|d| placed.contains(d.as_str()))
            {
                placed.insert(stack.name.as_str());
                ordered.push(stack);
            }
        }

        if ordered.len() == before {
            detect_cycles(stacks)?;
            let remaining: Vec<&str> = stacks
                .iter()
                .map(|s| s.name.as_str())
                .filter(|n| !placed.contains(n))
                .collect();
            return Err(GraphError::CircularDependency(remaining.join(", ")));
        }
    }

    Ok(ordered)
}
