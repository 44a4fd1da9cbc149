//! スタック名からCIジョブIDへの変換
//!
//! GitHub Actions のジョブIDは英数字と `_` / `-` のみで構成し、
//! 先頭は英字か `_` である必要があります。ここでは英数字と `_` 以外を
//! すべて `_` に置き換えます（最初の1文字だけを置き換えることはしません）。

use crate::error::{GraphError, Result};
use std::collections::HashMap;

/// スタック名からジョブIDを導出
///
/// - 英数字と `_` 以外の文字はすべて `_` に置換
/// - 先頭が数字、または空文字列の場合は先頭に `_` を付与
pub fn job_id(name: &str) -> String {
    let mut id: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if id.is_empty() || id.starts_with(|c: char| c.is_ascii_digit()) {
        id.insert(0, '_');
    }

    id
}

/// 異なるスタック名が同じジョブIDに変換されないことを確認
///
/// 例: `Api-Stack` と `Api_Stack` はどちらも `Api_Stack` になる。
/// 同じ名前が複数回現れるのは衝突とはみなしません。
pub fn check_job_id_collisions<'a, I>(names: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: HashMap<String, &'a str> = HashMap::new();

    for name in names {
        let id = job_id(name);
        match seen.get(&id) {
            Some(first) if *first != name => {
                return Err(GraphError::JobIdCollision {
                    job_id: id,
                    first: first.to_string(),
                    second: name.to_string(),
                });
            }
            Some(_) => {}
            None => {
                seen.insert(id, name);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_replaces_every_separator() {
        assert_eq!(job_id("Datastore-Stack"), "Datastore_Stack");
        assert_eq!(job_id("CDKDay-Datastore-demo"), "CDKDay_Datastore_demo");
        assert_eq!(job_id("my.stack/with spaces"), "my_stack_with_spaces");
    }

    #[test]
    fn test_job_id_keeps_safe_names() {
        assert_eq!(job_id("A"), "A");
        assert_eq!(job_id("build_prod"), "build_prod");
    }

    #[test]
    fn test_job_id_leading_digit_and_empty() {
        assert_eq!(job_id("2022-Api"), "_2022_Api");
        assert_eq!(job_id(""), "_");
    }

    #[test]
    fn test_multi_separator_names_do_not_collide() {
        // 最初の区切り文字だけを置換すると両方とも "CDKDay_Api-..." 系になり得る
        let a = job_id("CDKDay-Api-demo");
        let b = job_id("CDKDay-Api-prod");
        assert_ne!(a, b);
        assert!(check_job_id_collisions(["CDKDay-Api-demo", "CDKDay-Api-prod"]).is_ok());
    }

    #[test]
    fn test_collision_detected() {
        let result = check_job_id_collisions(["Api-Stack", "Other", "Api_Stack"]);
        match result {
            Err(GraphError::JobIdCollision {
                job_id,
                first,
                second,
            }) => {
                assert_eq!(job_id, "Api_Stack");
                assert_eq!(first, "Api-Stack");
                assert_eq!(second, "Api_Stack");
            }
            other => panic!("Expected JobIdCollision, got {:?}", other),
        }
    }

    #[test]
    fn test_same_name_twice_is_not_collision() {
        assert!(check_job_id_collisions(["A", "A"]).is_ok());
    }
}
