use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const CDKDAY_CONFIG: &str = r#"
name: cdkday-2022
node_version: "14.17.0"
app:
  stack_name_template: "CDKDay-{{ name }}-{{ stage }}"
  stages: [demo, prod]
  stacks:
    - name: Dashboard
      depends_on: [Datastore, Api, AsyncJobs, Webhooks]
    - name: Datastore
    - name: Secrets
    - name: Ingestion
    - name: Api
      depends_on: [Datastore, Secrets]
    - name: AsyncJobs
      depends_on: [Datastore, Secrets]
    - name: Webhooks
      depends_on: [Secrets]
workflows:
  - kind: graph
    name: GraphDeploy
  - kind: serial
    name: SerialDeploy
"#;

/// demo / prod それぞれ A と B (B は A に依存) の graph.json
pub const AB_GRAPH: &str = r#"{
  "demo": { "stacks": [
    { "name": "A-demo", "dependencies": [] },
    { "name": "B-demo", "dependencies": ["A-demo"] }
  ] },
  "prod": { "stacks": [
    { "name": "A-prod", "dependencies": [] },
    { "name": "B-prod", "dependencies": ["A-prod"] }
  ] }
}"#;

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn with_config(content: &str) -> Self {
        let project = Self::new();
        project.write_config(content);
        project
    }

    pub fn write_config(&self, content: &str) {
        fs::write(self.root.path().join("stackflow.yaml"), content).unwrap();
    }

    #[allow(dead_code)]
    pub fn write_graph_json(&self, content: &str) {
        let dir = self.root.path().join("generated");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("graph.json"), content).unwrap();
    }

    #[allow(dead_code)]
    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.root.path().join(relative)).unwrap()
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    /// プロジェクトディレクトリで stackflow を実行するコマンド
    #[allow(deprecated)]
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("stackflow").unwrap();
        cmd.current_dir(self.path())
            .env_remove("STACKFLOW_CONFIG_PATH")
            .env_remove("STACKFLOW_PROJECT_ROOT")
            .env_remove("RUST_LOG");
        cmd
    }
}
