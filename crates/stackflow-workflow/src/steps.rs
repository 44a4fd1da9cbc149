//! Reusable job steps

use crate::model::{Step, StepInputs};
use crate::options::DeployWorkflowOptions;
use crate::project::ProjectContext;

pub const CHECKOUT_ACTION: &str = "actions/checkout@v2";
pub const SETUP_NODE_ACTION: &str = "actions/setup-node@v2.2.0";
pub const CACHE_ACTION: &str = "actions/cache@v2";
pub const UPLOAD_ARTIFACT_ACTION: &str = "actions/upload-artifact@v2.1.1";
pub const DOWNLOAD_ARTIFACT_ACTION: &str = "actions/download-artifact@v2";
pub const AWS_CREDENTIALS_ACTION: &str = "aws-actions/configure-aws-credentials@v1";

const CACHE_STEP_ID: &str = "cache-node";

pub fn checkout(with: &StepInputs) -> Step {
    Step::uses("Checkout", CHECKOUT_ACTION).with_inputs(with)
}

pub fn git_identity() -> Step {
    Step::run(
        "Set git identity",
        "git config user.name \"Automation\"\ngit config user.email \"github-actions@github.com\"",
    )
}

/// Node setup, module cache and the install command skipped on a cache hit
pub fn install(project: &ProjectContext) -> Vec<Step> {
    let mut setup_node = Step::uses("Setup Node.js", SETUP_NODE_ACTION);
    if let Some(version) = &project.node_version {
        setup_node = setup_node.with_input("node-version", version.as_str());
    }

    let lock_file = project.package_manager.lock_file();
    vec![
        setup_node,
        Step::uses("Cache Node Modules", CACHE_ACTION)
            .with_id(CACHE_STEP_ID)
            .with_input("path", "node_modules")
            .with_input("key", format!("node-modules-${{{{ hashFiles('{lock_file}') }}}}")),
        Step::run("Install dependencies", project.package_manager.install_command())
            .with_condition(format!("steps.{CACHE_STEP_ID}.outputs.cache-hit != 'true'")),
    ]
}

/// Fails the job when the build modified tracked files
pub fn anti_tamper(options: &DeployWorkflowOptions) -> Vec<Step> {
    if options.antitamper_disabled {
        return Vec::new();
    }
    vec![Step::run("Anti-tamper check", "git diff --exit-code")]
}

pub fn upload_artifact(name: &str, path: &str) -> Step {
    Step::uses("Upload artifact", UPLOAD_ARTIFACT_ACTION)
        .with_input("name", name)
        .with_input("path", path)
}

pub fn download_artifact(name: &str, path: &str) -> Step {
    Step::uses("Download build artifact", DOWNLOAD_ARTIFACT_ACTION)
        .with_input("name", name)
        .with_input("path", path)
}

/// OIDC role assumption
pub fn aws_credentials(options: &DeployWorkflowOptions) -> Step {
    Step::uses("Configure AWS Credentials", AWS_CREDENTIALS_ACTION)
        .with_input("aws-region", options.region.as_str())
        .with_input(
            "role-to-assume",
            format!("${{{{ secrets.{} }}}}", options.role_secret),
        )
        .with_input("role-duration-seconds", options.role_duration_seconds)
}

pub fn cdk_deploy(stack_name: &str, app_directory: &str, timeout_minutes: u32) -> Step {
    Step::run(
        format!("Deploy {stack_name}"),
        format!(
            "npx cdk deploy --exclusively {stack_name} --app {app_directory} --require-approval never"
        ),
    )
    .with_timeout(timeout_minutes)
}
