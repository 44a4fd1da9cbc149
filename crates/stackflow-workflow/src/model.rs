//! GitHub Actions workflow model
//!
//! Only the subset of the workflow syntax that deploy workflows need is modeled.
//! Field order of the structs is the key order of the generated YAML.

use crate::error::{Result, WorkflowError};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Default runner label
pub const DEFAULT_RUNNER: &str = "ubuntu-latest";

/// Inputs passed to an action via `with:`
pub type StepInputs = BTreeMap<String, serde_json::Value>;

/// Access level of a single permission scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobPermission {
    Read,
    Write,
    None,
}

/// Token permissions of a job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPermissions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<JobPermission>,

    #[serde(
        default,
        rename = "id-token",
        skip_serializing_if = "Option::is_none"
    )]
    pub id_token: Option<JobPermission>,

    #[serde(
        default,
        rename = "pull-requests",
        skip_serializing_if = "Option::is_none"
    )]
    pub pull_requests: Option<JobPermission>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages: Option<JobPermission>,
}

impl JobPermissions {
    pub fn contents(level: JobPermission) -> Self {
        Self {
            contents: Some(level),
            ..Default::default()
        }
    }

    /// Overlay `other` on top of `self`; scopes set in `other` win
    pub fn merged(mut self, other: &JobPermissions) -> Self {
        if other.contents.is_some() {
            self.contents = other.contents;
        }
        if other.id_token.is_some() {
            self.id_token = other.id_token;
        }
        if other.pull_requests.is_some() {
            self.pull_requests = other.pull_requests;
        }
        if other.packages.is_some() {
            self.packages = other.packages;
        }
        self
    }
}

/// Concurrency group of a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concurrency {
    pub group: String,

    #[serde(rename = "cancel-in-progress")]
    pub cancel_in_progress: bool,
}

impl Concurrency {
    /// Queue runs of the same group instead of cancelling the one in progress
    pub fn queued(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            cancel_in_progress: false,
        }
    }
}

/// Container a job runs in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub image: String,
}

/// A single job step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, rename = "if", skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,

    #[serde(default, skip_serializing_if = "StepInputs::is_empty")]
    pub with: StepInputs,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,

    #[serde(
        default,
        rename = "timeout-minutes",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout_minutes: Option<u32>,
}

impl Step {
    /// Step running an action
    pub fn uses(name: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            uses: Some(action.into()),
            ..Default::default()
        }
    }

    /// Step running a shell command
    pub fn run(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            run: Some(command.into()),
            ..Default::default()
        }
    }

    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.with.insert(key.into(), value.into());
        self
    }

    pub fn with_inputs(mut self, inputs: &StepInputs) -> Self {
        self.with
            .extend(inputs.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_timeout(mut self, minutes: u32) -> Self {
        self.timeout_minutes = Some(minutes);
        self
    }
}

/// A workflow job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    #[serde(rename = "runs-on")]
    pub runs_on: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub needs: Vec<String>,

    #[serde(default, rename = "if", skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    #[serde(default)]
    pub permissions: JobPermissions,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<Concurrency>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<Container>,

    pub steps: Vec<Step>,
}

impl Job {
    /// Empty job on the default runner
    pub fn new() -> Self {
        Self {
            runs_on: vec![DEFAULT_RUNNER.to_string()],
            needs: Vec::new(),
            condition: None,
            permissions: JobPermissions::default(),
            environment: None,
            concurrency: None,
            env: BTreeMap::new(),
            container: None,
            steps: Vec::new(),
        }
    }
}

impl Default for Job {
    fn default() -> Self {
        Self::new()
    }
}

/// `workflow_dispatch` trigger (manual run)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDispatch {}

/// `push` / `pull_request` trigger filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchFilter {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,
}

impl BranchFilter {
    pub fn branches<I, S>(branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            branches: branches.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }
}

/// `issue_comment` trigger. Modeled only so it can be rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCommentTrigger {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
}

/// Scheduled trigger entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CronSchedule {
    pub cron: String,
}

/// Events that trigger a workflow (`on:`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triggers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_dispatch: Option<WorkflowDispatch>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<BranchFilter>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<BranchFilter>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_comment: Option<IssueCommentTrigger>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schedule: Vec<CronSchedule>,
}

impl Triggers {
    pub fn is_empty(&self) -> bool {
        self.workflow_dispatch.is_none()
            && self.push.is_none()
            && self.pull_request.is_none()
            && self.issue_comment.is_none()
            && self.schedule.is_empty()
    }

    /// Merge `other` into `self`; events present in `other` replace existing ones
    pub fn merge(&mut self, other: Triggers) {
        if other.workflow_dispatch.is_some() {
            self.workflow_dispatch = other.workflow_dispatch;
        }
        if other.push.is_some() {
            self.push = other.push;
        }
        if other.pull_request.is_some() {
            self.pull_request = other.pull_request;
        }
        if other.issue_comment.is_some() {
            self.issue_comment = other.issue_comment;
        }
        if !other.schedule.is_empty() {
            self.schedule = other.schedule;
        }
    }
}

/// A GitHub Actions workflow with jobs in registration order
#[derive(Debug, Clone, Serialize)]
pub struct Workflow {
    name: String,

    on: Triggers,

    #[serde(serialize_with = "serialize_jobs")]
    jobs: Vec<(String, Job)>,
}

impl Workflow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            on: Triggers::default(),
            jobs: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// File name under `.github/workflows/`
    pub fn file_name(&self) -> String {
        format!("{}.yml", self.name.to_lowercase())
    }

    pub fn triggers(&self) -> &Triggers {
        &self.on
    }

    /// Add trigger events. `issue_comment` is rejected.
    pub fn on(&mut self, triggers: Triggers) -> Result<()> {
        if triggers.issue_comment.is_some() {
            return Err(WorkflowError::ForbiddenTrigger("issue_comment".to_string()));
        }
        self.on.merge(triggers);
        Ok(())
    }

    /// Register a single job
    pub fn add_job(&mut self, id: impl Into<String>, job: Job) -> Result<()> {
        let id = id.into();
        if self.contains_job(&id) {
            return Err(WorkflowError::DuplicateJob(id));
        }
        self.jobs.push((id, job));
        Ok(())
    }

    /// Register several jobs at once. Either all of them are added or none.
    pub fn add_jobs(&mut self, jobs: Vec<(String, Job)>) -> Result<()> {
        for (i, (id, _)) in jobs.iter().enumerate() {
            if self.contains_job(id) || jobs[..i].iter().any(|(other, _)| other == id) {
                return Err(WorkflowError::DuplicateJob(id.clone()));
            }
        }
        self.jobs.extend(jobs);
        Ok(())
    }

    pub fn contains_job(&self, id: &str) -> bool {
        self.jobs.iter().any(|(existing, _)| existing == id)
    }

    pub fn job(&self, id: &str) -> Option<&Job> {
        self.jobs
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, job)| job)
    }

    pub fn job_ids(&self) -> impl Iterator<Item = &str> {
        self.jobs.iter().map(|(id, _)| id.as_str())
    }

    pub fn jobs(&self) -> &[(String, Job)] {
        &self.jobs
    }
}

fn serialize_jobs<S>(jobs: &[(String, Job)], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(jobs.len()))?;
    for (id, job) in jobs {
        map.serialize_entry(id, job)?;
    }
    map.end()
}
