use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::dsl::resource::Resource;
use crate::dsl::{DEFAULT_TASK_TIMEOUT, Target};
use crate::error::{GraphError, Result};

pub const ERROR_MAX_ATTEMPTS_DEFAULT: u32 = 2;
pub const ERROR_BACKOFF_RATE_DEFAULT: f64 = 1.5;
pub const ERROR_INTERVAL_S_DEFAULT: u64 = 60;

/// Error names matched by `ErrorEquals`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorType {
    All,
    Timeout,
    TaskFailed,
    Permissions,
    ResultPathMatchFailure,
    BranchFailed,
    NoChoiceMatched,
    /// Any error name raised by the invoked resource itself.
    Custom(String),
}

impl ErrorType {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorType::All => "States.ALL",
            ErrorType::Timeout => "States.Timeout",
            ErrorType::TaskFailed => "States.TaskFailed",
            ErrorType::Permissions => "States.Permissions",
            ErrorType::ResultPathMatchFailure => "States.ResultPathMatchFailure",
            ErrorType::BranchFailed => "States.BranchFailed",
            ErrorType::NoChoiceMatched => "States.NoChoiceMatched",
            ErrorType::Custom(name) => name,
        }
    }
}

impl From<String> for ErrorType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "States.ALL" => ErrorType::All,
            "States.Timeout" => ErrorType::Timeout,
            "States.TaskFailed" => ErrorType::TaskFailed,
            "States.Permissions" => ErrorType::Permissions,
            "States.ResultPathMatchFailure" => ErrorType::ResultPathMatchFailure,
            "States.BranchFailed" => ErrorType::BranchFailed,
            "States.NoChoiceMatched" => ErrorType::NoChoiceMatched,
            _ => ErrorType::Custom(name),
        }
    }
}

impl From<&str> for ErrorType {
    fn from(name: &str) -> Self {
        ErrorType::from(name.to_string())
    }
}

impl From<ErrorType> for String {
    fn from(error: ErrorType) -> Self {
        match error {
            ErrorType::Custom(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn require_errors(error_equals: &[ErrorType], owner: &str) -> Result<()> {
    if error_equals.is_empty() {
        return Err(GraphError::InvalidArgument(format!(
            "{} needs at least one error name",
            owner
        )));
    }
    Ok(())
}

/// Retry policy attached to a Task.
#[derive(Debug, Clone, PartialEq)]
pub struct Retrier {
    pub error_equals: Vec<ErrorType>,
    pub max_attempts: u32,
    pub backoff_rate: f64,
    pub interval_seconds: u64,
}

impl Default for Retrier {
    fn default() -> Self {
        Self {
            error_equals: vec![ErrorType::All],
            max_attempts: ERROR_MAX_ATTEMPTS_DEFAULT,
            backoff_rate: ERROR_BACKOFF_RATE_DEFAULT,
            interval_seconds: ERROR_INTERVAL_S_DEFAULT,
        }
    }
}

impl Retrier {
    pub fn new(error_equals: Vec<ErrorType>) -> Result<Self> {
        require_errors(&error_equals, "a retrier")?;
        Ok(Self {
            error_equals,
            ..Self::default()
        })
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn interval_seconds(mut self, interval_seconds: u64) -> Self {
        self.interval_seconds = interval_seconds;
        self
    }

    /// The interval is multiplied by this rate after every attempt, so it cannot shrink.
    pub fn backoff_rate(mut self, backoff_rate: f64) -> Result<Self> {
        if backoff_rate.is_nan() || backoff_rate < 1.0 {
            return Err(GraphError::InvalidArgument(format!(
                "backoff rate must be at least 1.0, got {}",
                backoff_rate
            )));
        }
        self.backoff_rate = backoff_rate;
        Ok(self)
    }
}

/// Redirects the listed errors to a fallback state.
#[derive(Debug, Clone, PartialEq)]
pub struct Catcher {
    pub error_equals: Vec<ErrorType>,
    next: Target,
    pub result_path: Option<String>,
}

impl Catcher {
    pub fn new(error_equals: Vec<ErrorType>, next: impl Into<Target>) -> Result<Self> {
        require_errors(&error_equals, "a catcher")?;
        Ok(Self {
            error_equals,
            next: next.into(),
            result_path: None,
        })
    }

    /// Catches every error (`States.ALL`).
    pub fn all(next: impl Into<Target>) -> Self {
        Self {
            error_equals: vec![ErrorType::All],
            next: next.into(),
            result_path: None,
        }
    }

    pub fn result_path(mut self, path: impl Into<String>) -> Self {
        self.result_path = Some(path.into());
        self
    }

    pub fn next(&self) -> &str {
        self.next.name()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    resource: Resource,
    pub result_path: Option<String>,
    pub retry: Option<Vec<Retrier>>,
    pub catch: Option<Vec<Catcher>>,
    pub timeout_seconds: u64,
    pub heartbeat_seconds: Option<u64>,
    pub parameters: Option<Value>,
}

impl Task {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            result_path: None,
            retry: None,
            catch: None,
            timeout_seconds: DEFAULT_TASK_TIMEOUT,
            heartbeat_seconds: None,
            parameters: None,
        }
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn result_path(mut self, path: impl Into<String>) -> Self {
        self.result_path = Some(path.into());
        self
    }

    pub fn retry(mut self, retriers: Vec<Retrier>) -> Self {
        self.retry = Some(retriers);
        self
    }

    pub fn catch(mut self, catchers: Vec<Catcher>) -> Self {
        self.catch = Some(catchers);
        self
    }

    pub fn timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    pub fn heartbeat_seconds(mut self, seconds: u64) -> Self {
        self.heartbeat_seconds = Some(seconds);
        self
    }

    pub fn parameters(mut self, parameters: Value) -> Self {
        self.parameters = Some(parameters);
        self
    }
}

/// Submits an AWS Batch job and waits for it to finish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub job_name: String,
    pub job_definition: String,
    pub job_queue: String,
    /// JSON path to the job parameters in the state input.
    pub parameters: Option<String>,
}

impl BatchJob {
    pub fn new(
        job_name: impl Into<String>,
        job_definition: impl Into<String>,
        job_queue: impl Into<String>,
    ) -> Self {
        Self {
            job_name: job_name.into(),
            job_definition: job_definition.into(),
            job_queue: job_queue.into(),
            parameters: None,
        }
    }

    pub fn parameters(mut self, path: impl Into<String>) -> Self {
        self.parameters = Some(path.into());
        self
    }
}

impl From<BatchJob> for Task {
    fn from(job: BatchJob) -> Self {
        let mut parameters = Map::new();
        parameters.insert("JobDefinition".into(), json!(job.job_definition));
        parameters.insert("JobName".into(), json!(job.job_name));
        parameters.insert("JobQueue".into(), json!(job.job_queue));
        if let Some(path) = job.parameters {
            parameters.insert("Parameters.$".into(), json!(path));
        }
        Task::new(Resource::batch()).parameters(Value::Object(parameters))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LaunchType {
    Fargate,
    Ec2,
}

impl LaunchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LaunchType::Fargate => "FARGATE",
            LaunchType::Ec2 => "EC2",
        }
    }
}

/// Runs an ECS task and waits for it to stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcsTask {
    pub cluster: String,
    pub task_definition: String,
    pub launch_type: LaunchType,
}

impl EcsTask {
    pub fn new(
        cluster: impl Into<String>,
        task_definition: impl Into<String>,
        launch_type: LaunchType,
    ) -> Self {
        Self {
            cluster: cluster.into(),
            task_definition: task_definition.into(),
            launch_type,
        }
    }
}

impl From<EcsTask> for Task {
    fn from(task: EcsTask) -> Self {
        Task::new(Resource::ecs()).parameters(json!({
            "Cluster": task.cluster,
            "LaunchType": task.launch_type.as_str(),
            "TaskDefinition": task.task_definition,
            "NetworkConfiguration": {},
            "Overrides": {},
        }))
    }
}
