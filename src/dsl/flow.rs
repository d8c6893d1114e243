use serde_json::Value;

use crate::dsl::DEFAULT_WAIT_SECONDS;
use crate::dsl::builder::Graph;
use crate::dsl::task::Catcher;
use crate::error::{GraphError, Result};

/// Passes its input through, optionally replacing it with a fixed result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pass {
    pub result: Option<Value>,
    pub result_path: Option<String>,
}

impl Pass {
    pub fn result(mut self, result: impl Into<Value>) -> Self {
        self.result = Some(result.into());
        self
    }

    pub fn result_path(mut self, path: impl Into<String>) -> Self {
        self.result_path = Some(path.into());
        self
    }
}

/// How long a Wait state holds. Exactly one form is emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitFor {
    Seconds(u64),
    Timestamp(String),
    SecondsPath(String),
    TimestampPath(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wait {
    pub wait_for: WaitFor,
}

impl Default for Wait {
    fn default() -> Self {
        Self::seconds(DEFAULT_WAIT_SECONDS)
    }
}

impl Wait {
    pub fn seconds(seconds: u64) -> Self {
        Self {
            wait_for: WaitFor::Seconds(seconds),
        }
    }

    pub fn timestamp(timestamp: impl Into<String>) -> Self {
        Self {
            wait_for: WaitFor::Timestamp(timestamp.into()),
        }
    }

    pub fn seconds_path(path: impl Into<String>) -> Self {
        Self {
            wait_for: WaitFor::SecondsPath(path.into()),
        }
    }

    pub fn timestamp_path(path: impl Into<String>) -> Self {
        Self {
            wait_for: WaitFor::TimestampPath(path.into()),
        }
    }

    /// The fixed delay, if this wait is expressed in seconds.
    pub fn wait_seconds(&self) -> Option<u64> {
        match self.wait_for {
            WaitFor::Seconds(seconds) => Some(seconds),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fail {
    pub error: Option<String>,
    pub cause: Option<String>,
}

impl Fail {
    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }
}

/// 并行状态：每个分支都是一个独立的子图
///
/// Catchers handed to [`Parallel::catch`] are held back and only attached when
/// the enclosing graph is built, together with building every branch.
#[derive(Debug, Clone, PartialEq)]
pub struct Parallel {
    branches: Vec<Graph>,
    declared_catch: Option<Vec<Catcher>>,
    catch: Option<Vec<Catcher>>,
    pub result_path: Option<String>,
}

impl Parallel {
    /// Branches never carry their own `TimeoutSeconds`; any value set on them is dropped here.
    pub fn new(branches: Vec<Graph>) -> Result<Self> {
        if branches.is_empty() {
            return Err(GraphError::InvalidArgument(
                "a parallel state needs at least one branch".into(),
            ));
        }
        Ok(Self {
            branches: branches.into_iter().map(Graph::into_branch).collect(),
            declared_catch: None,
            catch: None,
            result_path: None,
        })
    }

    pub fn catch(mut self, catchers: Vec<Catcher>) -> Self {
        self.declared_catch = Some(catchers);
        self
    }

    pub fn result_path(mut self, path: impl Into<String>) -> Self {
        self.result_path = Some(path.into());
        self
    }

    pub fn branches(&self) -> &[Graph] {
        &self.branches
    }

    /// Catchers attached by the last build, `None` before that.
    pub fn attached_catch(&self) -> Option<&[Catcher]> {
        self.catch.as_deref()
    }

    pub(crate) fn finalize(&mut self) -> Result<()> {
        let branches = std::mem::take(&mut self.branches);
        self.branches = branches
            .into_iter()
            .map(Graph::build)
            .collect::<Result<Vec<_>>>()?;
        self.catch = self.declared_catch.clone();
        Ok(())
    }
}
