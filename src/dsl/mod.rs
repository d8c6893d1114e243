pub mod builder;
pub mod choice;
pub mod flow;
pub mod resource;
pub mod task;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

pub use builder::Graph;
pub use choice::{Choice, ChoiceCase, Comparison, ComparisonType, Condition};
pub use flow::{Fail, Parallel, Pass, Wait, WaitFor};
pub use resource::{Resource, ResourceType};
pub use task::{BatchJob, Catcher, EcsTask, ErrorType, LaunchType, Retrier, Task};

pub const DEFAULT_TASK_TIMEOUT: u64 = 600;
pub const DEFAULT_WAIT_SECONDS: u64 = 600;

/// 状态类型，对应输出文档中的 `Type` 字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateType {
    Task,
    Pass,
    Wait,
    Choice,
    Parallel,
    Succeed,
    Fail,
}

impl StateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateType::Task => "Task",
            StateType::Pass => "Pass",
            StateType::Wait => "Wait",
            StateType::Choice => "Choice",
            StateType::Parallel => "Parallel",
            StateType::Succeed => "Succeed",
            StateType::Fail => "Fail",
        }
    }

    /// Succeed and Fail end an execution by themselves and never carry `End` or `Next`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StateType::Succeed | StateType::Fail)
    }
}

impl fmt::Display for StateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference to another state by name.
///
/// Catchers, choice cases and explicit `Next` links only ever need the target's
/// name, and names never change after a state is created, so the name is
/// captured eagerly instead of holding on to the state itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target(String);

impl Target {
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&State> for Target {
    fn from(state: &State) -> Self {
        Target(state.name.clone())
    }
}

impl From<&str> for Target {
    fn from(name: &str) -> Self {
        Target(name.to_string())
    }
}

impl From<String> for Target {
    fn from(name: String) -> Self {
        Target(name)
    }
}

impl From<&String> for Target {
    fn from(name: &String) -> Self {
        Target(name.clone())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Variant-specific part of a state.
#[derive(Debug, Clone, PartialEq)]
pub enum StateKind {
    Task(Task),
    Pass(Pass),
    Wait(Wait),
    Choice(Choice),
    Parallel(Parallel),
    Succeed,
    Fail(Fail),
}

impl StateKind {
    pub fn state_type(&self) -> StateType {
        match self {
            StateKind::Task(_) => StateType::Task,
            StateKind::Pass(_) => StateType::Pass,
            StateKind::Wait(_) => StateType::Wait,
            StateKind::Choice(_) => StateType::Choice,
            StateKind::Parallel(_) => StateType::Parallel,
            StateKind::Succeed => StateType::Succeed,
            StateKind::Fail(_) => StateType::Fail,
        }
    }
}

impl From<Task> for StateKind {
    fn from(task: Task) -> Self {
        StateKind::Task(task)
    }
}

impl From<BatchJob> for StateKind {
    fn from(job: BatchJob) -> Self {
        StateKind::Task(job.into())
    }
}

impl From<EcsTask> for StateKind {
    fn from(task: EcsTask) -> Self {
        StateKind::Task(task.into())
    }
}

impl From<Pass> for StateKind {
    fn from(pass: Pass) -> Self {
        StateKind::Pass(pass)
    }
}

impl From<Wait> for StateKind {
    fn from(wait: Wait) -> Self {
        StateKind::Wait(wait)
    }
}

impl From<Choice> for StateKind {
    fn from(choice: Choice) -> Self {
        StateKind::Choice(choice)
    }
}

impl From<Parallel> for StateKind {
    fn from(parallel: Parallel) -> Self {
        StateKind::Parallel(parallel)
    }
}

impl From<Fail> for StateKind {
    fn from(fail: Fail) -> Self {
        StateKind::Fail(fail)
    }
}

/// 工作流图中的一个节点
///
/// `name` and the variant are fixed at construction. `next` and `end` are the
/// structural fields owned by the graph builder: `next` can be set exactly once,
/// `end` is recomputed every time the enclosing graph is built.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    name: String,
    pub comment: Option<String>,
    pub input_path: Option<String>,
    pub output_path: Option<String>,
    next: Option<String>,
    end: bool,
    kind: StateKind,
}

impl State {
    pub fn new(name: impl Into<String>, kind: impl Into<StateKind>) -> Self {
        Self {
            name: name.into(),
            comment: None,
            input_path: None,
            output_path: None,
            next: None,
            end: false,
            kind: kind.into(),
        }
    }

    pub fn task(name: impl Into<String>, resource: Resource) -> Self {
        Self::new(name, Task::new(resource))
    }

    pub fn pass(name: impl Into<String>) -> Self {
        Self::new(name, Pass::default())
    }

    pub fn wait(name: impl Into<String>, seconds: u64) -> Self {
        Self::new(name, Wait::seconds(seconds))
    }

    pub fn succeed(name: impl Into<String>) -> Self {
        Self::new(name, StateKind::Succeed)
    }

    pub fn fail(name: impl Into<String>) -> Self {
        Self::new(name, Fail::default())
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn input_path(mut self, path: impl Into<String>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    pub fn output_path(mut self, path: impl Into<String>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Wires an explicit successor. Same rules as [`State::set_next`].
    pub fn with_next(mut self, target: impl Into<Target>) -> Self {
        self.set_next(target);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &StateKind {
        &self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut StateKind {
        &mut self.kind
    }

    pub fn state_type(&self) -> StateType {
        self.kind.state_type()
    }

    pub fn is_inherently_terminal(&self) -> bool {
        self.state_type().is_terminal()
    }

    pub fn next_state(&self) -> Option<&str> {
        self.next.as_deref()
    }

    pub fn is_end(&self) -> bool {
        self.end
    }

    /// Sets the successor if none is set yet.
    ///
    /// Returns `true` when this call set the value and `false` when a successor
    /// was already present, in which case the existing one is kept. Succeed and
    /// Fail states never take a successor.
    pub fn set_next(&mut self, target: impl Into<Target>) -> bool {
        let target = target.into();
        if self.is_inherently_terminal() {
            trace!(state = %self.name, ignored = %target, "terminal state takes no successor");
            return false;
        }
        if let Some(existing) = &self.next {
            trace!(state = %self.name, kept = %existing, ignored = %target, "successor already set");
            return false;
        }
        self.next = Some(target.0);
        true
    }

    pub(crate) fn mark_end(&mut self, end: bool) {
        self.end = end;
    }
}
