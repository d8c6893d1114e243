//! Declarative workflow definitions in YAML.
//!
//! States are listed in authoring order and fed through the same builder
//! operations a caller would use, so naming and argument errors surface exactly
//! as they do in code. A definition looks like:
//!
//! ```yaml
//! name: orders
//! region: eu-west-1
//! account: "123456789012"
//! states:
//!   - name: Charge
//!     type: Task
//!     resource: { name: charge-card, type: lambda }
//!     catch:
//!       - error_equals: [States.ALL]
//!         next: Refund
//!   - name: Done
//!     type: Succeed
//!   - name: Refund
//!     type: Pass
//!     chained: false
//! ```

use std::fs;

use anyhow::{Context as AnyhowContext, Result, anyhow, bail};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::dsl::builder::Graph;
use crate::dsl::choice::{Choice, ChoiceCase, Comparison, ComparisonType, Condition};
use crate::dsl::flow::{Fail, Parallel, Pass, Wait};
use crate::dsl::resource::{Resource, ResourceType};
use crate::dsl::task::{BatchJob, Catcher, EcsTask, ErrorType, LaunchType, Retrier, Task};
use crate::dsl::{State, StateKind};

#[derive(Debug, Clone, Deserialize)]
pub struct GraphDef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub account: String,
    pub comment: Option<String>,
    pub version: Option<String>,
    pub timeout_seconds: Option<u64>,
    #[serde(default)]
    pub states: Vec<StateDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BranchDef {
    #[serde(default)]
    pub name: String,
    pub comment: Option<String>,
    #[serde(default)]
    pub states: Vec<StateDef>,
}

fn default_chained() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct StateDef {
    pub name: String,
    /// `false` inserts the state without auto-chaining it.
    #[serde(default = "default_chained")]
    pub chained: bool,
    pub comment: Option<String>,
    pub input_path: Option<String>,
    pub output_path: Option<String>,
    pub next: Option<String>,
    #[serde(flatten)]
    pub kind: KindDef,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum KindDef {
    Task {
        resource: ResourceDef,
        result_path: Option<String>,
        retry: Option<Vec<RetrierDef>>,
        catch: Option<Vec<CatcherDef>>,
        timeout_seconds: Option<u64>,
        heartbeat_seconds: Option<u64>,
        parameters: Option<Value>,
    },
    BatchJob {
        job_name: String,
        job_definition: String,
        job_queue: String,
        parameters: Option<String>,
    },
    EcsTask {
        cluster: String,
        task_definition: String,
        launch_type: LaunchType,
    },
    Pass {
        result: Option<Value>,
        result_path: Option<String>,
    },
    Wait {
        seconds: Option<u64>,
        timestamp: Option<String>,
        seconds_path: Option<String>,
        timestamp_path: Option<String>,
    },
    Choice {
        /// Each case mirrors the document form: `variable`, one operator key
        /// such as `BooleanEquals`, or `and` / `or` / `not`, plus `next`.
        choices: Vec<Map<String, Value>>,
        default: String,
    },
    Parallel {
        branches: Vec<BranchDef>,
        catch: Option<Vec<CatcherDef>>,
        result_path: Option<String>,
    },
    Succeed,
    Fail {
        error: Option<String>,
        cause: Option<String>,
    },
}

/// Either a full ARN or its parts. Missing region/account fall back to the graph's.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ResourceDef {
    Arn(String),
    Parts {
        #[serde(default)]
        name: String,
        #[serde(rename = "type")]
        resource_type: ResourceType,
        region: Option<String>,
        account: Option<String>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrierDef {
    pub error_equals: Option<Vec<ErrorType>>,
    pub max_attempts: Option<u32>,
    pub backoff_rate: Option<f64>,
    pub interval_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatcherDef {
    pub error_equals: Option<Vec<ErrorType>>,
    pub next: String,
    pub result_path: Option<String>,
}

/// Region and account inherited by every resource in the definition.
struct Scope<'a> {
    region: &'a str,
    account: &'a str,
}

pub fn load_graph_from_yaml(file_path: &str) -> Result<Graph> {
    let yaml_content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read YAML file from {}", file_path))?;

    parse_graph(&yaml_content).with_context(|| format!("Failed to load workflow from {}", file_path))
}

/// Parses a definition and returns the built graph.
pub fn parse_graph(yaml_content: &str) -> Result<Graph> {
    let definition: GraphDef =
        serde_yaml::from_str(yaml_content).context("Failed to deserialize YAML content")?;
    build_graph(definition)
}

pub fn build_graph(definition: GraphDef) -> Result<Graph> {
    let scope = Scope {
        region: &definition.region,
        account: &definition.account,
    };

    let mut graph = Graph::new(definition.name.clone())
        .region(definition.region.clone())
        .account(definition.account.clone());
    if let Some(comment) = &definition.comment {
        graph = graph.comment(comment.clone());
    }
    if let Some(version) = &definition.version {
        graph = graph.version(version.clone());
    }
    if let Some(timeout) = definition.timeout_seconds {
        graph = graph.timeout_seconds(timeout);
    }

    let graph = add_states(graph, &definition.states, &scope)?;
    debug!(graph = %graph.name(), states = graph.count_states(), "definition loaded");
    Ok(graph.build()?)
}

fn add_states(mut graph: Graph, states: &[StateDef], scope: &Scope<'_>) -> Result<Graph> {
    for def in states {
        let state = build_state(def, scope)
            .with_context(|| format!("Invalid state '{}'", def.name))?;
        graph = if def.chained {
            graph.next(state)?
        } else {
            graph.add_state(state)?
        };
    }
    Ok(graph)
}

fn build_state(def: &StateDef, scope: &Scope<'_>) -> Result<State> {
    let kind = build_kind(&def.kind, scope)?;

    let mut state = State::new(def.name.clone(), kind);
    state.comment = def.comment.clone();
    state.input_path = def.input_path.clone();
    state.output_path = def.output_path.clone();
    if let Some(next) = &def.next {
        if !state.set_next(next) {
            bail!("a {} state cannot have a next state", state.state_type());
        }
    }
    Ok(state)
}

fn build_kind(def: &KindDef, scope: &Scope<'_>) -> Result<StateKind> {
    let kind = match def {
        KindDef::Task {
            resource,
            result_path,
            retry,
            catch,
            timeout_seconds,
            heartbeat_seconds,
            parameters,
        } => {
            let mut task = Task::new(build_resource(resource, scope)?);
            task.result_path = result_path.clone();
            task.retry = retry.as_deref().map(build_retriers).transpose()?;
            task.catch = catch.as_deref().map(build_catchers).transpose()?;
            if let Some(timeout) = timeout_seconds {
                task.timeout_seconds = *timeout;
            }
            task.heartbeat_seconds = *heartbeat_seconds;
            task.parameters = parameters.clone();
            StateKind::Task(task)
        }
        KindDef::BatchJob {
            job_name,
            job_definition,
            job_queue,
            parameters,
        } => {
            let mut job = BatchJob::new(job_name.clone(), job_definition.clone(), job_queue.clone());
            job.parameters = parameters.clone();
            job.into()
        }
        KindDef::EcsTask {
            cluster,
            task_definition,
            launch_type,
        } => EcsTask::new(cluster.clone(), task_definition.clone(), *launch_type).into(),
        KindDef::Pass { result, result_path } => Pass {
            result: result.clone(),
            result_path: result_path.clone(),
        }
        .into(),
        KindDef::Wait {
            seconds,
            timestamp,
            seconds_path,
            timestamp_path,
        } => {
            let wait = match (seconds, timestamp, seconds_path, timestamp_path) {
                (Some(s), None, None, None) => Wait::seconds(*s),
                (None, Some(ts), None, None) => Wait::timestamp(ts.clone()),
                (None, None, Some(path), None) => Wait::seconds_path(path.clone()),
                (None, None, None, Some(path)) => Wait::timestamp_path(path.clone()),
                (None, None, None, None) => Wait::default(),
                _ => bail!("a wait state takes only one of seconds, timestamp, seconds_path, timestamp_path"),
            };
            wait.into()
        }
        KindDef::Choice { choices, default } => {
            let cases = choices
                .iter()
                .map(build_choice_case)
                .collect::<Result<Vec<_>>>()?;
            Choice::new(cases, default)?.into()
        }
        KindDef::Parallel {
            branches,
            catch,
            result_path,
        } => {
            let branches = branches
                .iter()
                .map(|branch| build_branch(branch, scope))
                .collect::<Result<Vec<_>>>()?;
            let mut parallel = Parallel::new(branches)?;
            if let Some(catch) = catch {
                parallel = parallel.catch(build_catchers(catch)?);
            }
            parallel.result_path = result_path.clone();
            parallel.into()
        }
        KindDef::Succeed => StateKind::Succeed,
        KindDef::Fail { error, cause } => Fail {
            error: error.clone(),
            cause: cause.clone(),
        }
        .into(),
    };
    Ok(kind)
}

fn build_branch(def: &BranchDef, scope: &Scope<'_>) -> Result<Graph> {
    let mut branch = Graph::branch(def.name.clone());
    if let Some(comment) = &def.comment {
        branch = branch.comment(comment.clone());
    }
    add_states(branch, &def.states, scope)
        .with_context(|| format!("Invalid branch '{}'", def.name))
}

fn build_resource(def: &ResourceDef, scope: &Scope<'_>) -> Result<Resource> {
    let resource = match def {
        ResourceDef::Arn(arn) => Resource::from_arn(arn)?,
        ResourceDef::Parts {
            name,
            resource_type,
            region,
            account,
        } => Resource::new(name.clone(), *resource_type)?
            .region(region.as_deref().unwrap_or(scope.region))
            .account(account.as_deref().unwrap_or(scope.account)),
    };
    Ok(resource)
}

fn build_retriers(defs: &[RetrierDef]) -> Result<Vec<Retrier>> {
    defs.iter()
        .map(|def| {
            let mut retrier = match &def.error_equals {
                Some(errors) => Retrier::new(errors.clone())?,
                None => Retrier::default(),
            };
            if let Some(attempts) = def.max_attempts {
                retrier = retrier.max_attempts(attempts);
            }
            if let Some(interval) = def.interval_seconds {
                retrier = retrier.interval_seconds(interval);
            }
            if let Some(rate) = def.backoff_rate {
                retrier = retrier.backoff_rate(rate)?;
            }
            Ok(retrier)
        })
        .collect()
}

fn build_catchers(defs: &[CatcherDef]) -> Result<Vec<Catcher>> {
    defs.iter()
        .map(|def| {
            let mut catcher = match &def.error_equals {
                Some(errors) => Catcher::new(errors.clone(), &def.next)?,
                None => Catcher::all(&def.next),
            };
            catcher.result_path = def.result_path.clone();
            Ok(catcher)
        })
        .collect()
}

fn build_choice_case(def: &Map<String, Value>) -> Result<ChoiceCase> {
    let next = def
        .get("next")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("Choice case is missing 'next'"))?;

    let mut rule = def.clone();
    rule.remove("next");
    Ok(ChoiceCase::when(build_condition(&rule)?, next))
}

fn build_condition(rule: &Map<String, Value>) -> Result<Condition> {
    let logical = ["and", "or", "not"].into_iter().find(|key| rule.contains_key(*key));
    if let Some(key) = logical {
        if rule.len() != 1 {
            let keys: Vec<&str> = rule.keys().map(String::as_str).collect();
            bail!("Logical rule '{}' must be the only key, got [{}]", key, keys.join(", "));
        }
        let operand = &rule[key];
        if key == "not" {
            return Ok(Condition::not(as_rule(operand)?));
        }
        let operands = operand
            .as_array()
            .ok_or_else(|| anyhow!("'{}' takes a list of rules", key))?
            .iter()
            .map(as_rule)
            .collect::<Result<Vec<_>>>()?;
        let condition = if key == "and" {
            Condition::and(operands)?
        } else {
            Condition::or(operands)?
        };
        return Ok(condition);
    }

    let variable = rule
        .get("variable")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("Choice rule is missing 'variable'"))?;
    let mut operators = rule.iter().filter(|(key, _)| key.as_str() != "variable");
    let (operator, operand) = match (operators.next(), operators.next()) {
        (Some(op), None) => op,
        _ => bail!("Choice rule on '{}' needs exactly one comparison operator", variable),
    };
    let comparison = Comparison::new(operator.parse::<ComparisonType>()?, operand.clone())?;
    Ok(Condition::compare(variable, comparison))
}

fn as_rule(value: &Value) -> Result<Condition> {
    let rule = value
        .as_object()
        .ok_or_else(|| anyhow!("Choice rule must be a mapping, got {}", value))?;
    build_condition(rule)
}
