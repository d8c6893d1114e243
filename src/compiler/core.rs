use serde_json::{Map, Value, json};

use crate::compiler::fields::filter_fields;
use crate::dsl::builder::Graph;
use crate::dsl::choice::{ChoiceCase, Comparison, Condition};
use crate::dsl::flow::WaitFor;
use crate::dsl::resource::Resource;
use crate::dsl::task::{Catcher, ErrorType, Retrier};
use crate::dsl::{State, StateKind};

/// Converts a model value into a plain JSON tree using the document's key names.
///
/// Objects come out as `serde_json::Map`, which keeps keys sorted, so the same
/// value always produces the same document.
pub trait ToDocument {
    fn to_document(&self) -> Value;
}

type Fields = Vec<(&'static str, Option<Value>)>;

fn text(value: &Option<String>) -> Option<Value> {
    value.as_ref().map(|s| Value::String(s.clone()))
}

fn list<T: ToDocument>(items: &[T]) -> Value {
    Value::Array(items.iter().map(ToDocument::to_document).collect())
}

fn object<K: Into<String>>(fields: Vec<(K, Option<Value>)>) -> Value {
    Value::Object(filter_fields(fields))
}

impl ToDocument for Resource {
    fn to_document(&self) -> Value {
        Value::String(self.arn())
    }
}

impl ToDocument for ErrorType {
    fn to_document(&self) -> Value {
        Value::String(self.as_str().to_string())
    }
}

impl ToDocument for Retrier {
    fn to_document(&self) -> Value {
        object(vec![
            ("BackoffRate", Some(json!(self.backoff_rate))),
            ("ErrorEquals", Some(list(&self.error_equals))),
            ("IntervalSeconds", Some(json!(self.interval_seconds))),
            ("MaxAttempts", Some(json!(self.max_attempts))),
        ])
    }
}

impl ToDocument for Catcher {
    fn to_document(&self) -> Value {
        object(vec![
            ("ErrorEquals", Some(list(&self.error_equals))),
            ("Next", Some(json!(self.next()))),
            ("ResultPath", text(&self.result_path)),
        ])
    }
}

impl ToDocument for Comparison {
    fn to_document(&self) -> Value {
        let mut map = Map::new();
        map.insert(self.comparison_type().as_str().to_string(), self.value().clone());
        Value::Object(map)
    }
}

// The operator name is the key, so the key set depends on the value here.
fn condition_fields(condition: &Condition) -> Vec<(String, Option<Value>)> {
    match condition {
        Condition::Compare { variable, comparison } => vec![
            ("Variable".to_string(), Some(json!(variable))),
            (
                comparison.comparison_type().as_str().to_string(),
                Some(comparison.value().clone()),
            ),
        ],
        Condition::And(conditions) => vec![("And".to_string(), Some(list(conditions)))],
        Condition::Or(conditions) => vec![("Or".to_string(), Some(list(conditions)))],
        Condition::Not(inner) => vec![("Not".to_string(), Some(inner.to_document()))],
    }
}

impl ToDocument for Condition {
    fn to_document(&self) -> Value {
        object(condition_fields(self))
    }
}

impl ToDocument for ChoiceCase {
    fn to_document(&self) -> Value {
        let mut fields = condition_fields(self.condition());
        fields.push(("Next".to_string(), Some(json!(self.next()))));
        object(fields)
    }
}

fn kind_fields(kind: &StateKind) -> Fields {
    match kind {
        StateKind::Task(task) => vec![
            ("Resource", Some(task.resource().to_document())),
            ("ResultPath", text(&task.result_path)),
            ("Retry", task.retry.as_deref().map(list)),
            ("Catch", task.catch.as_deref().map(list)),
            ("TimeoutSeconds", Some(json!(task.timeout_seconds))),
            ("HeartbeatSeconds", task.heartbeat_seconds.map(|s| json!(s))),
            ("Parameters", task.parameters.clone()),
        ],
        StateKind::Pass(pass) => vec![
            ("Result", pass.result.clone()),
            ("ResultPath", text(&pass.result_path)),
        ],
        StateKind::Wait(wait) => match &wait.wait_for {
            WaitFor::Seconds(seconds) => vec![("Seconds", Some(json!(seconds)))],
            WaitFor::Timestamp(ts) => vec![("Timestamp", Some(json!(ts)))],
            WaitFor::SecondsPath(path) => vec![("SecondsPath", Some(json!(path)))],
            WaitFor::TimestampPath(path) => vec![("TimestampPath", Some(json!(path)))],
        },
        StateKind::Choice(choice) => vec![
            ("Choices", Some(list(choice.choices()))),
            ("Default", Some(json!(choice.default_state()))),
        ],
        StateKind::Parallel(parallel) => vec![
            ("Branches", Some(list(parallel.branches()))),
            ("Catch", parallel.attached_catch().map(list)),
            ("ResultPath", text(&parallel.result_path)),
        ],
        StateKind::Succeed => Vec::new(),
        StateKind::Fail(fail) => vec![("Error", text(&fail.error)), ("Cause", text(&fail.cause))],
    }
}

impl ToDocument for State {
    fn to_document(&self) -> Value {
        let mut fields: Fields = vec![
            ("_name", Some(json!(self.name()))),
            ("Type", Some(json!(self.state_type().as_str()))),
            ("Comment", text(&self.comment)),
            ("InputPath", text(&self.input_path)),
            ("OutputPath", text(&self.output_path)),
            ("Next", self.next_state().map(|next| json!(next))),
            ("End", self.is_end().then_some(Value::Bool(true))),
        ];
        fields.extend(kind_fields(self.kind()));
        object(fields)
    }
}

impl ToDocument for Graph {
    fn to_document(&self) -> Value {
        let states = self.built_states().map(|states| {
            Value::Object(
                states
                    .map(|(name, state)| (name.to_string(), state.to_document()))
                    .collect(),
            )
        });

        object(vec![
            ("_name", Some(json!(self.name()))),
            ("Comment", text(&self.comment)),
            ("StartAt", self.start_at().map(|start| json!(start))),
            ("States", states),
            ("TimeoutSeconds", self.timeout().map(|t| json!(t))),
            ("Version", text(&self.version)),
        ])
    }
}
