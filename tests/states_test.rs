use serde_json::json;
use stepgraph::compiler::core::ToDocument;
use stepgraph::compiler::emit::{EmitOptions, to_json};
use stepgraph::dsl::{
    BatchJob, Catcher, Choice, ChoiceCase, Comparison, ComparisonType, Condition, EcsTask, ErrorType, Fail,
    LaunchType, Pass, Resource, ResourceType, Retrier, State, StateType, Task, Wait,
};
use stepgraph::error::GraphError;

#[test]
fn test_state_type_to_str() {
    assert_eq!(StateType::Choice.to_string(), "Choice");
    assert!(StateType::Succeed.is_terminal());
    assert!(StateType::Fail.is_terminal());
    assert!(!StateType::Choice.is_terminal());
}

#[test]
fn test_comparison_type_to_str() {
    assert_eq!(ComparisonType::BooleanEquals.to_string(), "BooleanEquals");
    assert_eq!(
        "TimestampGreaterThanEquals".parse::<ComparisonType>().unwrap(),
        ComparisonType::TimestampGreaterThanEquals
    );
    assert!("Equals".parse::<ComparisonType>().is_err());
}

#[test]
fn test_resource_to_json() {
    let res = Resource::lambda("foo-trigger").unwrap().account("1234").region("eu-west-1");
    assert_eq!(
        to_json(&res, &EmitOptions::compact()).unwrap(),
        r#""arn:aws:lambda:eu-west-1:1234:function:foo-trigger""#
    );

    assert_eq!(Resource::lambda("trigger").unwrap().arn(), "arn:aws:lambda:::function:trigger");
    assert_eq!(Resource::activity("trigger").unwrap().arn(), "arn:aws:states:::activity:trigger");
    assert_eq!(Resource::batch().region("eu-west-1").arn(), "arn:aws:states:::batch:submitJob.sync");
    assert_eq!(Resource::ecs().arn(), "arn:aws:states:::ecs:runTask.sync");
}

#[test]
fn test_resource_requires_name_for_lambda_and_activity() {
    assert!(matches!(Resource::lambda(""), Err(GraphError::InvalidArgument(_))));
    assert!(matches!(Resource::activity(""), Err(GraphError::InvalidArgument(_))));
    assert!(Resource::new("", ResourceType::Batch).is_ok());
}

#[test]
fn test_resource_from_arn() {
    let res = Resource::from_arn("arn:aws:lambda:eu-west-1:1234:function:foo-trigger").unwrap();
    assert_eq!(res.resource_type(), ResourceType::Lambda);
    assert_eq!(res.name(), "foo-trigger");
    assert_eq!(res.arn(), "arn:aws:lambda:eu-west-1:1234:function:foo-trigger");

    let res = Resource::from_arn("arn:aws:states:::activity:fooAct").unwrap();
    assert_eq!(res.resource_type(), ResourceType::Activity);

    assert_eq!(
        Resource::from_arn("arn:aws:states:::ecs:runTask.sync").unwrap().resource_type(),
        ResourceType::Ecs
    );

    assert!(matches!(Resource::from_arn("some"), Err(GraphError::InvalidArgument(_))));
    assert!(Resource::from_arn("arn:aws:s3:::bucket:object:key").is_err());
    assert!(Resource::from_arn("arn:aws:lambda:::function:").is_err());
}

#[test]
fn test_lambda_task_to_json() {
    let task = State::task("sdfdsf", Resource::lambda("trigger").unwrap());
    assert_eq!(
        task.to_document(),
        json!({
            "Type": "Task",
            "Resource": "arn:aws:lambda:::function:trigger",
            "TimeoutSeconds": 600
        })
    );

    let doc = task.to_document();
    for absent in ["Retry", "Catch", "ResultPath", "HeartbeatSeconds", "Next", "End", "Comment"] {
        assert!(doc.get(absent).is_none(), "{} should be omitted", absent);
    }
}

#[test]
fn test_internal_fields_are_not_serialized() {
    let doc = State::pass("hidden").to_document();
    let keys: Vec<&String> = doc.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["Type"]);
}

#[test]
fn test_task_with_every_field() {
    let task = Task::new(Resource::activity("worker").unwrap())
        .result_path("$.out")
        .timeout_seconds(7)
        .heartbeat_seconds(3)
        .retry(vec![Retrier::default()])
        .parameters(json!({ "Input.$": "$.in" }));
    let state = State::new("Full", task)
        .comment("everything")
        .input_path("$.a")
        .output_path("$.b");

    assert_eq!(
        state.to_document(),
        json!({
            "Type": "Task",
            "Comment": "everything",
            "InputPath": "$.a",
            "OutputPath": "$.b",
            "Resource": "arn:aws:states:::activity:worker",
            "ResultPath": "$.out",
            "TimeoutSeconds": 7,
            "HeartbeatSeconds": 3,
            "Parameters": { "Input.$": "$.in" },
            "Retry": [{
                "BackoffRate": 1.5,
                "ErrorEquals": ["States.ALL"],
                "IntervalSeconds": 60,
                "MaxAttempts": 2
            }]
        })
    );
}

#[test]
fn test_batch_task_to_json() {
    let job = BatchJob::new("foo", "fooDef", "fooQueue").parameters("$.batchJob");
    let state = State::new("foo", job);

    assert_eq!(
        to_json(&state, &EmitOptions::compact()).unwrap(),
        concat!(
            r#"{"Parameters":{"JobDefinition":"fooDef","JobName":"foo","JobQueue":"fooQueue","Parameters.$":"$.batchJob"},"#,
            r#""Resource":"arn:aws:states:::batch:submitJob.sync","TimeoutSeconds":600,"Type":"Task"}"#
        )
    );
}

#[test]
fn test_ecs_task_to_json() {
    let state = State::new("foo", EcsTask::new("cluster_arn", "task_definition", LaunchType::Fargate));

    assert_eq!(
        state.to_document(),
        json!({
            "Type": "Task",
            "Resource": "arn:aws:states:::ecs:runTask.sync",
            "TimeoutSeconds": 600,
            "Parameters": {
                "Cluster": "cluster_arn",
                "LaunchType": "FARGATE",
                "TaskDefinition": "task_definition",
                "NetworkConfiguration": {},
                "Overrides": {}
            }
        })
    );
}

#[test]
fn test_choice_case_to_json() {
    let case = ChoiceCase::new(
        "$.foo.field",
        Comparison::boolean_equals(true),
        &State::pass("thisistheend"),
    );

    let doc = case.to_document();
    assert_eq!(doc.as_object().unwrap().len(), 3);
    assert_eq!(
        to_json(&case, &EmitOptions::compact()).unwrap(),
        r#"{"BooleanEquals":true,"Next":"thisistheend","Variable":"$.foo.field"}"#
    );
}

#[test]
fn test_choice_to_json() {
    let t = State::task("endstate", Resource::lambda("foo-trigger").unwrap());
    let choices = vec![ChoiceCase::new("Foovar", Comparison::boolean_equals(true), &t)];
    let c = State::new("Foochoice", Choice::new(choices, &t).unwrap());

    assert_eq!(
        c.to_document(),
        json!({
            "Type": "Choice",
            "Choices": [{ "Variable": "Foovar", "Next": "endstate", "BooleanEquals": true }],
            "Default": "endstate"
        })
    );
}

#[test]
fn test_logical_choice_rules() {
    let adult = Condition::compare(
        "$.age",
        Comparison::new(ComparisonType::NumericGreaterThanEquals, 18).unwrap(),
    );
    let banned = Condition::compare("$.status", Comparison::string_equals("banned"));
    let rule = Condition::and(vec![adult, Condition::not(banned)]).unwrap();
    let case = ChoiceCase::when(rule, "Welcome");

    assert_eq!(
        case.to_document(),
        json!({
            "And": [
                { "Variable": "$.age", "NumericGreaterThanEquals": 18 },
                { "Not": { "Variable": "$.status", "StringEquals": "banned" } }
            ],
            "Next": "Welcome"
        })
    );

    assert!(matches!(Condition::or(vec![]), Err(GraphError::InvalidArgument(_))));
}

#[test]
fn test_comparison_operand_must_match_operator() {
    assert!(Comparison::new(ComparisonType::NumericEquals, "five").is_err());
    assert!(Comparison::new(ComparisonType::BooleanEquals, 1).is_err());
    assert!(Comparison::new(ComparisonType::StringLessThan, true).is_err());
    assert!(Comparison::new(ComparisonType::TimestampLessThan, "2016-03-14T01:59:00Z").is_ok());
    assert!(Comparison::new(ComparisonType::NumericLessThan, 2.5).is_ok());

    for op in ComparisonType::ALL {
        let doc = Comparison::new(op, match op.operand_kind() {
            stepgraph::dsl::choice::OperandKind::Boolean => json!(true),
            stepgraph::dsl::choice::OperandKind::Numeric => json!(1),
            _ => json!("x"),
        })
        .unwrap()
        .to_document();
        assert!(doc.get(op.as_str()).is_some());
    }
}

#[test]
fn test_choice_needs_cases() {
    let err = Choice::new(vec![], "anywhere").unwrap_err();
    assert!(matches!(err, GraphError::InvalidArgument(_)));
}

#[test]
fn test_catcher_to_json() {
    let target = State::task("foo", Resource::activity("fooAct").unwrap());
    let c = Catcher::new(vec![ErrorType::TaskFailed], &target).unwrap();
    assert_eq!(
        c.to_document(),
        json!({ "ErrorEquals": ["States.TaskFailed"], "Next": "foo" })
    );

    let c = c.result_path("$.error");
    assert_eq!(c.to_document()["ResultPath"], json!("$.error"));

    assert!(matches!(Catcher::new(vec![], "foo"), Err(GraphError::InvalidArgument(_))));
}

#[test]
fn test_catch_all_catcher() {
    let c = Catcher::all("Recover");
    assert_eq!(c.error_equals, vec![ErrorType::All]);
    assert_eq!(
        c.to_document(),
        json!({ "ErrorEquals": ["States.ALL"], "Next": "Recover" })
    );

    // Each catcher owns its own error list.
    let mut first = Catcher::all("A");
    let second = Catcher::all("B");
    first.error_equals.push(ErrorType::Timeout);
    assert_eq!(second.error_equals, vec![ErrorType::All]);
}

#[test]
fn test_setting_catcher_on_task_works() {
    let t2 = State::task("foob", Resource::lambda("sfs").unwrap());
    let t = State::new(
        "catachable",
        Task::new(Resource::lambda("foo-trigger").unwrap())
            .catch(vec![Catcher::new(vec![ErrorType::TaskFailed], &t2).unwrap()]),
    );

    assert_eq!(
        t.to_document()["Catch"],
        json!([{ "ErrorEquals": ["States.TaskFailed"], "Next": "foob" }])
    );
}

#[test]
fn test_retrier_defaults_are_independent() {
    let mut a = Retrier::default();
    let b = Retrier::default();
    a.error_equals.push(ErrorType::Timeout);

    assert_eq!(b.error_equals, vec![ErrorType::All]);
    assert_eq!(b.max_attempts, 2);
    assert_eq!(b.backoff_rate, 1.5);
    assert_eq!(b.interval_seconds, 60);
}

#[test]
fn test_retrier_validation() {
    assert!(matches!(Retrier::new(vec![]), Err(GraphError::InvalidArgument(_))));
    assert!(Retrier::default().backoff_rate(0.5).is_err());
    assert!(Retrier::default().backoff_rate(f64::NAN).is_err());

    let r = Retrier::new(vec![ErrorType::Custom("MyError".into())])
        .unwrap()
        .max_attempts(0)
        .interval_seconds(5)
        .backoff_rate(2.0)
        .unwrap();
    assert_eq!(
        r.to_document(),
        json!({ "BackoffRate": 2.0, "ErrorEquals": ["MyError"], "IntervalSeconds": 5, "MaxAttempts": 0 })
    );
}

#[test]
fn test_error_type_names() {
    assert_eq!(ErrorType::All.to_string(), "States.ALL");
    assert_eq!(ErrorType::from("States.NoChoiceMatched"), ErrorType::NoChoiceMatched);
    assert_eq!(ErrorType::from("Lambda.Unknown"), ErrorType::Custom("Lambda.Unknown".into()));
}

#[test]
fn test_setting_timeout_works() {
    let t = Task::new(Resource::lambda("fooRes").unwrap()).timeout_seconds(7);
    assert_eq!(t.timeout_seconds, 7);
}

#[test]
fn test_pass_and_wait_shapes() {
    let pass = State::new("p", Pass::default().result(json!({ "x": 1 })).result_path("$.r"));
    assert_eq!(
        pass.to_document(),
        json!({ "Type": "Pass", "Result": { "x": 1 }, "ResultPath": "$.r" })
    );

    assert_eq!(State::new("w", Wait::default()).to_document(), json!({ "Type": "Wait", "Seconds": 600 }));
    assert_eq!(
        State::new("w", Wait::timestamp("2016-03-14T01:59:00Z")).to_document(),
        json!({ "Type": "Wait", "Timestamp": "2016-03-14T01:59:00Z" })
    );
    assert_eq!(
        State::new("w", Wait::seconds_path("$.delay")).to_document(),
        json!({ "Type": "Wait", "SecondsPath": "$.delay" })
    );
    assert_eq!(Wait::timestamp_path("$.when").wait_seconds(), None);
}

#[test]
fn test_succeed_and_fail_shapes() {
    assert_eq!(State::succeed("ok").to_document(), json!({ "Type": "Succeed" }));
    assert_eq!(
        State::new("bad", Fail::default().error("E").cause("because")).to_document(),
        json!({ "Type": "Fail", "Error": "E", "Cause": "because" })
    );
}
