//! Engine-syntax renderer for Cadence workflow applications
//!
//! Serializes a `WorkflowApp` into the YAML document the workflow engine
//! consumes: one top-level entry per workflow, each carrying its `params`
//! and `steps`. The renderer performs no validation — it consumes the
//! same immutable tree as `cadence-validate`, independently, and is
//! expected to run after a successful `validate()` by convention.
//!
//! Expressions render wrapped in `${...}`; everything else renders as
//! native YAML scalars, sequences, and insertion-ordered mappings.

#![deny(unsafe_code)]

use cadence_ir::{
    ConditionTarget, ForSource, ForStep, NamedStep, ParallelBody, RetryPolicy, Step, Value,
    Workflow, WorkflowApp, WorkflowParameter, END_TARGET,
};
use serde_yaml::{Mapping, Number, Value as Yaml};
use tracing::debug;

/// Rendering failure
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to serialize workflow document: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Render an application to the engine's YAML text form.
pub fn render(app: &WorkflowApp) -> RenderResult<String> {
    let text = serde_yaml::to_string(&to_value(app))?;
    debug!(
        workflows = app.subworkflows.len() + 1,
        bytes = text.len(),
        "workflow application rendered"
    );
    Ok(text)
}

/// Build the structured document behind [`render`]: a mapping with the
/// main workflow first, then subworkflows in declared order.
pub fn to_value(app: &WorkflowApp) -> Yaml {
    let mut doc = Mapping::new();
    for workflow in app.workflows() {
        doc.insert(yaml_str(&workflow.name), workflow_to_yaml(workflow));
    }
    Yaml::Mapping(doc)
}

fn workflow_to_yaml(workflow: &Workflow) -> Yaml {
    let mut body = Mapping::new();
    if !workflow.params.is_empty() {
        let params: Vec<Yaml> = workflow.params.iter().map(param_to_yaml).collect();
        body.insert(yaml_str("params"), Yaml::Sequence(params));
    }
    body.insert(yaml_str("steps"), steps_to_yaml(&workflow.steps));
    Yaml::Mapping(body)
}

fn param_to_yaml(param: &WorkflowParameter) -> Yaml {
    match &param.default {
        // Required parameters render as a bare name, optional ones as a
        // single-entry mapping carrying the default.
        None => yaml_str(&param.name),
        Some(default) => {
            let mut entry = Mapping::new();
            entry.insert(yaml_str(&param.name), value_to_yaml(default));
            Yaml::Mapping(entry)
        }
    }
}

fn steps_to_yaml(steps: &[NamedStep]) -> Yaml {
    let rendered: Vec<Yaml> = steps
        .iter()
        .map(|named| {
            let mut entry = Mapping::new();
            entry.insert(yaml_str(&named.name), Yaml::Mapping(step_to_yaml(&named.step)));
            Yaml::Mapping(entry)
        })
        .collect();
    Yaml::Sequence(rendered)
}

fn step_to_yaml(step: &Step) -> Mapping {
    let mut body = Mapping::new();
    match step {
        Step::Assign(assign) => {
            let entries: Vec<Yaml> = assign
                .assignments
                .iter()
                .map(|(path, value)| {
                    let mut entry = Mapping::new();
                    entry.insert(yaml_str(path), value_to_yaml(value));
                    Yaml::Mapping(entry)
                })
                .collect();
            body.insert(yaml_str("assign"), Yaml::Sequence(entries));
        }
        Step::Call(call) => {
            body.insert(yaml_str("call"), yaml_str(&call.target));
            if !call.args.is_empty() {
                let mut args = Mapping::new();
                for (name, value) in &call.args {
                    args.insert(yaml_str(name), value_to_yaml(value));
                }
                body.insert(yaml_str("args"), Yaml::Mapping(args));
            }
            if let Some(result) = &call.result {
                body.insert(yaml_str("result"), yaml_str(result));
            }
        }
        Step::Switch(switch) => {
            let conditions: Vec<Yaml> = switch
                .conditions
                .iter()
                .map(|condition| {
                    let mut arm = Mapping::new();
                    arm.insert(yaml_str("condition"), value_to_yaml(&condition.condition));
                    match &condition.target {
                        ConditionTarget::Jump(target) => {
                            arm.insert(yaml_str("next"), yaml_str(target));
                        }
                        ConditionTarget::Steps(steps) => {
                            arm.insert(yaml_str("steps"), steps_to_yaml(steps));
                        }
                    }
                    Yaml::Mapping(arm)
                })
                .collect();
            body.insert(yaml_str("switch"), Yaml::Sequence(conditions));
            if let Some(next) = &switch.next {
                body.insert(yaml_str("next"), yaml_str(next));
            }
        }
        Step::TryExcept(guarded) => {
            let mut protected = Mapping::new();
            protected.insert(yaml_str("steps"), steps_to_yaml(&guarded.try_steps));
            body.insert(yaml_str("try"), Yaml::Mapping(protected));

            if let Some(retry) = &guarded.retry {
                body.insert(yaml_str("retry"), retry_to_yaml(retry));
            }

            if !guarded.except_steps.is_empty() || guarded.error_binding.is_some() {
                let mut handler = Mapping::new();
                if let Some(binding) = &guarded.error_binding {
                    handler.insert(yaml_str("as"), yaml_str(binding));
                }
                handler.insert(yaml_str("steps"), steps_to_yaml(&guarded.except_steps));
                body.insert(yaml_str("except"), Yaml::Mapping(handler));
            }
        }
        Step::Raise(raise) => {
            body.insert(yaml_str("raise"), value_to_yaml(&raise.value));
        }
        Step::Return(ret) => {
            body.insert(yaml_str("return"), value_to_yaml(&ret.value));
        }
        Step::StepsBlock(block) => {
            body.insert(yaml_str("steps"), steps_to_yaml(&block.steps));
        }
        Step::For(for_step) => {
            body.insert(yaml_str("for"), Yaml::Mapping(for_to_yaml(for_step)));
        }
        Step::Parallel(parallel) => {
            let mut inner = Mapping::new();
            if !parallel.shared.is_empty() {
                let shared: Vec<Yaml> = parallel.shared.iter().map(|s| yaml_str(s)).collect();
                inner.insert(yaml_str("shared"), Yaml::Sequence(shared));
            }
            if let Some(limit) = parallel.concurrency_limit {
                inner.insert(
                    yaml_str("concurrency_limit"),
                    Yaml::Number(Number::from(limit)),
                );
            }
            match &parallel.body {
                ParallelBody::Branches(branches) => {
                    let rendered: Vec<Yaml> = branches
                        .iter()
                        .map(|branch| {
                            let mut steps = Mapping::new();
                            steps.insert(yaml_str("steps"), steps_to_yaml(&branch.steps));
                            let mut entry = Mapping::new();
                            entry.insert(yaml_str(&branch.name), Yaml::Mapping(steps));
                            Yaml::Mapping(entry)
                        })
                        .collect();
                    inner.insert(yaml_str("branches"), Yaml::Sequence(rendered));
                }
                ParallelBody::ForLoop(for_step) => {
                    inner.insert(yaml_str("for"), Yaml::Mapping(for_to_yaml(for_step)));
                }
            }
            body.insert(yaml_str("parallel"), Yaml::Mapping(inner));
        }
        Step::End => {
            body.insert(yaml_str("next"), yaml_str(END_TARGET));
        }
    }
    body
}

fn for_to_yaml(for_step: &ForStep) -> Mapping {
    let mut body = Mapping::new();
    body.insert(yaml_str("value"), yaml_str(&for_step.var));
    if let Some(index) = &for_step.index {
        body.insert(yaml_str("index"), yaml_str(index));
    }
    match &for_step.source {
        ForSource::Items(items) => {
            body.insert(yaml_str("in"), value_to_yaml(items));
        }
        ForSource::Range { start, end } => {
            body.insert(
                yaml_str("range"),
                Yaml::Sequence(vec![value_to_yaml(start), value_to_yaml(end)]),
            );
        }
    }
    body.insert(yaml_str("steps"), steps_to_yaml(&for_step.body));
    body
}

fn retry_to_yaml(policy: &RetryPolicy) -> Yaml {
    match policy {
        RetryPolicy::Default(name) => yaml_str(&format!("${{{name}}}")),
        RetryPolicy::Custom {
            predicate,
            max_retries,
            backoff,
        } => {
            let mut body = Mapping::new();
            body.insert(yaml_str("predicate"), yaml_str(&format!("${{{predicate}}}")));
            body.insert(
                yaml_str("max_retries"),
                Yaml::Number(Number::from(*max_retries)),
            );
            let mut delays = Mapping::new();
            delays.insert(
                yaml_str("initial_delay"),
                Yaml::Number(Number::from(backoff.initial_delay)),
            );
            delays.insert(
                yaml_str("max_delay"),
                Yaml::Number(Number::from(backoff.max_delay)),
            );
            delays.insert(
                yaml_str("multiplier"),
                Yaml::Number(Number::from(backoff.multiplier)),
            );
            body.insert(yaml_str("backoff"), Yaml::Mapping(delays));
            Yaml::Mapping(body)
        }
    }
}

fn value_to_yaml(value: &Value) -> Yaml {
    match value {
        Value::Null => Yaml::Null,
        Value::Bool(b) => Yaml::Bool(*b),
        Value::Int(i) => Yaml::Number(Number::from(*i)),
        Value::Float(f) => Yaml::Number(Number::from(*f)),
        Value::Str(s) => yaml_str(s),
        Value::List(items) => Yaml::Sequence(items.iter().map(value_to_yaml).collect()),
        Value::Map(pairs) => {
            let mut body = Mapping::new();
            for (key, item) in pairs {
                body.insert(yaml_str(key), value_to_yaml(item));
            }
            Yaml::Mapping(body)
        }
        Value::Expr(expression) => yaml_str(&format!("${{{expression}}}")),
    }
}

fn yaml_str(s: &str) -> Yaml {
    Yaml::String(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_ir::{
        AssignStep, Backoff, BlockStep, CallStep, ParallelBranch, ParallelStep, RaiseStep,
        ReturnStep, SwitchCondition, SwitchStep, TryExceptStep, WorkflowParameter,
    };

    fn key(name: &str) -> Yaml {
        Yaml::String(name.to_string())
    }

    fn body_of<'a>(doc: &'a Yaml, workflow: &str, step_index: usize, step: &str) -> &'a Yaml {
        let steps = doc
            .get(workflow)
            .and_then(|w| w.get("steps"))
            .and_then(Yaml::as_sequence)
            .unwrap();
        steps[step_index].get(step).unwrap()
    }

    #[test]
    fn test_main_renders_before_subworkflows() {
        let app = WorkflowApp::new(
            Workflow::main().with_step(NamedStep::new("done", ReturnStep::new(1))),
        )
        .with_subworkflow(
            Workflow::subworkflow("helper")
                .with_step(NamedStep::new("give", ReturnStep::new(2))),
        );
        let text = render(&app).unwrap();
        let main_at = text.find("main:").unwrap();
        let helper_at = text.find("helper:").unwrap();
        assert!(main_at < helper_at);
    }

    #[test]
    fn test_params_render_required_bare_and_optional_with_default() {
        let app = WorkflowApp::new(Workflow::main()).with_subworkflow(
            Workflow::subworkflow("helper")
                .with_param(WorkflowParameter::required("a"))
                .with_param(WorkflowParameter::optional("c", 10))
                .with_step(NamedStep::new("give", ReturnStep::new(Value::expr("a")))),
        );
        let doc = to_value(&app);
        let params = doc
            .get("helper")
            .and_then(|w| w.get("params"))
            .and_then(Yaml::as_sequence)
            .unwrap();
        assert_eq!(params[0], key("a"));
        assert_eq!(params[1].get("c").unwrap(), &Yaml::Number(10.into()));
    }

    #[test]
    fn test_assign_renders_ordered_single_entry_mappings() {
        let app = WorkflowApp::new(Workflow::main().with_step(NamedStep::new(
            "init",
            AssignStep::new(vec![
                ("total", Value::from(0)),
                ("greeting", Value::from("hello")),
            ]),
        )));
        let doc = to_value(&app);
        let assign = body_of(&doc, "main", 0, "init")
            .get("assign")
            .and_then(Yaml::as_sequence)
            .unwrap();
        assert_eq!(assign.len(), 2);
        assert_eq!(assign[0].get("total").unwrap(), &Yaml::Number(0.into()));
        assert_eq!(assign[1].get("greeting").unwrap(), &key("hello"));
    }

    #[test]
    fn test_call_renders_target_args_result() {
        let app = WorkflowApp::new(Workflow::main().with_step(NamedStep::new(
            "log",
            CallStep::new("sys.log")
                .with_arg("text", Value::expr("message"))
                .with_result("logged"),
        )));
        let body = to_value(&app);
        let call = body_of(&body, "main", 0, "log");
        assert_eq!(call.get("call").unwrap(), &key("sys.log"));
        assert_eq!(
            call.get("args").unwrap().get("text").unwrap(),
            &key("${message}")
        );
        assert_eq!(call.get("result").unwrap(), &key("logged"));
    }

    #[test]
    fn test_switch_renders_jump_and_inline_arms() {
        let app = WorkflowApp::new(Workflow::main().with_step(NamedStep::new(
            "route",
            SwitchStep::new(vec![
                SwitchCondition::jump(Value::expr("x > 0"), "end"),
                SwitchCondition::steps(
                    Value::expr("x == 0"),
                    vec![NamedStep::new("bail", ReturnStep::new(Value::Null))],
                ),
            ])
            .with_next("end"),
        )));
        let doc = to_value(&app);
        let switch_body = body_of(&doc, "main", 0, "route");
        let arms = switch_body
            .get("switch")
            .and_then(Yaml::as_sequence)
            .unwrap();
        assert_eq!(arms[0].get("condition").unwrap(), &key("${x > 0}"));
        assert_eq!(arms[0].get("next").unwrap(), &key("end"));
        assert!(arms[1].get("steps").is_some());
        assert_eq!(switch_body.get("next").unwrap(), &key("end"));
    }

    #[test]
    fn test_try_except_renders_retry_and_handler() {
        let app = WorkflowApp::new(Workflow::main().with_step(NamedStep::new(
            "guarded",
            TryExceptStep::new(vec![NamedStep::new("fetch", CallStep::new("http.get"))])
                .with_retry(RetryPolicy::custom(
                    "http.default_retry_predicate",
                    3,
                    Backoff::new(0.5, 8.0, 2.0),
                ))
                .with_error_binding("e")
                .with_except(vec![NamedStep::new("recover", ReturnStep::new(Value::Null))]),
        )));
        let doc = to_value(&app);
        let guarded = body_of(&doc, "main", 0, "guarded");
        assert!(guarded.get("try").unwrap().get("steps").is_some());
        let retry = guarded.get("retry").unwrap();
        assert_eq!(
            retry.get("predicate").unwrap(),
            &key("${http.default_retry_predicate}")
        );
        assert_eq!(
            retry.get("backoff").unwrap().get("multiplier").unwrap(),
            &Yaml::Number(Number::from(2.0))
        );
        let except = guarded.get("except").unwrap();
        assert_eq!(except.get("as").unwrap(), &key("e"));
    }

    #[test]
    fn test_predefined_retry_renders_as_expression() {
        let app = WorkflowApp::new(Workflow::main().with_step(NamedStep::new(
            "guarded",
            TryExceptStep::new(vec![NamedStep::new("fetch", CallStep::new("http.get"))])
                .with_retry(RetryPolicy::default_policy("http.default_retry")),
        )));
        let doc = to_value(&app);
        let guarded = body_of(&doc, "main", 0, "guarded");
        assert_eq!(
            guarded.get("retry").unwrap(),
            &key("${http.default_retry}")
        );
        assert!(guarded.get("except").is_none());
    }

    #[test]
    fn test_for_range_and_parallel_branches() {
        let app = WorkflowApp::new(
            Workflow::main()
                .with_step(NamedStep::new(
                    "count",
                    ForStep::range(
                        "n",
                        1,
                        10,
                        vec![NamedStep::new(
                            "note",
                            CallStep::new("sys.log").with_arg("text", Value::expr("n")),
                        )],
                    )
                    .with_index("i"),
                ))
                .with_step(NamedStep::new(
                    "fan_out",
                    ParallelStep::branches(vec![ParallelBranch::new(
                        "lane",
                        vec![NamedStep::new("work", CallStep::new("sys.log"))],
                    )])
                    .with_shared(vec!["total"])
                    .with_concurrency_limit(4),
                )),
        );
        let doc = to_value(&app);

        let for_body = body_of(&doc, "main", 0, "count").get("for").unwrap();
        assert_eq!(for_body.get("value").unwrap(), &key("n"));
        assert_eq!(for_body.get("index").unwrap(), &key("i"));
        let range = for_body.get("range").and_then(Yaml::as_sequence).unwrap();
        assert_eq!(range.len(), 2);

        let parallel = body_of(&doc, "main", 1, "fan_out").get("parallel").unwrap();
        assert_eq!(
            parallel.get("concurrency_limit").unwrap(),
            &Yaml::Number(4.into())
        );
        let branches = parallel.get("branches").and_then(Yaml::as_sequence).unwrap();
        assert!(branches[0].get("lane").unwrap().get("steps").is_some());
    }

    #[test]
    fn test_grouping_raise_and_end() {
        let app = WorkflowApp::new(
            Workflow::main()
                .with_step(NamedStep::new(
                    "bundle",
                    BlockStep::new(vec![NamedStep::new(
                        "complain",
                        RaiseStep::new(Value::map(vec![("code", Value::from(500))])),
                    )]),
                ))
                .with_step(NamedStep::new("finish", Step::End)),
        );
        let doc = to_value(&app);
        let block = body_of(&doc, "main", 0, "bundle");
        let inner = block.get("steps").and_then(Yaml::as_sequence).unwrap();
        let raise = inner[0].get("complain").unwrap().get("raise").unwrap();
        assert_eq!(raise.get("code").unwrap(), &Yaml::Number(500.into()));
        assert_eq!(
            body_of(&doc, "main", 1, "finish").get("next").unwrap(),
            &key("end")
        );
    }

    #[test]
    fn test_rendered_text_round_trips_as_yaml() {
        let app = WorkflowApp::new(Workflow::main().with_step(NamedStep::new(
            "greet",
            CallStep::new("sys.log").with_arg("text", "hello"),
        )));
        let text = render(&app).unwrap();
        let parsed: Yaml = serde_yaml::from_str(&text).unwrap();
        assert_eq!(parsed, to_value(&app));
    }
}
