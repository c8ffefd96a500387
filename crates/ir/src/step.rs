//! The polymorphic step model
//!
//! Each workflow instruction is one `Step` variant. Control structures
//! (`Switch`, `TryExcept`, `StepsBlock`, `For`, `Parallel`) own nested
//! step lists; everything else is a leaf. Jump and call targets are plain
//! strings — they are resolved by name during validation and are *not*
//! structural edges, so the step tree stays acyclic by construction.

use crate::retry::RetryPolicy;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// A step together with its declared name.
///
/// Names are unique-checked per workflow by the validator, not guaranteed
/// unique by construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamedStep {
    pub name: String,
    pub step: Step,
}

impl NamedStep {
    pub fn new(name: impl Into<String>, step: impl Into<Step>) -> Self {
        Self {
            name: name.into(),
            step: step.into(),
        }
    }
}

/// One workflow instruction or control structure.
///
/// The set is closed: every consumer (traversal, validation, rendering)
/// dispatches by exhaustive `match`, so adding a variant is a compile-time
/// ripple through all of them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Step {
    /// Ordered variable assignments
    Assign(AssignStep),
    /// Invoke a connector function, a step, or a subworkflow
    Call(CallStep),
    /// Conditional branching with jump targets or inline blocks
    Switch(SwitchStep),
    /// Protected block with handler and optional retry policy
    TryExcept(TryExceptStep),
    /// Raise a value as an error
    Raise(RaiseStep),
    /// Return a value to the caller
    Return(ReturnStep),
    /// Grouping block with no semantics of its own
    StepsBlock(BlockStep),
    /// Iterate a value or a numeric range
    For(ForStep),
    /// Run branches or loop iterations concurrently
    Parallel(ParallelStep),
    /// Terminal marker; jumps use the target alias `"end"` instead
    End,
}

impl Step {
    /// The step's direct nested children, in declared order.
    ///
    /// Leaf variants yield nothing. `Switch` yields the inline blocks of
    /// all conditions, `TryExcept` the protected list then the handler
    /// list, `Parallel` all branch bodies (or the loop body). Branch and
    /// condition labels are not steps and do not appear here.
    pub fn nested(&self) -> Vec<&NamedStep> {
        match self {
            Step::Assign(_) | Step::Call(_) | Step::Raise(_) | Step::Return(_) | Step::End => {
                Vec::new()
            }
            Step::Switch(s) => {
                let mut out = Vec::new();
                for condition in &s.conditions {
                    if let ConditionTarget::Steps(steps) = &condition.target {
                        out.extend(steps.iter());
                    }
                }
                out
            }
            Step::TryExcept(t) => t.try_steps.iter().chain(t.except_steps.iter()).collect(),
            Step::StepsBlock(b) => b.steps.iter().collect(),
            Step::For(f) => f.body.iter().collect(),
            Step::Parallel(p) => match &p.body {
                ParallelBody::Branches(branches) => {
                    branches.iter().flat_map(|b| b.steps.iter()).collect()
                }
                ParallelBody::ForLoop(f) => f.body.iter().collect(),
            },
        }
    }

    /// Lowercase label for log and issue messages
    pub fn kind(&self) -> &'static str {
        match self {
            Step::Assign(_) => "assign",
            Step::Call(_) => "call",
            Step::Switch(_) => "switch",
            Step::TryExcept(_) => "try",
            Step::Raise(_) => "raise",
            Step::Return(_) => "return",
            Step::StepsBlock(_) => "steps",
            Step::For(_) => "for",
            Step::Parallel(_) => "parallel",
            Step::End => "end",
        }
    }
}

/// Ordered `(target path, value)` assignments
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssignStep {
    pub assignments: Vec<(String, Value)>,
}

impl AssignStep {
    pub fn new(assignments: Vec<(impl Into<String>, Value)>) -> Self {
        Self {
            assignments: assignments.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl From<AssignStep> for Step {
    fn from(s: AssignStep) -> Self {
        Step::Assign(s)
    }
}

/// Invocation of a connector function (dotted name), a step, or a
/// subworkflow
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallStep {
    /// Dotted connector reference, step name, or subworkflow name
    pub target: String,
    /// Named arguments, in declared order
    pub args: Vec<(String, Value)>,
    /// Variable receiving the call result
    pub result: Option<String>,
}

impl CallStep {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            args: Vec::new(),
            result: None,
        }
    }

    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.push((name.into(), value.into()));
        self
    }

    pub fn with_result(mut self, variable: impl Into<String>) -> Self {
        self.result = Some(variable.into());
        self
    }
}

impl From<CallStep> for Step {
    fn from(s: CallStep) -> Self {
        Step::Call(s)
    }
}

/// Where a switch condition transfers control: a named jump target or an
/// inline block. Exactly one, by construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ConditionTarget {
    Jump(String),
    Steps(Vec<NamedStep>),
}

/// One arm of a `Switch`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwitchCondition {
    pub condition: Value,
    pub target: ConditionTarget,
}

impl SwitchCondition {
    /// Arm that jumps to a named step (or `"end"`)
    pub fn jump(condition: impl Into<Value>, target: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            target: ConditionTarget::Jump(target.into()),
        }
    }

    /// Arm that runs an inline block
    pub fn steps(condition: impl Into<Value>, steps: Vec<NamedStep>) -> Self {
        Self {
            condition: condition.into(),
            target: ConditionTarget::Steps(steps),
        }
    }
}

/// Conditional branching
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwitchStep {
    pub conditions: Vec<SwitchCondition>,
    /// Fallback jump target when no condition matches
    pub next: Option<String>,
}

impl SwitchStep {
    pub fn new(conditions: Vec<SwitchCondition>) -> Self {
        Self {
            conditions,
            next: None,
        }
    }

    pub fn with_next(mut self, target: impl Into<String>) -> Self {
        self.next = Some(target.into());
        self
    }
}

impl From<SwitchStep> for Step {
    fn from(s: SwitchStep) -> Self {
        Step::Switch(s)
    }
}

/// Protected block with an error handler
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TryExceptStep {
    pub try_steps: Vec<NamedStep>,
    pub except_steps: Vec<NamedStep>,
    /// Variable bound to the raised error inside the handler
    pub error_binding: Option<String>,
    pub retry: Option<RetryPolicy>,
}

impl TryExceptStep {
    pub fn new(try_steps: Vec<NamedStep>) -> Self {
        Self {
            try_steps,
            except_steps: Vec::new(),
            error_binding: None,
            retry: None,
        }
    }

    pub fn with_except(mut self, steps: Vec<NamedStep>) -> Self {
        self.except_steps = steps;
        self
    }

    pub fn with_error_binding(mut self, variable: impl Into<String>) -> Self {
        self.error_binding = Some(variable.into());
        self
    }

    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }
}

impl From<TryExceptStep> for Step {
    fn from(s: TryExceptStep) -> Self {
        Step::TryExcept(s)
    }
}

/// Raise a value as an error
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RaiseStep {
    pub value: Value,
}

impl RaiseStep {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl From<RaiseStep> for Step {
    fn from(s: RaiseStep) -> Self {
        Step::Raise(s)
    }
}

/// Return a value to the caller
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReturnStep {
    pub value: Value,
}

impl ReturnStep {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl From<ReturnStep> for Step {
    fn from(s: ReturnStep) -> Self {
        Step::Return(s)
    }
}

/// Grouping block
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockStep {
    pub steps: Vec<NamedStep>,
}

impl BlockStep {
    pub fn new(steps: Vec<NamedStep>) -> Self {
        Self { steps }
    }
}

impl From<BlockStep> for Step {
    fn from(s: BlockStep) -> Self {
        Step::StepsBlock(s)
    }
}

/// What a `For` loop iterates: a value (list literal or expression) or a
/// numeric range. Exactly one, by construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ForSource {
    Items(Value),
    Range { start: Value, end: Value },
}

/// Loop over items or a range
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForStep {
    /// Loop variable bound to the current item
    pub var: String,
    /// Variable bound to the current index
    pub index: Option<String>,
    pub source: ForSource,
    pub body: Vec<NamedStep>,
}

impl ForStep {
    /// Loop over the items of a list literal or expression
    pub fn over(var: impl Into<String>, items: impl Into<Value>, body: Vec<NamedStep>) -> Self {
        Self {
            var: var.into(),
            index: None,
            source: ForSource::Items(items.into()),
            body,
        }
    }

    /// Loop over a numeric range, inclusive of both ends
    pub fn range(
        var: impl Into<String>,
        start: impl Into<Value>,
        end: impl Into<Value>,
        body: Vec<NamedStep>,
    ) -> Self {
        Self {
            var: var.into(),
            index: None,
            source: ForSource::Range {
                start: start.into(),
                end: end.into(),
            },
            body,
        }
    }

    pub fn with_index(mut self, variable: impl Into<String>) -> Self {
        self.index = Some(variable.into());
        self
    }
}

impl From<ForStep> for Step {
    fn from(s: ForStep) -> Self {
        Step::For(s)
    }
}

/// One concurrent branch: a label and its body.
///
/// The label names the branch, not a step — it is never a jump target and
/// never enters the workflow's step-name set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParallelBranch {
    pub name: String,
    pub steps: Vec<NamedStep>,
}

impl ParallelBranch {
    pub fn new(name: impl Into<String>, steps: Vec<NamedStep>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }
}

/// What runs concurrently: named branches or a loop. Exactly one, by
/// construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ParallelBody {
    Branches(Vec<ParallelBranch>),
    ForLoop(Box<ForStep>),
}

/// Concurrent execution of branches or loop iterations
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParallelStep {
    pub body: ParallelBody,
    /// Variables writable from every branch
    pub shared: Vec<String>,
    pub concurrency_limit: Option<u32>,
}

impl ParallelStep {
    pub fn branches(branches: Vec<ParallelBranch>) -> Self {
        Self {
            body: ParallelBody::Branches(branches),
            shared: Vec::new(),
            concurrency_limit: None,
        }
    }

    pub fn for_loop(for_step: ForStep) -> Self {
        Self {
            body: ParallelBody::ForLoop(Box::new(for_step)),
            shared: Vec::new(),
            concurrency_limit: None,
        }
    }

    pub fn with_shared(mut self, variables: Vec<impl Into<String>>) -> Self {
        self.shared = variables.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_concurrency_limit(mut self, limit: u32) -> Self {
        self.concurrency_limit = Some(limit);
        self
    }
}

impl From<ParallelStep> for Step {
    fn from(s: ParallelStep) -> Self {
        Step::Parallel(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_steps_have_no_children() {
        let leaves: Vec<Step> = vec![
            AssignStep::new(vec![("x", Value::from(1))]).into(),
            CallStep::new("sys.log").into(),
            RaiseStep::new("boom").into(),
            ReturnStep::new(Value::expr("x")).into(),
            Step::End,
        ];
        for step in &leaves {
            assert!(step.nested().is_empty(), "{} should be a leaf", step.kind());
        }
    }

    #[test]
    fn test_switch_nests_only_inline_blocks() {
        let switch = SwitchStep::new(vec![
            SwitchCondition::jump(Value::expr("x > 1"), "elsewhere"),
            SwitchCondition::steps(
                Value::expr("x <= 1"),
                vec![NamedStep::new("inner", ReturnStep::new(0))],
            ),
        ]);
        let step = Step::from(switch);
        let nested = step.nested();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].name, "inner");
    }

    #[test]
    fn test_try_except_orders_protected_before_handler() {
        let step = Step::from(
            TryExceptStep::new(vec![NamedStep::new("guarded", CallStep::new("http.get"))])
                .with_except(vec![NamedStep::new("recover", ReturnStep::new(Value::Null))])
                .with_error_binding("e"),
        );
        let names: Vec<&str> = step.nested().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["guarded", "recover"]);
    }

    #[test]
    fn test_parallel_branch_labels_are_not_steps() {
        let step = Step::from(ParallelStep::branches(vec![
            ParallelBranch::new("left", vec![NamedStep::new("a", CallStep::new("sys.log"))]),
            ParallelBranch::new("right", vec![NamedStep::new("b", CallStep::new("sys.log"))]),
        ]));
        let names: Vec<&str> = step.nested().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_parallel_for_nests_loop_body() {
        let step = Step::from(ParallelStep::for_loop(ForStep::over(
            "item",
            Value::expr("items"),
            vec![NamedStep::new("work", CallStep::new("process"))],
        )));
        assert_eq!(step.nested().len(), 1);
    }

    #[test]
    fn test_call_builder_keeps_argument_order() {
        let call = CallStep::new("sys.log")
            .with_arg("text", "hello")
            .with_arg("severity", "INFO")
            .with_result("logged");
        assert_eq!(call.args[0].0, "text");
        assert_eq!(call.args[1].0, "severity");
        assert_eq!(call.result.as_deref(), Some("logged"));
    }

    #[test]
    fn test_steps_serialize_round_trip() {
        let step = Step::from(
            SwitchStep::new(vec![SwitchCondition::jump(Value::expr("ok"), "end")])
                .with_next("fallback"),
        );
        let json = serde_json::to_string(&step).unwrap();
        let back: Step = serde_json::from_str(&json).unwrap();
        assert_eq!(step, back);
    }
}
