//! Workflow and application containers
//!
//! A `Workflow` is an ordered list of named steps with declared
//! parameters; a `WorkflowApp` is the entry workflow plus its
//! subworkflows. Containers are built once and treated as immutable by
//! validation and rendering. Naming invariants (reserved `"main"`,
//! uniqueness) are checked by `cadence-validate`, not enforced here.

use crate::step::NamedStep;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Reserved name of the entry workflow
pub const MAIN_WORKFLOW: &str = "main";

/// Jump-target alias that is always valid, with or without an `End` step
pub const END_TARGET: &str = "end";

/// A declared workflow parameter. No default means required; a default
/// makes it optional.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkflowParameter {
    pub name: String,
    pub default: Option<Value>,
}

impl WorkflowParameter {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            default: Some(default.into()),
        }
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// An ordered, named collection of steps — the entry workflow or a
/// subworkflow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub name: String,
    pub params: Vec<WorkflowParameter>,
    pub steps: Vec<NamedStep>,
}

impl Workflow {
    /// The entry workflow. Its name is fixed to `"main"`.
    pub fn main() -> Self {
        Self {
            name: MAIN_WORKFLOW.to_string(),
            params: Vec::new(),
            steps: Vec::new(),
        }
    }

    /// A subworkflow with a caller-supplied name.
    pub fn subworkflow(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            steps: Vec::new(),
        }
    }

    /// Declare the single invocation payload parameter of the entry
    /// workflow. Replaces any previously declared parameters — main takes
    /// at most one.
    pub fn with_payload(mut self, param: WorkflowParameter) -> Self {
        self.params = vec![param];
        self
    }

    /// Append a declared parameter.
    pub fn with_param(mut self, param: WorkflowParameter) -> Self {
        self.params.push(param);
        self
    }

    /// Append a top-level step.
    pub fn with_step(mut self, step: NamedStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Append several top-level steps.
    pub fn with_steps(mut self, steps: Vec<NamedStep>) -> Self {
        self.steps.extend(steps);
        self
    }

    pub fn is_main(&self) -> bool {
        self.name == MAIN_WORKFLOW
    }

    /// Names of parameters without defaults, in declared order
    pub fn required_params(&self) -> Vec<&str> {
        self.params
            .iter()
            .filter(|p| p.is_required())
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Names of parameters with defaults, in declared order
    pub fn optional_params(&self) -> Vec<&str> {
        self.params
            .iter()
            .filter(|p| !p.is_required())
            .map(|p| p.name.as_str())
            .collect()
    }
}

/// One entry workflow plus any number of named subworkflows
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkflowApp {
    pub main: Workflow,
    pub subworkflows: Vec<Workflow>,
}

impl WorkflowApp {
    pub fn new(main: Workflow) -> Self {
        Self {
            main,
            subworkflows: Vec::new(),
        }
    }

    pub fn with_subworkflow(mut self, workflow: Workflow) -> Self {
        self.subworkflows.push(workflow);
        self
    }

    /// Look up a subworkflow by name. With duplicate declarations the
    /// first one wins.
    pub fn subworkflow(&self, name: &str) -> Option<&Workflow> {
        self.subworkflows.iter().find(|w| w.name == name)
    }

    /// All workflows, main first, subworkflows in declared order
    pub fn workflows(&self) -> impl Iterator<Item = &Workflow> {
        std::iter::once(&self.main).chain(self.subworkflows.iter())
    }
}
