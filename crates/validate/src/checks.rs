//! The five checks of the validation pipeline
//!
//! Each check is independent: it consumes the whole application, builds
//! whatever name index it needs from the traversal engine, and returns
//! every issue it can find. Checks never short-circuit each other and
//! never mutate the tree.

use crate::issue::{CheckId, Issue};
use crate::traverse::walk;
use cadence_ir::{ConditionTarget, Step, WorkflowApp, END_TARGET, MAIN_WORKFLOW};
use std::collections::{HashMap, HashSet};

/// One named validation check
pub(crate) trait Check {
    /// Stable identifier, also the suppression key
    fn id(&self) -> CheckId;

    /// Run to completion over the whole application, returning every
    /// issue found, in discovery order
    fn run(&self, app: &WorkflowApp) -> Vec<Issue>;
}

/// A subworkflow's name must be non-empty and must not be the reserved
/// entry-workflow name.
pub(crate) struct InvalidWorkflowName;

impl Check for InvalidWorkflowName {
    fn id(&self) -> CheckId {
        CheckId::InvalidWorkflowName
    }

    fn run(&self, app: &WorkflowApp) -> Vec<Issue> {
        let mut issues = Vec::new();
        for (index, workflow) in app.subworkflows.iter().enumerate() {
            if workflow.name.is_empty() {
                issues.push(Issue::new(
                    self.id(),
                    format!("subworkflow #{index} has an empty name"),
                ));
            } else if workflow.name == MAIN_WORKFLOW {
                issues.push(Issue::new(
                    self.id(),
                    format!(
                        "subworkflow #{index} uses the name '{MAIN_WORKFLOW}', \
                         which is reserved for the entry workflow"
                    ),
                ));
            }
        }
        issues
    }
}

/// No two steps in one workflow's full expansion may share a name.
/// Repeats across different workflows are allowed.
pub(crate) struct DuplicatedStepName;

impl Check for DuplicatedStepName {
    fn id(&self) -> CheckId {
        CheckId::DuplicatedStepName
    }

    fn run(&self, app: &WorkflowApp) -> Vec<Issue> {
        let mut issues = Vec::new();
        for workflow in app.workflows() {
            let mut seen = HashSet::new();
            let mut duplicated: Vec<&str> = Vec::new();
            for (name, _) in walk(workflow) {
                if !seen.insert(name) && !duplicated.contains(&name) {
                    duplicated.push(name);
                }
            }
            if !duplicated.is_empty() {
                issues.push(Issue::new(
                    self.id(),
                    format!(
                        "workflow '{}' declares duplicated step names: {}",
                        workflow.name,
                        duplicated.join(", ")
                    ),
                ));
            }
        }
        issues
    }
}

/// No two subworkflows may share a name.
pub(crate) struct DuplicatedSubworkflowName;

impl Check for DuplicatedSubworkflowName {
    fn id(&self) -> CheckId {
        CheckId::DuplicatedSubworkflowName
    }

    fn run(&self, app: &WorkflowApp) -> Vec<Issue> {
        let mut seen = HashSet::new();
        let mut duplicated: Vec<&str> = Vec::new();
        for workflow in &app.subworkflows {
            let name = workflow.name.as_str();
            if !seen.insert(name) && !duplicated.contains(&name) {
                duplicated.push(name);
            }
        }
        if duplicated.is_empty() {
            Vec::new()
        } else {
            vec![Issue::new(
                self.id(),
                format!("duplicated subworkflow names: {}", duplicated.join(", ")),
            )]
        }
    }
}

/// Every call target and jump target must resolve by name.
///
/// A call target containing a `.` is taken to be a connector reference
/// and accepted without resolution. The heuristic is knowingly loose in
/// both directions and is preserved as-is.
pub(crate) struct MissingJumpTarget;

impl Check for MissingJumpTarget {
    fn id(&self) -> CheckId {
        CheckId::MissingJumpTarget
    }

    fn run(&self, app: &WorkflowApp) -> Vec<Issue> {
        let subworkflow_names: HashSet<&str> =
            app.subworkflows.iter().map(|w| w.name.as_str()).collect();

        let mut issues = Vec::new();
        for workflow in app.workflows() {
            let steps = walk(workflow);
            let step_names: HashSet<&str> = steps.iter().map(|(name, _)| *name).collect();

            for (name, step) in &steps {
                match step {
                    Step::Call(call) => {
                        let resolves = call.target.contains('.')
                            || step_names.contains(call.target.as_str())
                            || subworkflow_names.contains(call.target.as_str());
                        if !resolves {
                            issues.push(Issue::new(
                                self.id(),
                                format!(
                                    "step '{name}' in workflow '{}' calls unknown target '{}'",
                                    workflow.name, call.target
                                ),
                            ));
                        }
                    }
                    Step::Switch(switch) => {
                        for condition in &switch.conditions {
                            if let ConditionTarget::Jump(target) = &condition.target {
                                if !jump_resolves(target, &step_names) {
                                    issues.push(unknown_jump(self.id(), name, &workflow.name, target));
                                }
                            }
                        }
                        if let Some(target) = &switch.next {
                            if !jump_resolves(target, &step_names) {
                                issues.push(unknown_jump(self.id(), name, &workflow.name, target));
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        issues
    }
}

fn jump_resolves(target: &str, step_names: &HashSet<&str>) -> bool {
    target == END_TARGET || step_names.contains(target)
}

fn unknown_jump(id: CheckId, step_name: &str, workflow_name: &str, target: &str) -> Issue {
    Issue::new(
        id,
        format!(
            "step '{step_name}' in workflow '{workflow_name}' jumps to unknown target '{target}'"
        ),
    )
}

/// A call to a known subworkflow must supply exactly its required
/// parameters and nothing outside the declared parameter set.
pub(crate) struct WrongNumberOfCallArguments;

impl Check for WrongNumberOfCallArguments {
    fn id(&self) -> CheckId {
        CheckId::WrongNumberOfCallArguments
    }

    fn run(&self, app: &WorkflowApp) -> Vec<Issue> {
        // Parameter index per subworkflow; with duplicate declarations the
        // first one wins, matching WorkflowApp::subworkflow.
        let mut params: HashMap<&str, (Vec<&str>, HashSet<&str>)> = HashMap::new();
        for workflow in &app.subworkflows {
            params.entry(workflow.name.as_str()).or_insert_with(|| {
                let required = workflow.required_params();
                let declared = workflow.params.iter().map(|p| p.name.as_str()).collect();
                (required, declared)
            });
        }

        let mut issues = Vec::new();
        for workflow in app.workflows() {
            for (name, step) in walk(workflow) {
                if let Step::Call(call) = step {
                    if let Some((required, declared)) = params.get(call.target.as_str()) {
                        let provided: HashSet<&str> =
                            call.args.iter().map(|(n, _)| n.as_str()).collect();

                        let missing: Vec<&str> = required
                            .iter()
                            .copied()
                            .filter(|r| !provided.contains(r))
                            .collect();
                        if !missing.is_empty() {
                            issues.push(Issue::new(
                                self.id(),
                                format!(
                                    "call '{name}' in workflow '{}' to subworkflow '{}' \
                                     is missing required arguments: {}",
                                    workflow.name,
                                    call.target,
                                    missing.join(", ")
                                ),
                            ));
                        }

                        let mut undeclared: Vec<&str> = Vec::new();
                        for (arg, _) in &call.args {
                            let arg = arg.as_str();
                            if !declared.contains(arg) && !undeclared.contains(&arg) {
                                undeclared.push(arg);
                            }
                        }
                        if !undeclared.is_empty() {
                            issues.push(Issue::new(
                                self.id(),
                                format!(
                                    "call '{name}' in workflow '{}' to subworkflow '{}' \
                                     supplies undeclared arguments: {}",
                                    workflow.name,
                                    call.target,
                                    undeclared.join(", ")
                                ),
                            ));
                        }
                    }
                }
            }
        }
        issues
    }
}
