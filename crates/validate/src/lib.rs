//! Static validation for Cadence workflow applications
//!
//! The validator consumes a finished, immutable `WorkflowApp` and proves
//! it internally consistent: no duplicate identifiers, no dangling jump
//! targets, call arity matching declared parameters. It never executes or
//! simulates the workflow and never inspects embedded expressions.
//!
//! # Pipeline
//!
//! Five independent checks run in a fixed order:
//!
//! 1. `invalidWorkflowName`
//! 2. `duplicatedStepName`
//! 3. `duplicatedSubworkflowName`
//! 4. `missingJumpTarget`
//! 5. `wrongNumberOfCallArguments`
//!
//! Every enabled check runs to completion regardless of what earlier
//! checks found; all issues are surfaced together in one
//! [`ValidationError`], never one at a time. A check can be suppressed by
//! passing its identifier in `disabled`; unknown identifiers are ignored.
//!
//! # Usage
//!
//! ```rust
//! use cadence_ir::{CallStep, NamedStep, Workflow, WorkflowApp};
//! use cadence_validate::validate;
//!
//! let app = WorkflowApp::new(
//!     Workflow::main()
//!         .with_step(NamedStep::new("greet", CallStep::new("sys.log").with_arg("text", "hi"))),
//! );
//! validate(&app, &[]).unwrap();
//! ```

#![deny(unsafe_code)]

mod checks;
mod issue;
mod traverse;

pub use issue::{CheckId, Issue, UnknownCheckId, ValidationError};
pub use traverse::walk;

use cadence_ir::WorkflowApp;
use checks::{
    Check, DuplicatedStepName, DuplicatedSubworkflowName, InvalidWorkflowName, MissingJumpTarget,
    WrongNumberOfCallArguments,
};
use std::collections::HashSet;
use tracing::debug;

/// Run every enabled check over the application.
///
/// Returns `Ok(())` when no enabled check finds an issue. Otherwise
/// returns a single [`ValidationError`] carrying all issues, in check
/// order and, within a check, in discovery order. The input tree is never
/// mutated, and repeated calls over the same tree yield identical issue
/// lists.
pub fn validate(app: &WorkflowApp, disabled: &[&str]) -> Result<(), ValidationError> {
    let disabled: HashSet<CheckId> = disabled.iter().filter_map(|s| s.parse().ok()).collect();
    let checks: [&dyn Check; 5] = [
        &InvalidWorkflowName,
        &DuplicatedStepName,
        &DuplicatedSubworkflowName,
        &MissingJumpTarget,
        &WrongNumberOfCallArguments,
    ];

    let mut issues = Vec::new();
    for check in checks {
        let id = check.id();
        if disabled.contains(&id) {
            debug!(check = id.as_str(), "check disabled, skipped");
            continue;
        }
        let found = check.run(app);
        debug!(check = id.as_str(), issues = found.len(), "check completed");
        issues.extend(found);
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { issues })
    }
}
