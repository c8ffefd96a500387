//! Pre-order traversal over a workflow's step tree
//!
//! The sequence produced here is the single source of truth for "which
//! names exist in this workflow". Every name-resolution check builds its
//! index from it. Named jump targets are not structural edges and are
//! never followed.

use cadence_ir::{NamedStep, Step, Workflow};
use std::collections::HashSet;

/// All `(name, step)` pairs reachable by structural nesting, depth-first,
/// parent before children, siblings in declared order.
///
/// A visited guard keyed on node identity skips any step object seen
/// twice. Under the ownership tree this never fires, but an aliased or
/// cyclic structure would be tolerated rather than looped over.
pub fn walk(workflow: &Workflow) -> Vec<(&str, &Step)> {
    let mut visited: HashSet<*const NamedStep> = HashSet::new();
    let mut out = Vec::new();
    for step in &workflow.steps {
        visit(step, &mut visited, &mut out);
    }
    out
}

fn visit<'a>(
    node: &'a NamedStep,
    visited: &mut HashSet<*const NamedStep>,
    out: &mut Vec<(&'a str, &'a Step)>,
) {
    if !visited.insert(node as *const NamedStep) {
        return;
    }
    out.push((node.name.as_str(), &node.step));
    for child in node.step.nested() {
        visit(child, visited, out);
    }
}
