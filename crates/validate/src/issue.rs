//! Issues, check identifiers, and the aggregate validation error

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of one validation check.
///
/// The five string forms are the stable public vocabulary for selective
/// suppression; they must not be renamed without a migration note.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckId {
    InvalidWorkflowName,
    DuplicatedStepName,
    DuplicatedSubworkflowName,
    MissingJumpTarget,
    WrongNumberOfCallArguments,
}

impl CheckId {
    /// Every check, in pipeline execution order
    pub const ALL: [CheckId; 5] = [
        CheckId::InvalidWorkflowName,
        CheckId::DuplicatedStepName,
        CheckId::DuplicatedSubworkflowName,
        CheckId::MissingJumpTarget,
        CheckId::WrongNumberOfCallArguments,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckId::InvalidWorkflowName => "invalidWorkflowName",
            CheckId::DuplicatedStepName => "duplicatedStepName",
            CheckId::DuplicatedSubworkflowName => "duplicatedSubworkflowName",
            CheckId::MissingJumpTarget => "missingJumpTarget",
            CheckId::WrongNumberOfCallArguments => "wrongNumberOfCallArguments",
        }
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string did not name any known check
#[derive(Debug, thiserror::Error)]
#[error("unknown check identifier: {0}")]
pub struct UnknownCheckId(pub String);

impl FromStr for CheckId {
    type Err = UnknownCheckId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CheckId::ALL
            .iter()
            .find(|c| c.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownCheckId(s.to_string()))
    }
}

/// One reported validation problem
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// The check that produced this issue
    pub check: CheckId,
    /// Human-readable description naming the offending step or workflow
    pub message: String,
}

impl Issue {
    pub fn new(check: CheckId, message: impl Into<String>) -> Self {
        Self {
            check,
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.check, self.message)
    }
}

/// Aggregate failure carrying every issue from every enabled check.
///
/// Validation never fails one issue at a time.
#[derive(Debug, thiserror::Error)]
#[error("workflow validation failed with {} issue(s): {}", .issues.len(), summarize(.issues))]
pub struct ValidationError {
    pub issues: Vec<Issue>,
}

fn summarize(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(Issue::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
