//! Retry policies attached to protected blocks

use serde::{Deserialize, Serialize};

/// Backoff parameters for a custom retry policy, in seconds
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Backoff {
    pub initial_delay: f64,
    pub max_delay: f64,
    pub multiplier: f64,
}

impl Backoff {
    pub fn new(initial_delay: f64, max_delay: f64, multiplier: f64) -> Self {
        Self {
            initial_delay,
            max_delay,
            multiplier,
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial_delay: 1.0,
            max_delay: 60.0,
            multiplier: 2.0,
        }
    }
}

/// Retry behavior for a `TryExcept` step's protected block
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// A policy predefined by the engine, referenced by its dotted name,
    /// e.g. `http.default_retry`
    Default(String),

    /// A caller-supplied policy
    Custom {
        /// Dotted reference to the predicate deciding whether to retry
        predicate: String,
        /// Maximum number of retry attempts
        max_retries: u32,
        /// Delay growth between attempts
        backoff: Backoff,
    },
}

impl RetryPolicy {
    /// Reference a policy predefined by the engine
    pub fn default_policy(name: impl Into<String>) -> Self {
        RetryPolicy::Default(name.into())
    }

    /// Build a custom policy
    pub fn custom(predicate: impl Into<String>, max_retries: u32, backoff: Backoff) -> Self {
        RetryPolicy::Custom {
            predicate: predicate.into(),
            max_retries,
            backoff,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backoff_doubles() {
        let b = Backoff::default();
        assert_eq!(b.initial_delay, 1.0);
        assert_eq!(b.multiplier, 2.0);
    }

    #[test]
    fn test_custom_policy() {
        let p = RetryPolicy::custom("http.default_retry_predicate", 5, Backoff::default());
        match p {
            RetryPolicy::Custom { max_retries, .. } => assert_eq!(max_retries, 5),
            other => panic!("expected custom policy, got {:?}", other),
        }
    }
}
