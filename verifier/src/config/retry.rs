//! Retryable Error Rules
//!
//! Maps stderr patterns of transient provisioning failures to a
//! human-readable justification. The rule table is plain configuration
//! handed to the harness at scenario start; there is no process-wide
//! registry.

use regex::Regex;
use shared::{VerifyError, VerifyResult};

/// One retryable-error pattern with its justification
#[derive(Debug, Clone)]
pub struct RetryRule {
    pattern: Regex,
    pub reason: String,
}

impl RetryRule {
    /// Build a rule, rejecting invalid patterns
    pub fn new(pattern: &str, reason: &str) -> VerifyResult<Self> {
        let pattern = Regex::new(pattern).map_err(|e| VerifyError::InvalidConfig {
            field: "retry_rule".to_string(),
            value: format!("{} ({})", pattern, e),
        })?;
        Ok(Self {
            pattern,
            reason: reason.to_string(),
        })
    }

    /// True when the captured stderr matches this rule
    pub fn matches(&self, stderr: &str) -> bool {
        self.pattern.is_match(stderr)
    }

    /// IAM for the Eventarc service agent is eventually consistent
    pub fn eventarc_iam_propagation() -> Self {
        Self::new(
            ".*Permission denied while using the Eventarc Service Agent.*",
            "Eventarc Service Agent IAM is eventually consistent",
        )
        .expect("Failed to compile built-in retry rule")
    }
}
