//! Blueprint Configuration Builder
//!
//! Builder pattern for constructing scenario configurations

use std::time::Duration;

use crate::runtime::PollBudget;

use super::BlueprintConfig;
use super::retry::RetryRule;

pub struct BlueprintConfigBuilder {
    config: BlueprintConfig,
}

impl BlueprintConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: BlueprintConfig::default(),
        }
    }

    /// Set the project id override
    pub fn project<S: Into<String>>(mut self, project: impl Into<Option<S>>) -> Self {
        self.config.project_id = project.into().map(Into::into);
        self
    }

    /// Set the terraform state directory
    pub fn terraform_dir<S: Into<String>>(mut self, dir: S) -> Self {
        self.config.terraform_dir = dir.into();
        self
    }

    /// Set the annotate endpoint override
    pub fn annotate_url<S: Into<String>>(mut self, url: impl Into<Option<S>>) -> Self {
        self.config.annotate_url = url.into().map(Into::into);
        self
    }

    /// Set the serving-poll budget
    pub fn poll(mut self, budget: PollBudget) -> Self {
        self.config.poll = budget;
        self
    }

    /// Set the bounded retry count for transient command failures
    pub fn command_retries(mut self, retries: u32) -> Self {
        self.config.command_retries = retries;
        self
    }

    /// Set the fixed backoff between command retries
    pub fn command_backoff(mut self, backoff: Duration) -> Self {
        self.config.command_backoff = backoff;
        self
    }

    /// Replace the retryable-error rule table
    pub fn retry_rules(mut self, rules: Vec<RetryRule>) -> Self {
        self.config.retry_rules = rules;
        self
    }

    /// Set the image URI posted to the annotate endpoint
    pub fn test_image_uri<S: Into<String>>(mut self, uri: S) -> Self {
        self.config.test_image_uri = uri.into();
        self
    }

    /// Set the local image uploaded by the artifact scenario
    pub fn test_image_path<S: Into<String>>(mut self, path: S) -> Self {
        self.config.test_image_path = path.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> BlueprintConfig {
        self.config
    }
}

impl Default for BlueprintConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
