//! Blueprint Configuration
//!
//! Everything a scenario run needs to know about the deployed
//! blueprint: where its outputs live, how patiently to poll the
//! endpoint, and which command failures are worth retrying.

use std::time::Duration;

use crate::runtime::PollBudget;

use super::retry::RetryRule;

/// Publicly readable image used by the annotate smoke scenario
pub const DEFAULT_TEST_IMAGE_URI: &str =
    "https://storage.googleapis.com/cft_test_data/annotate_images/ML20682781.jpg";

/// Local image uploaded by the artifact scenario
pub const DEFAULT_TEST_IMAGE_PATH: &str = "testfile/TestImage.jpg";

#[derive(Debug, Clone)]
pub struct BlueprintConfig {
    /// Project override; defaults to the `project_id` deployment output
    pub project_id: Option<String>,
    /// Directory holding the provisioned blueprint's terraform state
    pub terraform_dir: String,
    /// Endpoint override; defaults to the `vision_prediction_url` output
    pub annotate_url: Option<String>,
    /// Budget for the serving/artifact polls
    pub poll: PollBudget,
    /// Bounded retries for transient command failures
    pub command_retries: u32,
    /// Fixed backoff between command retries
    pub command_backoff: Duration,
    /// stderr patterns considered transient
    pub retry_rules: Vec<RetryRule>,
    /// Image URI posted to the annotate endpoint
    pub test_image_uri: String,
    /// Local image uploaded to the input bucket
    pub test_image_path: String,
}

impl Default for BlueprintConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            terraform_dir: ".".to_string(),
            annotate_url: None,
            poll: PollBudget::new(20, Duration::from_secs(3)),
            command_retries: 10,
            command_backoff: Duration::from_secs(60),
            retry_rules: vec![RetryRule::eventarc_iam_propagation()],
            test_image_uri: DEFAULT_TEST_IMAGE_URI.to_string(),
            test_image_path: DEFAULT_TEST_IMAGE_PATH.to_string(),
        }
    }
}

impl BlueprintConfig {
    /// Create a new builder
    pub fn builder() -> crate::config::builder::BlueprintConfigBuilder {
        crate::config::builder::BlueprintConfigBuilder::new()
    }

    /// File name of the local test image (artifact naming convention)
    pub fn test_image_name(&self) -> &str {
        self.test_image_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.test_image_path)
    }

    /// Check if this configuration is valid
    pub fn is_valid(&self) -> bool {
        !self.terraform_dir.is_empty() && !self.test_image_uri.is_empty()
    }
}
