//! Blueprint Verification Harness
//!
//! Post-provisioning verification for a deployed vision annotation
//! blueprint: checks that storage buckets exist, serverless functions
//! are active and wired to their event triggers, and the deployed
//! annotate endpoint behaves correctly under normal and error
//! conditions.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use verifier::{BlueprintConfig, PollBudget, Scenarios};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! // Configure the harness against a provisioned blueprint
//! let config = BlueprintConfig::builder()
//!     .terraform_dir("infra/")
//!     .poll(PollBudget::new(20, Duration::from_secs(3)))
//!     .build();
//!
//! // Run one scenario, or "all" for the full sequence
//! let scenarios = Scenarios::new(config);
//! scenarios.run_scenario("api").await?;
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod config;
pub mod runtime;
pub mod scenarios;
pub mod testing;

// Main interfaces - re-exported at crate root for convenience
pub use config::{BlueprintConfig, BlueprintConfigBuilder, RetryRule};
pub use runtime::{AnnotateClient, BlueprintOutputs, GcloudRunner, JsonDoc};
pub use runtime::{PollBudget, ProbeStatus, poll};
pub use scenarios::{AnnotateMode, Scenarios};
pub use testing::AssertionResult;
