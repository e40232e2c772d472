//! Verification Scenarios
//!
//! Named scenarios over a provisioned blueprint, dispatched by the
//! runner binary or called directly from test code.

// Re-export the check macro for use in scenario modules
pub use crate::check;

pub mod api;
pub mod infra;

pub use api::AnnotateMode;

use crate::config::BlueprintConfig;
use crate::runtime::{BlueprintOutputs, GcloudRunner};

pub struct Scenarios {
    config: BlueprintConfig,
}

impl Scenarios {
    pub fn new(config: BlueprintConfig) -> Self {
        Self { config }
    }

    /// Run a specific scenario by name
    pub async fn run_scenario(&self, name: &str) -> Result<(), Box<dyn std::error::Error>> {
        let outputs = BlueprintOutputs::load(&self.config.terraform_dir).await?;
        let gcloud = self.gcloud(&outputs)?;

        match name {
            // Infrastructure checks
            "outputs" => infra::outputs(&outputs).await,
            "storage" => infra::storage(&outputs, &gcloud).await,
            "functions" => infra::functions(&outputs, &gcloud).await,

            // Endpoint checks
            "api" => api::annotate(&self.config, &outputs, AnnotateMode::Multipart).await,
            "vqa" => api::annotate(&self.config, &outputs, AnnotateMode::QuestionAnswering).await,
            "errors" => api::error_codes(&self.config, &outputs).await,
            "artifact" => api::artifact(&self.config, &outputs, &gcloud).await,

            // Full verification sequence (vqa is deployment-variant specific
            // and runs only when named explicitly)
            "all" => {
                tracing::info!("🧪 Running FULL verification suite");

                infra::outputs(&outputs).await?;
                infra::storage(&outputs, &gcloud).await?;
                infra::functions(&outputs, &gcloud).await?;
                api::annotate(&self.config, &outputs, AnnotateMode::Multipart).await?;
                api::error_codes(&self.config, &outputs).await?;
                api::artifact(&self.config, &outputs, &gcloud).await?;

                tracing::info!("🏆 ALL verification scenarios COMPLETED successfully!");
                Ok(())
            }

            _ => Err(format!(
                "Unknown scenario: '{}'. Available: {}",
                name,
                Self::available_scenarios().join(", ")
            )
            .into()),
        }
    }

    /// Get list of available scenarios
    pub fn available_scenarios() -> Vec<&'static str> {
        vec![
            // Infrastructure
            "outputs", "storage", "functions", // Provisioned resources
            // Endpoint
            "api", "vqa", "errors", "artifact", // Deployed service behavior
            // Suite
            "all", // Complete verification sequence
        ]
    }

    fn gcloud(&self, outputs: &BlueprintOutputs) -> Result<GcloudRunner, Box<dyn std::error::Error>> {
        let project_id = match &self.config.project_id {
            Some(project) => project.clone(),
            None => outputs.get("project_id")?,
        };

        Ok(GcloudRunner::new(Some(project_id)).with_retries(
            self.config.retry_rules.clone(),
            self.config.command_retries,
            self.config.command_backoff,
        ))
    }
}
