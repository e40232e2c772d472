//! Deployment Output Lookup
//!
//! Opaque key-value view over the provisioning step's outputs, queried
//! by exact key. Loaded from `terraform output -json`, or built
//! directly from a JSON value for tests and pre-captured output files.

use serde_json::Value;
use shared::{VerifyError, VerifyResult};
use tokio::process::Command;

/// String-valued outputs of a provisioned blueprint
#[derive(Debug, Clone)]
pub struct BlueprintOutputs {
    values: Value,
}

impl BlueprintOutputs {
    /// Load outputs by running `terraform output -json` in a directory
    pub async fn load(terraform_dir: &str) -> VerifyResult<Self> {
        let command_line = format!("terraform output -json (in {})", terraform_dir);
        let output = Command::new("terraform")
            .args(["output", "-json"])
            .current_dir(terraform_dir)
            .output()
            .await
            .map_err(|e| VerifyError::CommandSpawn {
                command: command_line.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(VerifyError::CommandFailed {
                command: command_line,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let values: Value =
            serde_json::from_slice(&output.stdout).map_err(|e| VerifyError::JsonError {
                message: e.to_string(),
            })?;
        Ok(Self::from_value(values))
    }

    pub fn from_value(values: Value) -> Self {
        Self { values }
    }

    /// Exact-key lookup returning a non-empty string value.
    ///
    /// Handles both plain string entries and the `{"value": ...}`
    /// envelope emitted by `terraform output -json`.
    pub fn get(&self, name: &str) -> VerifyResult<String> {
        let missing = || VerifyError::MissingOutput {
            name: name.to_string(),
        };

        let entry = self.values.get(name).ok_or_else(missing)?;
        let value = entry.get("value").unwrap_or(entry);
        match value {
            Value::String(s) if !s.is_empty() => Ok(s.clone()),
            _ => Err(missing()),
        }
    }

    /// URL-valued output lookup.
    ///
    /// Prediction-URL outputs occasionally arrive list-formatted; take
    /// the first whitespace-separated token and strip surrounding
    /// brackets and quotes, matching how the deployed value is consumed.
    pub fn get_url(&self, name: &str) -> VerifyResult<String> {
        let raw = self.get(name)?;
        let first = raw
            .split_whitespace()
            .next()
            .ok_or_else(|| VerifyError::MissingOutput {
                name: name.to_string(),
            })?;
        let trimmed = first.trim_matches(|c| c == '[' || c == ']' || c == '"' || c == ',');

        let parsed = url::Url::parse(trimmed).map_err(|e| VerifyError::InvalidConfig {
            field: name.to_string(),
            value: format!("{} ({})", trimmed, e),
        })?;
        Ok(parsed.to_string().trim_end_matches('/').to_string())
    }
}
