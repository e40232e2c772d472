//! Cloud CLI Runner
//!
//! Shells out to `gcloud` for resource inspection, scoped to a project
//! and always requesting JSON output. Transient failures matching a
//! configured retry rule are re-run with a fixed backoff; everything
//! else fails immediately with the captured stderr.

use std::time::Duration;

use serde_json::Value;
use shared::{VerifyError, VerifyResult};
use tokio::process::Command;
use tokio::time::sleep;

use crate::config::RetryRule;

/// Parsed JSON document returned by a resource-inspection call
#[derive(Debug, Clone)]
pub struct JsonDoc {
    value: Value,
}

impl JsonDoc {
    pub fn parse(raw: &str) -> VerifyResult<Self> {
        let value = serde_json::from_str(raw).map_err(|e| VerifyError::JsonError {
            message: e.to_string(),
        })?;
        Ok(Self { value })
    }

    pub fn from_value(value: Value) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Dotted-path lookup, e.g. `"buildConfig.source.storageSource.bucket"`
    pub fn path(&self, path: &str) -> Option<&Value> {
        let mut current = &self.value;
        for part in path.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Non-empty string at a dotted path, or a field-missing error
    pub fn string_at(&self, path: &str) -> VerifyResult<String> {
        match self.path(path) {
            Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
            _ => Err(VerifyError::FieldMissing {
                path: path.to_string(),
            }),
        }
    }

    /// Elements of a top-level JSON array (e.g. `functions list` output)
    pub fn array(&self) -> VerifyResult<Vec<JsonDoc>> {
        match &self.value {
            Value::Array(items) => Ok(items.iter().cloned().map(JsonDoc::from_value).collect()),
            _ => Err(VerifyError::JsonError {
                message: "expected a JSON array".to_string(),
            }),
        }
    }

    /// True for null, empty string, empty array, or empty object
    pub fn is_empty(&self) -> bool {
        match &self.value {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }
}

/// Runs `gcloud` commands scoped to one project
pub struct GcloudRunner {
    program: String,
    project_id: Option<String>,
    retry_rules: Vec<RetryRule>,
    max_retries: u32,
    backoff: Duration,
}

impl GcloudRunner {
    pub fn new(project_id: Option<String>) -> Self {
        Self {
            program: "gcloud".to_string(),
            project_id,
            retry_rules: Vec::new(),
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    /// Override the executable (fake CLI scripts in tests)
    pub fn with_program(mut self, program: &str) -> Self {
        self.program = program.to_string();
        self
    }

    /// Enable bounded fixed-backoff retries for stderr matching a rule
    pub fn with_retries(
        mut self,
        rules: Vec<RetryRule>,
        max_retries: u32,
        backoff: Duration,
    ) -> Self {
        self.retry_rules = rules;
        self.max_retries = max_retries;
        self.backoff = backoff;
        self
    }

    /// Run a command and parse its stdout as a JSON document.
    ///
    /// Empty stdout parses to a null document rather than an error, so
    /// callers can assert emptiness through [`JsonDoc::is_empty`].
    pub async fn run(&self, args: &[&str]) -> VerifyResult<JsonDoc> {
        let raw = self.run_raw(args).await?;
        if raw.trim().is_empty() {
            Ok(JsonDoc::from_value(Value::Null))
        } else {
            JsonDoc::parse(&raw)
        }
    }

    /// Run a command and return raw stdout
    pub async fn run_raw(&self, args: &[&str]) -> VerifyResult<String> {
        let full_args = self.full_args(args);
        let command_line = format!("{} {}", self.program, full_args.join(" "));
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            tracing::debug!("🛠️ Running: {}", command_line);

            let output = Command::new(&self.program)
                .args(&full_args)
                .output()
                .await
                .map_err(|e| VerifyError::CommandSpawn {
                    command: command_line.clone(),
                    message: e.to_string(),
                })?;

            if output.status.success() {
                return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
            }

            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            if attempt <= self.max_retries {
                if let Some(rule) = self.retry_rules.iter().find(|r| r.matches(&stderr)) {
                    tracing::warn!(
                        "🔁 Transient failure ({}), retrying in {:?} (attempt {}/{})",
                        rule.reason,
                        self.backoff,
                        attempt,
                        self.max_retries
                    );
                    sleep(self.backoff).await;
                    continue;
                }
            }

            return Err(VerifyError::CommandFailed {
                command: command_line,
                stderr,
            });
        }
    }

    /// Describe a storage bucket
    pub async fn describe_bucket(&self, bucket: &str) -> VerifyResult<JsonDoc> {
        self.run(&["storage", "buckets", "describe", bucket]).await
    }

    /// List all deployed functions in the project
    pub async fn list_functions(&self) -> VerifyResult<JsonDoc> {
        self.run(&["functions", "list"]).await
    }

    /// Describe a gen2 function in a region
    pub async fn describe_function(&self, name: &str, region: &str) -> VerifyResult<JsonDoc> {
        self.run(&["functions", "describe", name, "--region", region, "--gen2"])
            .await
    }

    /// Describe a pub/sub topic
    pub async fn describe_topic(&self, topic: &str) -> VerifyResult<JsonDoc> {
        self.run(&["pubsub", "topics", "describe", topic]).await
    }

    /// Describe a storage object by bucket and object name
    pub async fn describe_storage_object(&self, bucket: &str, object: &str) -> VerifyResult<JsonDoc> {
        let url = format!("gs://{}/{}", bucket, object);
        self.run(&["storage", "objects", "describe", &url]).await
    }

    /// Copy between local paths and storage URLs
    pub async fn copy_storage(&self, src: &str, dst: &str) -> VerifyResult<JsonDoc> {
        self.run(&["storage", "cp", src, dst]).await
    }

    fn full_args(&self, args: &[&str]) -> Vec<String> {
        let mut full: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        if let Some(ref project) = self.project_id {
            full.push("--project".to_string());
            full.push(project.clone());
        }
        full.push("--format=json".to_string());
        full
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn appends_project_scope_and_json_format() {
        let runner = GcloudRunner::new(Some("test-project".to_string()));
        let args = runner.full_args(&["functions", "list"]);
        assert_eq!(
            args,
            vec!["functions", "list", "--project", "test-project", "--format=json"]
        );
    }

    #[test]
    fn omits_project_scope_when_unset() {
        let runner = GcloudRunner::new(None);
        let args = runner.full_args(&["pubsub", "topics", "describe", "t"]);
        assert_eq!(args.last().unwrap(), "--format=json");
        assert!(!args.contains(&"--project".to_string()));
    }

    #[test]
    fn dotted_path_traverses_nested_objects() {
        let doc = JsonDoc::from_value(json!({
            "buildConfig": {"source": {"storageSource": {"bucket": "gcf-sources", "object": "src.zip"}}}
        }));
        assert_eq!(
            doc.string_at("buildConfig.source.storageSource.bucket").unwrap(),
            "gcf-sources"
        );
        assert!(doc.path("buildConfig.source.missing").is_none());
    }

    #[test]
    fn missing_or_empty_string_field_is_an_error() {
        let doc = JsonDoc::from_value(json!({"eventTrigger": {"triggerRegion": ""}}));
        assert!(matches!(
            doc.string_at("eventTrigger.triggerRegion"),
            Err(VerifyError::FieldMissing { .. })
        ));
    }

    #[test]
    fn emptiness_covers_null_string_array_and_object() {
        assert!(JsonDoc::from_value(json!(null)).is_empty());
        assert!(JsonDoc::from_value(json!("")).is_empty());
        assert!(JsonDoc::from_value(json!([])).is_empty());
        assert!(JsonDoc::from_value(json!({})).is_empty());
        assert!(!JsonDoc::from_value(json!({"name": "bucket"})).is_empty());
    }

    #[test]
    fn array_accessor_rejects_non_arrays() {
        let doc = JsonDoc::from_value(json!({"state": "ACTIVE"}));
        assert!(doc.array().is_err());
        let list = JsonDoc::from_value(json!([{"state": "ACTIVE"}]));
        assert_eq!(list.array().unwrap().len(), 1);
    }

    #[cfg(unix)]
    mod fake_cli {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        fn write_script(dir: &std::path::Path, name: &str, body: &str) -> String {
            let path = dir.join(name);
            std::fs::write(&path, body).unwrap();
            let mut perms = std::fs::metadata(&path).unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&path, perms).unwrap();
            path.to_string_lossy().into_owned()
        }

        #[tokio::test]
        async fn retries_transient_failures_matching_a_rule() {
            let dir = tempfile::tempdir().unwrap();
            let marker = dir.path().join("warmed-up");
            // Fails with an eventual-consistency message until the marker exists
            let script = write_script(
                dir.path(),
                "fake-gcloud.sh",
                &format!(
                    "#!/bin/sh\nif [ -f {m} ]; then echo '{{\"ok\": true}}'; else touch {m}; \
                     echo 'Permission denied while using the Eventarc Service Agent' >&2; exit 1; fi\n",
                    m = marker.display()
                ),
            );

            let runner = GcloudRunner::new(None).with_program(&script).with_retries(
                vec![RetryRule::eventarc_iam_propagation()],
                3,
                Duration::from_millis(10),
            );

            let doc = runner.run(&["functions", "list"]).await.unwrap();
            assert_eq!(doc.path("ok"), Some(&json!(true)));
        }

        #[tokio::test]
        async fn unmatched_failures_surface_immediately() {
            let dir = tempfile::tempdir().unwrap();
            let script = write_script(
                dir.path(),
                "fake-gcloud.sh",
                "#!/bin/sh\necho 'ERROR: bucket not found' >&2\nexit 1\n",
            );

            let runner = GcloudRunner::new(None).with_program(&script).with_retries(
                vec![RetryRule::eventarc_iam_propagation()],
                3,
                Duration::from_millis(10),
            );

            let result = runner.run(&["storage", "buckets", "describe", "gs://missing"]).await;
            match result {
                Err(VerifyError::CommandFailed { stderr, .. }) => {
                    assert!(stderr.contains("bucket not found"));
                }
                other => panic!("expected CommandFailed, got {:?}", other.map(|d| d.value().clone())),
            }
        }

        #[tokio::test]
        async fn empty_stdout_parses_to_a_null_document() {
            let dir = tempfile::tempdir().unwrap();
            let script = write_script(dir.path(), "fake-gcloud.sh", "#!/bin/sh\nexit 0\n");

            let runner = GcloudRunner::new(None).with_program(&script);
            let doc = runner.run(&["storage", "cp", "a", "b"]).await.unwrap();
            assert!(doc.is_empty());
        }
    }
}
