//! Resource-inspection scenarios against a scripted CLI
//!
//! Stands in a shell script for `gcloud` so the function and artifact
//! scenarios run end to end: canned `functions list`/`describe` JSON
//! drives the wiring checks, and a scripted `storage cp` produces the
//! `{original-filename}.json` annotation result.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::time::Duration;

use serde_json::json;
use verifier::scenarios::{api, infra};
use verifier::{BlueprintConfig, BlueprintOutputs, GcloudRunner, PollBudget};

fn write_script(dir: &std::path::Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path.to_string_lossy().into_owned()
}

fn function_outputs() -> BlueprintOutputs {
    BlueprintOutputs::from_value(json!({
        "annotate_gcs_function_name": {"sensitive": false, "type": "string", "value": "annotate-gcs"},
        "annotate_http_function_name": {"sensitive": false, "type": "string", "value": "annotate-http"}
    }))
}

/// Answers every inspection call the functions scenario makes
const HEALTHY_CLI: &str = r#"#!/bin/sh
case "$1 $2" in
  "functions list") cat <<'EOF'
[
  {"name": "projects/demo/locations/us-central1/functions/annotate-gcs",
   "state": "ACTIVE",
   "eventTrigger": {"triggerRegion": "us-central1", "pubsubTopic": "projects/demo/topics/annotate-uploads"}},
  {"name": "projects/demo/locations/us-central1/functions/annotate-http",
   "state": "ACTIVE"}
]
EOF
;;
  "functions describe") cat <<'EOF'
{"eventTrigger": {"triggerRegion": "us-central1", "pubsubTopic": "projects/demo/topics/annotate-uploads"},
 "buildConfig": {"source": {"storageSource": {"bucket": "gcf-sources", "object": "annotate.zip"}}}}
EOF
;;
  "pubsub topics") echo '{"name": "projects/demo/topics/annotate-uploads"}' ;;
  "storage objects") echo '{"name": "annotate.zip"}' ;;
  *) echo "unexpected command: $*" >&2; exit 1 ;;
esac
"#;

#[tokio::test]
async fn functions_scenario_passes_on_active_wired_functions() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "fake-gcloud.sh", HEALTHY_CLI);
    let gcloud = GcloudRunner::new(None).with_program(&script);

    infra::functions(&function_outputs(), &gcloud).await.unwrap();
}

#[tokio::test]
async fn functions_scenario_rejects_a_function_that_is_not_active() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(
        dir.path(),
        "fake-gcloud.sh",
        r#"#!/bin/sh
case "$1 $2" in
  "functions list") cat <<'EOF'
[
  {"name": "projects/demo/locations/us-central1/functions/annotate-gcs",
   "state": "DEPLOYING",
   "eventTrigger": {"triggerRegion": "us-central1", "pubsubTopic": "projects/demo/topics/annotate-uploads"}}
]
EOF
;;
  *) echo "unexpected command: $*" >&2; exit 1 ;;
esac
"#,
    );
    let gcloud = GcloudRunner::new(None).with_program(&script);

    let err = infra::functions(&function_outputs(), &gcloud)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("active"));
}

#[tokio::test]
async fn functions_scenario_rejects_a_gcs_function_without_an_event_trigger() {
    let dir = tempfile::tempdir().unwrap();
    // Both functions active, but the bucket-triggered one lost its trigger
    let script = write_script(
        dir.path(),
        "fake-gcloud.sh",
        r#"#!/bin/sh
case "$1 $2" in
  "functions list") cat <<'EOF'
[
  {"name": "projects/demo/locations/us-central1/functions/annotate-gcs",
   "state": "ACTIVE"},
  {"name": "projects/demo/locations/us-central1/functions/annotate-http",
   "state": "ACTIVE"}
]
EOF
;;
  *) echo "unexpected command: $*" >&2; exit 1 ;;
esac
"#,
    );
    let gcloud = GcloudRunner::new(None).with_program(&script);

    let err = infra::functions(&function_outputs(), &gcloud)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("gcs function trigger region"));
}

/// Fake CLI for the artifact path: the image upload succeeds, the first
/// result download fails (the pipeline has not run yet), and the second
/// writes `{original-filename}.json` into the destination directory.
fn artifact_cli(marker: &std::path::Path) -> String {
    format!(
        r#"#!/bin/sh
if [ "$1 $2" = "storage cp" ]; then
  case "$3" in
    *.json)
      if [ ! -f {marker} ]; then
        touch {marker}
        echo 'result object not found' >&2
        exit 1
      fi
      printf '%s' '{{"textAnnotations": [{{"description": "MOCK TEXT", "locale": "en"}}]}}' > "$4/$(basename "$3")"
      ;;
  esac
  exit 0
fi
echo "unexpected command: $*" >&2
exit 1
"#,
        marker = marker.display()
    )
}

#[tokio::test]
async fn artifact_scenario_polls_until_the_result_file_appears() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("pipeline-ran");
    let script = write_script(dir.path(), "fake-gcloud.sh", &artifact_cli(&marker));
    let gcloud = GcloudRunner::new(None).with_program(&script);

    // Unique image name: the scenario downloads the result into the
    // shared temp directory, keyed by the uploaded filename.
    let tag = dir.path().file_name().unwrap().to_string_lossy().into_owned();
    let image_path = dir.path().join(format!("{}.jpg", tag));
    std::fs::write(&image_path, b"not really a jpeg").unwrap();

    let config = BlueprintConfig::builder()
        .test_image_path(image_path.to_string_lossy().into_owned())
        .poll(PollBudget::new(5, Duration::from_millis(10)))
        .build();
    let outputs = BlueprintOutputs::from_value(json!({
        "vision_input_gcs": "gs://input-bucket",
        "vision_annotations_gcs": "gs://annotations-bucket"
    }));

    api::artifact(&config, &outputs, &gcloud).await.unwrap();

    // The failing first download was retried, not fatal
    assert!(marker.exists());
    std::fs::remove_file(std::env::temp_dir().join(format!("{}.jpg.json", tag))).ok();
}

#[tokio::test]
async fn artifact_scenario_fails_when_no_result_is_ever_produced() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(
        dir.path(),
        "fake-gcloud.sh",
        r#"#!/bin/sh
if [ "$1 $2" = "storage cp" ]; then
  case "$3" in
    *.json) echo 'result object not found' >&2; exit 1 ;;
  esac
  exit 0
fi
exit 1
"#,
    );
    let gcloud = GcloudRunner::new(None).with_program(&script);

    let tag = dir.path().file_name().unwrap().to_string_lossy().into_owned();
    let image_path = dir.path().join(format!("{}-missing.jpg", tag));
    std::fs::write(&image_path, b"not really a jpeg").unwrap();

    let config = BlueprintConfig::builder()
        .test_image_path(image_path.to_string_lossy().into_owned())
        .poll(PollBudget::new(3, Duration::from_millis(10)))
        .build();
    let outputs = BlueprintOutputs::from_value(json!({
        "vision_input_gcs": "gs://input-bucket",
        "vision_annotations_gcs": "gs://annotations-bucket"
    }));

    let err = api::artifact(&config, &outputs, &gcloud).await.unwrap_err();
    assert!(err.to_string().contains("never produced"));
}
