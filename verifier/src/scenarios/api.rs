//! Annotate Endpoint Scenarios
//!
//! Exercises the deployed HTTP annotation service: the normal request
//! path, the question-answering variant, error codes, and the
//! event-driven result artifact.

use reqwest::StatusCode;
use shared::{AnnotateForm, AnnotateResponse, VqaRequest};

use crate::check;
use crate::config::BlueprintConfig;
use crate::runtime::{AnnotateClient, BlueprintOutputs, GcloudRunner, ProbeStatus, poll};
use crate::testing::assertions::{assert_status, assert_text_annotations};

/// Payload variant posted by the annotate scenario.
///
/// The deployed blueprint variants share one endpoint; only the payload
/// shape differs, so the scenario is parameterized instead of
/// duplicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotateMode {
    /// Multipart form with `image_uri` and repeated `features` fields
    Multipart,
    /// JSON body for the question-answering mode
    QuestionAnswering,
}

/// Verify the live annotation path for one payload variant
pub async fn annotate(
    config: &BlueprintConfig,
    outputs: &BlueprintOutputs,
    mode: AnnotateMode,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("🧪 Annotate: {:?} request against the live endpoint", mode);

    let client = endpoint(config, outputs)?;
    let form = AnnotateForm::with_image(&config.test_image_uri, AnnotateForm::smoke_features());

    // A freshly deployed endpoint needs time to start serving
    client.wait_until_serving(&form, config.poll).await;

    match mode {
        AnnotateMode::Multipart => {
            let reply = client.annotate_uri(&form).await?;
            check!(assert_status("annotate", StatusCode::OK, reply.status));
            check!(assert_text_annotations("annotate", &reply.annotation()?));
        }
        AnnotateMode::QuestionAnswering => {
            let request = VqaRequest {
                vision_api_method: "VQA".to_string(),
                vqa_question: "What objects are in this image?".to_string(),
                vqa_num_results: 3,
                image_bucket: outputs.get("vision_input_gcs")?,
                image_file: config.test_image_name().to_string(),
            };
            let reply = client.annotate_vqa(&request).await?;
            check!(assert_status("annotate (vqa)", StatusCode::OK, reply.status));
            // The answer shape varies by method; it must at least be JSON
            reply.json()?;
        }
    }

    tracing::info!("✅ Annotate: PASSED");
    Ok(())
}

/// Verify the endpoint's error responses
pub async fn error_codes(
    config: &BlueprintConfig,
    outputs: &BlueprintOutputs,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("🧪 Errors: precondition and unsupported-method responses");

    let client = endpoint(config, outputs)?;

    // Missing image reference
    let no_image = AnnotateForm::without_image(vec!["FACE_DETECTION".to_string()]);
    let reply = client.annotate_uri(&no_image).await?;
    check!(assert_status(
        "annotate without image_uri",
        StatusCode::PRECONDITION_FAILED,
        reply.status
    ));

    // Unsupported HTTP method
    let form = AnnotateForm::with_image(&config.test_image_uri, vec!["FACE_DETECTION".to_string()]);
    let reply = client.put_annotate(&form).await?;
    check!(assert_status(
        "PUT annotate",
        StatusCode::NOT_IMPLEMENTED,
        reply.status
    ));

    tracing::info!("✅ Errors: PASSED");
    Ok(())
}

/// Verify the event-driven annotation result artifact
pub async fn artifact(
    config: &BlueprintConfig,
    outputs: &BlueprintOutputs,
    gcloud: &GcloudRunner,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("🧪 Artifact: event-driven annotation result file");

    let input_bucket = outputs.get("vision_input_gcs")?;
    let annotations_bucket = outputs.get("vision_annotations_gcs")?;

    // Upload the test image; the deployed function annotates it and
    // writes `{original-filename}.json` into the annotations bucket.
    gcloud
        .copy_storage(&config.test_image_path, &input_bucket)
        .await?;

    let result_name = format!("{}.json", config.test_image_name());
    let result_url = format!("{}/{}", annotations_bucket.trim_end_matches('/'), result_name);
    let local_dir = std::env::temp_dir();
    let local_path = local_dir.join(&result_name);
    let local_dir_arg = local_dir.to_string_lossy().into_owned();

    // The annotation pipeline is asynchronous; fetching the result file
    // fails until the function has processed the upload.
    poll(
        || {
            let result_url = result_url.clone();
            let local_dir_arg = local_dir_arg.clone();
            async move {
                gcloud.copy_storage(&result_url, &local_dir_arg).await?;
                Ok(ProbeStatus::Ready)
            }
        },
        config.poll,
    )
    .await;

    let body = tokio::fs::read_to_string(&local_path)
        .await
        .map_err(|e| format!("annotation result file was never produced: {}", e))?;
    let response = AnnotateResponse::from_json(&body)?;
    check!(assert_text_annotations("annotation result file", &response));

    tracing::info!("✅ Artifact: PASSED");
    Ok(())
}

fn endpoint(
    config: &BlueprintConfig,
    outputs: &BlueprintOutputs,
) -> Result<AnnotateClient, Box<dyn std::error::Error>> {
    let base = match &config.annotate_url {
        Some(url) => url.clone(),
        None => outputs.get_url("vision_prediction_url")?,
    };
    Ok(AnnotateClient::new(&base))
}
