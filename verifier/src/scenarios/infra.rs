//! Infrastructure Scenarios
//!
//! Verifies the provisioned resources: deployment outputs present,
//! buckets exist, functions active and wired to their triggers, and
//! source archives in place.

use std::sync::LazyLock;

use regex::Regex;

use crate::check;
use crate::runtime::{BlueprintOutputs, GcloudRunner, JsonDoc};
use crate::testing::assertions::{assert_field_present, assert_non_empty, assert_value_present};

/// Outputs every other scenario depends on
const REQUIRED_OUTPUTS: [&str; 6] = [
    "project_id",
    "vision_annotations_gcs",
    "vision_input_gcs",
    "annotate_gcs_function_name",
    "annotate_http_function_name",
    "vision_prediction_url",
];

/// Verify the provisioning outputs are present and non-empty
pub async fn outputs(outputs: &BlueprintOutputs) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("🧪 Outputs: provisioning outputs present");

    for name in REQUIRED_OUTPUTS {
        let value = outputs.get(name)?;
        check!(assert_value_present(name, &value));
    }

    tracing::info!("✅ Outputs: PASSED");
    Ok(())
}

/// Verify the annotations and input buckets exist
pub async fn storage(
    outputs: &BlueprintOutputs,
    gcloud: &GcloudRunner,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("🧪 Storage: annotation and input buckets");

    let annotations_bucket = outputs.get("vision_annotations_gcs")?;
    let doc = gcloud.describe_bucket(&annotations_bucket).await?;
    check!(assert_non_empty("annotations bucket", &doc));

    let input_bucket = outputs.get("vision_input_gcs")?;
    let doc = gcloud.describe_bucket(&input_bucket).await?;
    check!(assert_non_empty("input bucket", &doc));

    tracing::info!("✅ Storage: PASSED");
    Ok(())
}

/// Verify function state, trigger wiring, and source archives
pub async fn functions(
    outputs: &BlueprintOutputs,
    gcloud: &GcloudRunner,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("🧪 Functions: state, triggers, and source archives");

    let gcs_function = outputs.get("annotate_gcs_function_name")?;
    let http_function = outputs.get("annotate_http_function_name")?;

    let mut gcs_trigger_region = String::new();
    let mut http_region = String::new();

    let functions = gcloud.list_functions().await?;
    for function in functions.array()? {
        let state = function.string_at("state")?;
        if state != "ACTIVE" {
            return Err(format!("expected Cloud Function to be active, got '{}'", state).into());
        }

        let name = function.string_at("name")?;
        if name.contains(&format!("functions/{}", gcs_function)) {
            if let Some(trigger) = function.path("eventTrigger") {
                if !JsonDoc::from_value(trigger.clone()).is_empty() {
                    gcs_trigger_region = function.string_at("eventTrigger.triggerRegion")?;
                    tracing::info!("eventTrigger region: {}", gcs_trigger_region);
                }
            }
        }
        if name.contains(&format!("functions/{}", http_function)) {
            if let Some(region) = region_from_resource_name(&name) {
                http_region = region;
            }
        }
    }

    check!(assert_value_present("gcs function trigger region", &gcs_trigger_region));
    check!(assert_value_present("http function region", &http_region));

    // The event trigger must point at a live pub/sub topic
    let gcs_doc = gcloud
        .describe_function(&gcs_function, &gcs_trigger_region)
        .await?;
    let topic = gcs_doc.string_at("eventTrigger.pubsubTopic")?;
    let topic_doc = gcloud.describe_topic(&topic).await?;
    check!(assert_non_empty("event trigger topic", &topic_doc));

    // Both functions' source archives must exist in storage
    let http_doc = gcloud.describe_function(&http_function, &http_region).await?;
    for (label, doc) in [("http function", &http_doc), ("gcs function", &gcs_doc)] {
        check!(assert_field_present(
            label,
            doc,
            "buildConfig.source.storageSource.bucket"
        ));
        let bucket = doc.string_at("buildConfig.source.storageSource.bucket")?;
        let object = doc.string_at("buildConfig.source.storageSource.object")?;
        let source = gcloud.describe_storage_object(&bucket, &object).await?;
        check!(assert_non_empty(&format!("{} source archive", label), &source));
    }

    tracing::info!("✅ Functions: PASSED");
    Ok(())
}

static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"locations/([^/]+)/").expect("Failed to compile location pattern")
});

/// Extract the region segment from a function resource name
/// (`projects/{p}/locations/{region}/functions/{name}`)
fn region_from_resource_name(name: &str) -> Option<String> {
    LOCATION_RE
        .captures(name)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}
