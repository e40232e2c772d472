//! Request and response payloads for the annotate endpoint

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{VerifyError, VerifyResult};

/// Feature names requested by the smoke scenario.
pub const SMOKE_FEATURES: [&str; 5] = [
    "FACE_DETECTION",
    "OBJECT_LOCALIZATION",
    "IMAGE_PROPERTIES",
    "LABEL_DETECTION",
    "SAFE_SEARCH_DETECTION",
];

/// Multipart form payload for `POST {base}/annotate`.
///
/// `image_uri` is optional so scenarios can deliberately omit it and
/// assert the endpoint's 412 response. `features` is sent as repeated
/// form fields, one per entry.
#[derive(Debug, Clone)]
pub struct AnnotateForm {
    pub image_uri: Option<String>,
    pub features: Vec<String>,
}

impl AnnotateForm {
    /// Form referencing an image by URI with the given feature names
    pub fn with_image(image_uri: &str, features: Vec<String>) -> Self {
        Self {
            image_uri: Some(image_uri.to_string()),
            features,
        }
    }

    /// Form with no image reference (precondition-failure scenarios)
    pub fn without_image(features: Vec<String>) -> Self {
        Self {
            image_uri: None,
            features,
        }
    }

    /// The canonical smoke-test feature set
    pub fn smoke_features() -> Vec<String> {
        SMOKE_FEATURES.iter().map(|f| f.to_string()).collect()
    }
}

/// JSON payload for the question-answering variant of the endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VqaRequest {
    pub vision_api_method: String,
    pub vqa_question: String,
    pub vqa_num_results: u32,
    pub image_bucket: String,
    pub image_file: String,
}

/// Typed view over an annotation response body.
///
/// Only the fields the scenarios assert on are modelled; the rest of
/// the annotation result stays as raw JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct AnnotateResponse {
    #[serde(rename = "textAnnotations", default)]
    pub text_annotations: Vec<Value>,
}

impl AnnotateResponse {
    /// Parse a response body, failing on malformed JSON
    pub fn from_json(body: &str) -> VerifyResult<Self> {
        serde_json::from_str(body).map_err(|e| VerifyError::JsonError {
            message: e.to_string(),
        })
    }

    /// True when the response carries at least one text annotation
    pub fn has_text_annotations(&self) -> bool {
        !self.text_annotations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text_annotations_from_response_body() {
        let body = r#"{"textAnnotations": [{"description": "HELLO", "locale": "en"}]}"#;
        let response = AnnotateResponse::from_json(body).unwrap();
        assert!(response.has_text_annotations());
        assert_eq!(response.text_annotations.len(), 1);
    }

    #[test]
    fn missing_text_annotations_field_is_empty_not_an_error() {
        let response = AnnotateResponse::from_json(r#"{"labelAnnotations": []}"#).unwrap();
        assert!(!response.has_text_annotations());
    }

    #[test]
    fn malformed_body_is_a_json_error() {
        let result = AnnotateResponse::from_json("not json");
        assert!(matches!(result, Err(VerifyError::JsonError { .. })));
    }

    #[test]
    fn vqa_request_serializes_expected_field_names() {
        let request = VqaRequest {
            vision_api_method: "VQA".to_string(),
            vqa_question: "What is in this image?".to_string(),
            vqa_num_results: 3,
            image_bucket: "gs://input-bucket".to_string(),
            image_file: "TestImage.jpg".to_string(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["vision_api_method"], "VQA");
        assert_eq!(value["vqa_num_results"], 3);
        assert_eq!(value["image_file"], "TestImage.jpg");
    }

    #[test]
    fn smoke_form_carries_five_features() {
        let form = AnnotateForm::with_image("https://example.com/a.jpg", AnnotateForm::smoke_features());
        assert_eq!(form.features.len(), 5);
        assert!(form.image_uri.is_some());
    }
}
