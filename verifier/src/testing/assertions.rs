//! Assertion Framework
//!
//! High-level assertion helpers for scenario verification. Failures
//! carry a message and optional details; the `check!` macro turns a
//! failed result into a scenario error.

use reqwest::StatusCode;
use shared::AnnotateResponse;

use crate::runtime::JsonDoc;

#[derive(Debug, Clone)]
pub struct AssertionResult {
    pub success: bool,
    pub message: String,
    pub details: Option<String>,
}

impl AssertionResult {
    pub fn success(message: String) -> Self {
        Self {
            success: true,
            message,
            details: None,
        }
    }

    pub fn failure(message: String, details: Option<String>) -> Self {
        Self {
            success: false,
            message,
            details,
        }
    }
}

/// Assert that a described resource came back non-empty
pub fn assert_non_empty(label: &str, doc: &JsonDoc) -> AssertionResult {
    if doc.is_empty() {
        AssertionResult::failure(
            format!("{} should exist", label),
            Some("describe call returned an empty document".to_string()),
        )
    } else {
        AssertionResult::success(format!("{} exists", label))
    }
}

/// Assert an exact HTTP status
pub fn assert_status(label: &str, expected: StatusCode, actual: StatusCode) -> AssertionResult {
    if expected == actual {
        AssertionResult::success(format!("{} answered {}", label, actual))
    } else {
        AssertionResult::failure(
            format!("{} should answer {}", label, expected),
            Some(format!("got {}", actual)),
        )
    }
}

/// Assert that a string value is present and non-empty
pub fn assert_value_present(label: &str, value: &str) -> AssertionResult {
    if value.is_empty() {
        AssertionResult::failure(format!("{} should be present", label), None)
    } else {
        AssertionResult::success(format!("{}: {}", label, value))
    }
}

/// Assert that a dotted-path field exists and is non-empty
pub fn assert_field_present(label: &str, doc: &JsonDoc, path: &str) -> AssertionResult {
    match doc.path(path) {
        Some(value) if !JsonDoc::from_value(value.clone()).is_empty() => {
            AssertionResult::success(format!("{} has field '{}'", label, path))
        }
        _ => AssertionResult::failure(
            format!("{} should have field '{}'", label, path),
            Some("field missing or empty".to_string()),
        ),
    }
}

/// Assert that an annotation response carries text annotations
pub fn assert_text_annotations(label: &str, response: &AnnotateResponse) -> AssertionResult {
    if response.has_text_annotations() {
        AssertionResult::success(format!(
            "{} returned {} text annotation(s)",
            label,
            response.text_annotations.len()
        ))
    } else {
        AssertionResult::failure(
            format!("{} should return text annotations", label),
            Some("textAnnotations is missing or empty".to_string()),
        )
    }
}

/// Macro for cleaner assertion syntax in scenarios
#[macro_export]
macro_rules! check {
    ($assertion_result:expr) => {{
        let result = $assertion_result;
        if result.success {
            tracing::info!("✅ {}", result.message);
        } else {
            let details = result.details.as_deref().unwrap_or("No additional details");
            tracing::error!("❌ {} - {}", result.message, details);
            return Err(format!("Assertion failed: {} - {}", result.message, details).into());
        }
        result
    }};
}
