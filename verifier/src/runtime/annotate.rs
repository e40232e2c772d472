//! Annotate Endpoint Client
//!
//! HTTP client for the deployed annotation service under test. Each
//! client owns an independent reqwest instance; requests are safe to
//! repeat, which the serving probe relies on.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::multipart::Form;
use serde_json::Value;
use shared::{AnnotateForm, AnnotateResponse, VerifyError, VerifyResult, VqaRequest};

use super::poller::{PollBudget, ProbeStatus, poll};

/// Client for `POST {base}/annotate`
#[derive(Clone)]
pub struct AnnotateClient {
    base_url: String,
    client: reqwest::Client,
}

/// Status and body of one annotate call
#[derive(Debug)]
pub struct AnnotateReply {
    pub status: StatusCode,
    pub body: String,
}

impl AnnotateReply {
    /// Parse the body as arbitrary JSON
    pub fn json(&self) -> VerifyResult<Value> {
        serde_json::from_str(&self.body).map_err(|e| VerifyError::JsonError {
            message: e.to_string(),
        })
    }

    /// Parse the body as an annotation response
    pub fn annotation(&self) -> VerifyResult<AnnotateResponse> {
        AnnotateResponse::from_json(&self.body)
    }
}

impl AnnotateClient {
    /// Create a new client for the given endpoint base URL
    pub fn new(base_addr: &str) -> Self {
        let base_url = if base_addr.starts_with("http") {
            base_addr.to_string()
        } else {
            format!("http://{}", base_addr)
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { base_url, client }
    }

    /// The annotate operation URL
    pub fn annotate_url(&self) -> String {
        format!("{}/annotate", self.base_url.trim_end_matches('/'))
    }

    /// POST a multipart form with `image_uri` and repeated `features` fields
    pub async fn annotate_uri(&self, form: &AnnotateForm) -> VerifyResult<AnnotateReply> {
        self.send(
            self.client
                .post(self.annotate_url())
                .multipart(build_multipart(form)),
        )
        .await
    }

    /// POST the JSON question-answering variant
    pub async fn annotate_vqa(&self, request: &VqaRequest) -> VerifyResult<AnnotateReply> {
        self.send(self.client.post(self.annotate_url()).json(request))
            .await
    }

    /// PUT the same form; the endpoint only implements POST and GET
    pub async fn put_annotate(&self, form: &AnnotateForm) -> VerifyResult<AnnotateReply> {
        self.send(
            self.client
                .put(self.annotate_url())
                .multipart(build_multipart(form)),
        )
        .await
    }

    /// Poll until the endpoint answers the given request with 200.
    ///
    /// A network error or any non-200 status counts as not ready; the
    /// request is repeated up to the budget, so it must be safe to
    /// re-post.
    pub async fn wait_until_serving(&self, form: &AnnotateForm, budget: PollBudget) {
        tracing::info!("⏳ Waiting for annotate endpoint: {}", self.annotate_url());

        poll(
            || {
                let client = self;
                let form = form.clone();
                async move {
                    match client.annotate_uri(&form).await {
                        Ok(reply) if reply.status == StatusCode::OK => Ok(ProbeStatus::Ready),
                        Ok(reply) => {
                            tracing::debug!("Endpoint answered {} while warming up", reply.status);
                            Ok(ProbeStatus::Retry)
                        }
                        Err(e) => Err(e),
                    }
                }
            },
            budget,
        )
        .await;
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> VerifyResult<AnnotateReply> {
        let url = self.annotate_url();
        let response = request.send().await.map_err(|e| VerifyError::HttpError {
            url: url.clone(),
            message: e.to_string(),
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| VerifyError::HttpError {
            url,
            message: e.to_string(),
        })?;
        Ok(AnnotateReply { status, body })
    }
}

/// Encode the form as multipart: one `image_uri` part when present,
/// one `features` part per requested feature.
fn build_multipart(form: &AnnotateForm) -> Form {
    let mut multipart = Form::new();
    if let Some(ref image_uri) = form.image_uri {
        multipart = multipart.text("image_uri", image_uri.clone());
    }
    for feature in &form.features {
        multipart = multipart.text("features", feature.clone());
    }
    multipart
}
