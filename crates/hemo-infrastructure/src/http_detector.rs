//! HTTP binding of the detector port.
//!
//! Posts each image as multipart form data (`image` file part plus `mode`
//! text part carrying [`AnalysisMode::detector_mode`]) to `{base_url}/detect`
//! and expects a JSON body of the form
//! `{"counts": {"<label>": n, ...}, "annotated_image": "<base64 or data URI>"}`.

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hemo_core::config::AnalysisMode;
use hemo_core::{ClassCounts, Detection, Detector};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct DetectResponse {
    counts: BTreeMap<String, u64>,
    #[serde(default)]
    annotated_image: Option<String>,
}

/// Detector calling a remote inference service over HTTP.
#[derive(Clone)]
pub struct HttpDetector {
    client: Client,
    base_url: String,
    request_timeout: Duration,
}

impl HttpDetector {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Sets the transport-level timeout for one request.
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}/detect", self.base_url)
    }
}

#[async_trait]
impl Detector for HttpDetector {
    async fn detect(&self, image: &[u8], mode: &AnalysisMode) -> anyhow::Result<Detection> {
        let form = Form::new()
            .part("image", Part::bytes(image.to_vec()).file_name("image"))
            .text("mode", mode.detector_mode().to_string());

        let response = self
            .client
            .post(self.endpoint())
            .multipart(form)
            .timeout(self.request_timeout)
            .send()
            .await
            .context("Detector request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("Detector error ({}): {}", status, error_text));
        }

        let body = response
            .text()
            .await
            .context("Failed to read detector response")?;
        parse_detection(&body)
    }
}

/// Parses a detector response body into a [`Detection`].
///
/// Labels go through [`ClassCounts::from_labels`], so unknown labels are
/// rejected. The annotated image may be raw base64 or a `data:` URI; a
/// missing image yields empty bytes.
pub fn parse_detection(body: &str) -> anyhow::Result<Detection> {
    let response: DetectResponse =
        serde_json::from_str(body).context("Failed to parse detector response")?;

    let counts = ClassCounts::from_labels(response.counts)?;
    let annotated_image = match response.annotated_image.as_deref() {
        Some(encoded) => decode_image(encoded)?,
        None => Vec::new(),
    };

    Ok(Detection {
        counts,
        annotated_image,
    })
}

fn decode_image(encoded: &str) -> anyhow::Result<Vec<u8>> {
    let payload = match encoded.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => encoded,
    };
    STANDARD
        .decode(payload.trim())
        .context("Annotated image is not valid base64")
}
