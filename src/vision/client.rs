use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

use super::types::DetectionSample;

/// Network-level ceiling for one inference round trip. The worker degrades
/// to the last known status past this, it never waits longer.
const INFERENCE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("classifier transport: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("classifier returned {0}")]
    Status(reqwest::StatusCode),
}

/// Frame-in/struct-out channel to the inference backend: one JPEG-encoded
/// frame up, one `DetectionSample` back.
#[derive(Clone)]
pub struct ClassifierClient {
    client: Client,
    url: String,
}

impl ClassifierClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(INFERENCE_TIMEOUT)
                .build()
                .unwrap_or_default(),
            url: url.into(),
        }
    }

    pub async fn classify(&self, jpeg: Vec<u8>) -> Result<DetectionSample, ClassifyError> {
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "image/jpeg")
            .body(jpeg)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClassifyError::Status(response.status()));
        }

        Ok(response.json::<DetectionSample>().await?)
    }
}
