//! Translation client: the single point of entry for outbound translation calls.
//!
//! No other module may call the translation endpoint directly. The normalizer
//! holds an `Arc<dyn Translator>` so tests and deployments can swap backends.
//!
//! One attempt per call, no retries. Callers decide what a failure means.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

const TRANSLATE_PATH: &str = "/translate_a/single";

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Translation API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected translation payload: {0}")]
    Parse(String),

    #[error("Translation returned empty text")]
    EmptyTranslation,

    #[error("Translation is disabled")]
    Disabled,
}

/// Translates text between two ISO 639-1 language codes.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source: &str, target: &str)
        -> Result<String, TranslateError>;
}

/// Client for the public Google Translate `translate_a/single` endpoint.
#[derive(Clone)]
pub struct GoogleTranslateClient {
    client: Client,
    base_url: String,
}

impl GoogleTranslateClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TranslateError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Translator for GoogleTranslateClient {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslateError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, TRANSLATE_PATH))
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslateError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let payload: Value = response.json().await?;
        let translated = extract_translation(&payload)?;

        debug!(
            "Translated {} chars ({source}->{target}) into {} chars",
            text.chars().count(),
            translated.chars().count()
        );

        Ok(translated)
    }
}

/// Backend used when translation is switched off. Always fails, so the
/// normalizer falls back to the original text.
pub struct DisabledTranslator;

#[async_trait]
impl Translator for DisabledTranslator {
    async fn translate(&self, _: &str, _: &str, _: &str) -> Result<String, TranslateError> {
        Err(TranslateError::Disabled)
    }
}

/// Pulls the translated sentence fragments out of the nested-array payload:
/// `[[["translated", "original", ...], ...], ...]`.
fn extract_translation(payload: &Value) -> Result<String, TranslateError> {
    let segments = payload
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslateError::Parse("missing segment list".to_string()))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.trim().is_empty() {
        return Err(TranslateError::EmptyTranslation);
    }
    Ok(translated)
}
