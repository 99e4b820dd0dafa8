use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use reqwest::Client;
use serde_json::Value;

use super::error::{ClientError, ClientResult};

/// Machine translation into the configured target language.
pub trait Translator: Send + Sync {
    /// Translate `text`, auto-detecting its source language.
    fn translate(&self, text: String) -> BoxFuture<'static, ClientResult<String>>;
}

/// Returns every text untouched. Used when translation is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTranslator;

impl Translator for PassthroughTranslator {
    fn translate(&self, text: String) -> BoxFuture<'static, ClientResult<String>> {
        Box::pin(async move { Ok(text) })
    }
}

/// Client for the public Google Translate `translate_a/single` endpoint.
#[derive(Clone)]
pub struct GoogleTranslateClient {
    client: Client,
    base_url: Arc<str>,
    target_language: Arc<str>,
}

impl GoogleTranslateClient {
    /// Build a client translating into `target_language`, bounded by `timeout` per request.
    pub fn new(base_url: &str, target_language: &str, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ClientError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: Arc::from(base_url),
            target_language: Arc::from(target_language),
        })
    }

    async fn translate_text(&self, text: String) -> ClientResult<String> {
        if text.trim().is_empty() {
            return Ok(text);
        }

        let url = self.base_url.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", &*self.target_language),
                ("dt", "t"),
                ("q", text.as_str()),
            ])
            .send()
            .await
            .map_err(|source| ClientError::RequestSend {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(ClientError::RequestStatus {
                url,
                status: response.status(),
            });
        }

        let payload = response
            .json::<Value>()
            .await
            .map_err(|source| ClientError::DecodeResponse { url, source })?;

        parse_translation(&payload).ok_or(ClientError::MalformedTranslation { text })
    }
}

impl Translator for GoogleTranslateClient {
    fn translate(&self, text: String) -> BoxFuture<'static, ClientResult<String>> {
        let client = self.clone();
        Box::pin(async move { client.translate_text(text).await })
    }
}

/// Concatenate the translated segments of a `translate_a/single` payload.
///
/// The payload looks like `[[["Hola", "Hello", ...], ["mundo", "world", ...]], null, "en", ...]`.
fn parse_translation(payload: &Value) -> Option<String> {
    let translated: String = payload
        .get(0)?
        .as_array()?
        .iter()
        .filter_map(|segment| segment.get(0)?.as_str())
        .collect();

    (!translated.is_empty()).then_some(translated)
}
