use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

use crate::models::tutorial::Tutorial;

lazy_static! {
    static ref TAG_REGEX: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref WHITESPACE_REGEX: Regex = Regex::new(r"\s+").unwrap();
}

/// Typed so callers can tell an absent tutorial from a failing provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("tutorial {0} not found")]
    NotFound(String),
    #[error("content provider unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),
    #[error("content provider returned status {0}")]
    BadStatus(u16),
    #[error("content provider returned a malformed tutorial body")]
    Malformed,
}

#[async_trait]
pub trait ContentProvider: Send + Sync {
    async fn fetch_tutorial(&self, tutorial_id: &str) -> Result<Tutorial, ProviderError>;
}

pub struct HttpContentProvider {
    client: Client,
    base_url: String,
}

impl HttpContentProvider {
    pub fn new(base_url: String, timeout_seconds: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .unwrap_or_default();
        Self { client, base_url }
    }
}

#[async_trait]
impl ContentProvider for HttpContentProvider {
    async fn fetch_tutorial(&self, tutorial_id: &str) -> Result<Tutorial, ProviderError> {
        let url = format!("{}/tutorials/{}", self.base_url, tutorial_id);

        tracing::debug!("Fetching tutorial {} from content provider", tutorial_id);

        let response = self.client.get(&url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(ProviderError::NotFound(tutorial_id.to_string())),
            status if !status.is_success() => Err(ProviderError::BadStatus(status.as_u16())),
            _ => response
                .json::<Tutorial>()
                .await
                .map_err(|_| ProviderError::Malformed),
        }
    }
}

/// Strips markup from provider content before it reaches a prompt: tag
/// removal, entity decoding, whitespace collapsing.
pub fn clean_content(raw: &str) -> String {
    let without_tags = TAG_REGEX.replace_all(raw, " ");

    // &amp; must decode last so "&amp;lt;" cannot turn into a "<"
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");

    WHITESPACE_REGEX.replace_all(&decoded, " ").trim().to_string()
}
