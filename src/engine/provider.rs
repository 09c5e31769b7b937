// Ambit Engine — Classification Provider Client
// Direct HTTP calls to an OpenAI-compatible chat-completions API.
// Non-streaming: intent classification wants one small JSON answer,
// not a token stream.

use crate::atoms::error::{EngineError, EngineResult};
use crate::engine::config::ProviderConfig;
use log::warn;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// Retry configuration for transient API errors.
const MAX_RETRIES: u32 = 3;
const INITIAL_RETRY_DELAY_MS: u64 = 500;

/// Check if an HTTP status code should be retried.
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 529)
}

/// Sleep with exponential backoff.
async fn retry_delay(attempt: u32) {
    let delay = Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
    tokio::time::sleep(delay).await;
}

pub struct ProviderClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ProviderClient {
    pub fn new(config: &ProviderConfig) -> Self {
        ProviderClient {
            client: Client::builder()
                .connect_timeout(Duration::from_secs(5))
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One non-streaming completion: system + user message in, the
    /// assistant's text out. Retries transient failures with backoff.
    pub async fn complete(&self, system: &str, user: &str, max_tokens: u32) -> EngineResult<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "max_tokens": max_tokens,
            "temperature": 0.0,
        });

        let mut attempt = 0;
        loop {
            let result = self
                .client
                .post(&url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&body)
                .send()
                .await;

            match result {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if status == 200 {
                        let v: Value = resp.json().await?;
                        let content = v["choices"][0]["message"]["content"]
                            .as_str()
                            .map(|s| s.to_string());
                        return content.ok_or_else(|| {
                            EngineError::provider(&self.model, "response missing message content")
                        });
                    }
                    if is_retryable_status(status) && attempt < MAX_RETRIES {
                        warn!(
                            "[provider] {} returned {} — retry {}/{}",
                            self.model,
                            status,
                            attempt + 1,
                            MAX_RETRIES
                        );
                        retry_delay(attempt).await;
                        attempt += 1;
                        continue;
                    }
                    let detail = resp.text().await.unwrap_or_default();
                    return Err(EngineError::provider(
                        &self.model,
                        format!("HTTP {}: {}", status, truncate(&detail, 200)),
                    ));
                }
                Err(e) if attempt < MAX_RETRIES => {
                    warn!(
                        "[provider] request failed ({}) — retry {}/{}",
                        e,
                        attempt + 1,
                        MAX_RETRIES
                    );
                    retry_delay(attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(429));
        assert!(is_retryable_status(503));
        assert!(is_retryable_status(529));
        assert!(!is_retryable_status(400));
        assert!(!is_retryable_status(401));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("héllo wörld", 4), "héll");
    }

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let c = ProviderClient::new(&ProviderConfig {
            base_url: "https://api.example.com/v1/".into(),
            api_key: "k".into(),
            model: "m".into(),
        });
        assert_eq!(c.base_url, "https://api.example.com/v1");
    }
}
