// Ambit Engine — Configuration
// Engine construction parameters. No process-wide singletons: the host
// builds one `EngineConfig`, hands it to `DecisionEngine::new`, and all
// per-request state is loaded from the store at call time.

use serde::{Deserialize, Serialize};

/// Credentials and endpoint for the classification provider.
/// Absent entirely when the deployment has no provider — the engine then
/// runs on its local fallback tier alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// OpenAI-compatible API root, e.g. "https://api.openai.com/v1".
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub provider: Option<ProviderConfig>,
    /// Budget for one provider classification call before the keyword tier
    /// takes over.
    #[serde(default = "default_classify_timeout_ms")]
    pub classify_timeout_ms: u64,
    /// Overall deadline for one `suggest` call. On expiry, remaining
    /// external calls are skipped and local-only results returned.
    #[serde(default = "default_request_deadline_ms")]
    pub request_deadline_ms: u64,
    /// How many times an optimistic write is retried after losing a
    /// version race before the update is dropped.
    #[serde(default = "default_store_write_retries")]
    pub store_write_retries: u32,
}

fn default_classify_timeout_ms() -> u64 { 4_000 }
fn default_request_deadline_ms() -> u64 { 10_000 }
fn default_store_write_retries() -> u32 { 3 }

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            provider: None,
            classify_timeout_ms: default_classify_timeout_ms(),
            request_deadline_ms: default_request_deadline_ms(),
            store_write_retries: default_store_write_retries(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_have_no_provider() {
        let c = EngineConfig::default();
        assert!(c.provider.is_none());
        assert!(c.classify_timeout_ms > 0);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let c: EngineConfig = serde_json::from_str(r#"{"request_deadline_ms": 2500}"#).unwrap();
        assert_eq!(c.request_deadline_ms, 2500);
        assert_eq!(c.store_write_retries, 3);
    }
}
