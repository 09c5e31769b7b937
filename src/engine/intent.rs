// Ambit Engine — Intent Classification
// Turns free text into an intent label + confidence. Structured as an
// ordered chain of strategies tried until one succeeds:
//
//   1. Provider tier — constrained JSON prompt to the configured LLM
//   2. Keyword tier  — weighted regex table, fully local, always available
//
// `classify` never raises: with no provider configured (or every remote
// tier failing) the keyword tier still produces a usable answer.

use crate::atoms::constants::{FALLBACK_DEFAULT_CONFIDENCE, PROVIDER_CONFIDENCE_CEILING};
use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::types::{ClassifierTier, DecisionContext, Intent, IntentClassification};
use crate::engine::config::EngineConfig;
use crate::engine::provider::ProviderClient;
use async_trait::async_trait;
use log::{debug, warn};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;

// Remote tiers are skipped outright when less than this much of the
// request deadline remains.
const MIN_REMOTE_BUDGET_MS: u64 = 250;

// ── Strategy seam ──────────────────────────────────────────────────────────

/// One tier of the classification chain. Uniform result type; tiers are
/// tried in order until one returns Ok.
#[async_trait]
pub trait ClassifyStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Capability check — a tier without credentials reports false and is
    /// skipped without being counted as a failure.
    fn available(&self) -> bool {
        true
    }

    async fn classify(
        &self,
        ctx: &DecisionContext,
        budget: Option<Duration>,
    ) -> EngineResult<IntentClassification>;
}

// ── Chain ──────────────────────────────────────────────────────────────────

pub struct IntentClassifier {
    strategies: Vec<Box<dyn ClassifyStrategy>>,
}

impl IntentClassifier {
    /// Build the standard chain from config: provider tier when credentials
    /// exist, keyword tier always.
    pub fn from_config(config: &EngineConfig) -> Self {
        let mut strategies: Vec<Box<dyn ClassifyStrategy>> = Vec::new();
        if let Some(pc) = &config.provider {
            strategies.push(Box::new(ProviderStrategy {
                client: ProviderClient::new(pc),
                timeout_ms: config.classify_timeout_ms,
            }));
        }
        strategies.push(Box::new(KeywordStrategy));
        IntentClassifier { strategies }
    }

    /// Keyword tier only — what a deployment without provider credentials
    /// runs on.
    pub fn fallback_only() -> Self {
        IntentClassifier { strategies: vec![Box::new(KeywordStrategy)] }
    }

    /// Classify the request text. Total: always returns a classification,
    /// whatever the tiers do. `budget` is the remaining request deadline.
    pub async fn classify(
        &self,
        ctx: &DecisionContext,
        budget: Option<Duration>,
    ) -> IntentClassification {
        for strategy in &self.strategies {
            if !strategy.available() {
                continue;
            }
            match strategy.classify(ctx, budget).await {
                Ok(c) => {
                    debug!(
                        "[intent] {} tier: {} ({:.2})",
                        strategy.name(),
                        c.intent.as_str(),
                        c.confidence
                    );
                    return c;
                }
                Err(e) => {
                    warn!("[intent] {} tier failed: {} — trying next", strategy.name(), e);
                }
            }
        }
        // The keyword tier is infallible, so this is only reachable with a
        // hand-built empty chain.
        default_classification("no classifier tier produced a result")
    }
}

fn default_classification(reasoning: &str) -> IntentClassification {
    IntentClassification {
        intent: Intent::Assistance,
        confidence: FALLBACK_DEFAULT_CONFIDENCE,
        secondary: Vec::new(),
        reasoning: reasoning.to_string(),
        tier: ClassifierTier::Fallback,
    }
}

// ── Provider tier ──────────────────────────────────────────────────────────

struct ProviderStrategy {
    client: ProviderClient,
    timeout_ms: u64,
}

const CLASSIFY_SYSTEM_PROMPT: &str = "You classify what an email assistant user is asking for. \
Respond with ONLY a JSON object, no prose: \
{\"intent\": one of [\"reply\",\"compose\",\"summarize\",\"schedule\",\"translate\",\"template\",\"search\",\"assistance\"], \
\"confidence\": number 0-1, \"secondary\": array of other plausible intents, \
\"reasoning\": one short sentence}";

#[async_trait]
impl ClassifyStrategy for ProviderStrategy {
    fn name(&self) -> &'static str {
        "provider"
    }

    async fn classify(
        &self,
        ctx: &DecisionContext,
        budget: Option<Duration>,
    ) -> EngineResult<IntentClassification> {
        let mut timeout = Duration::from_millis(self.timeout_ms);
        if let Some(b) = budget {
            if b < Duration::from_millis(MIN_REMOTE_BUDGET_MS) {
                return Err(EngineError::provider(
                    self.client.model(),
                    "request deadline too close — skipping remote tier",
                ));
            }
            timeout = timeout.min(b);
        }

        let user_prompt = build_user_prompt(ctx);
        let raw = tokio::time::timeout(timeout, self.client.complete(CLASSIFY_SYSTEM_PROMPT, &user_prompt, 200))
            .await
            .map_err(|_| EngineError::provider(self.client.model(), "classification timed out"))??;

        parse_provider_verdict(&raw)
    }
}

fn build_user_prompt(ctx: &DecisionContext) -> String {
    let mut prompt = format!("User text:\n{}", ctx.text);
    if let Some(entities) = &ctx.entities {
        if !entities.topics.is_empty() {
            prompt.push_str(&format!("\nTopics: {}", entities.topics.join(", ")));
        }
        if entities.urgent {
            prompt.push_str("\nThe thread is flagged urgent.");
        }
    }
    if let Some(thread) = &ctx.thread {
        if thread.depth > 0 {
            prompt.push_str(&format!("\nThread depth: {} messages.", thread.depth));
        }
    }
    prompt
}

#[derive(Deserialize)]
struct ProviderVerdict {
    intent: String,
    confidence: f64,
    #[serde(default)]
    secondary: Vec<String>,
    #[serde(default)]
    reasoning: String,
}

/// Parse the model's answer. Lenient about surrounding prose: the first
/// `{…}` block is taken. Malformed output fails the tier, not the call.
fn parse_provider_verdict(raw: &str) -> EngineResult<IntentClassification> {
    let start = raw.find('{');
    let end = raw.rfind('}');
    let json = match (start, end) {
        (Some(s), Some(e)) if e > s => &raw[s..=e],
        _ => {
            return Err(EngineError::provider("classifier", "no JSON object in response"));
        }
    };

    let verdict: ProviderVerdict = serde_json::from_str(json)
        .map_err(|e| EngineError::provider("classifier", format!("malformed verdict: {e}")))?;

    let intent = Intent::parse(&verdict.intent);
    let mut secondary: Vec<Intent> =
        verdict.secondary.iter().map(|s| Intent::parse(s)).filter(|i| *i != intent).collect();
    secondary.dedup();
    secondary.truncate(2);

    Ok(IntentClassification {
        intent,
        // Never claim certainty above the ceiling, whatever the model says.
        confidence: verdict.confidence.clamp(0.0, PROVIDER_CONFIDENCE_CEILING),
        secondary,
        reasoning: verdict.reasoning,
        tier: ClassifierTier::Provider,
    })
}

// ── Keyword tier ───────────────────────────────────────────────────────────

struct KeywordStrategy;

struct IntentRule {
    intent: Intent,
    pattern: Regex,
    weight: f64,
}

fn rule(intent: Intent, pattern: &str, weight: f64) -> IntentRule {
    // Patterns are compile-time literals; a failure here is a programmer
    // error caught by the table test below.
    IntentRule { intent, pattern: Regex::new(pattern).expect("intent rule pattern"), weight }
}

static INTENT_RULES: LazyLock<Vec<IntentRule>> = LazyLock::new(|| {
    vec![
        rule(Intent::Reply, r"\b(reply|respond|answer|write back|get back to)\b", 0.9),
        rule(Intent::Reply, r"\bfollow[ -]?up\b", 0.7),
        rule(Intent::Compose, r"\b(compose|draft|write)\b.*\b(email|message|mail|note)\b", 0.85),
        rule(Intent::Compose, r"\bsend (an?|the) (email|message)\b", 0.8),
        rule(Intent::Summarize, r"\b(summari[sz]e|summary|tl;?dr|recap|digest)\b", 0.9),
        rule(
            Intent::Schedule,
            r"\b(schedule|meeting|calendar|appointment|reschedule|availability)\b",
            0.85,
        ),
        rule(Intent::Schedule, r"\b(find|propose|suggest) (a |some )?times?\b", 0.75),
        rule(Intent::Translate, r"\btranslat(e|ion|ing)\b", 0.9),
        rule(Intent::Template, r"\b(template|boilerplate|canned (reply|response))\b", 0.8),
        rule(Intent::Search, r"\b(search|look (up|for)|locate|where is)\b", 0.65),
        rule(Intent::Search, r"\bfind\b", 0.6),
        rule(Intent::Assistance, r"\b(help|assist|organi[sz]e|clean ?up)\b", 0.6),
    ]
});

/// Local deterministic classification: evaluate the whole table against the
/// lower-cased input and keep the highest-weight match.
pub fn classify_local(text: &str) -> IntentClassification {
    let t = text.to_lowercase();

    let mut best: Option<&IntentRule> = None;
    let mut matched: Vec<(Intent, f64)> = Vec::new();
    for r in INTENT_RULES.iter() {
        if r.pattern.is_match(&t) {
            if !matched.iter().any(|(i, _)| *i == r.intent) {
                matched.push((r.intent, r.weight));
            }
            if best.map(|b| r.weight > b.weight).unwrap_or(true) {
                best = Some(r);
            }
        }
    }

    match best {
        Some(r) => {
            let mut secondary: Vec<Intent> = matched
                .iter()
                .filter(|(i, _)| *i != r.intent)
                .map(|(i, _)| *i)
                .collect();
            secondary.truncate(2);
            IntentClassification {
                intent: r.intent,
                confidence: r.weight,
                secondary,
                reasoning: format!("matched local pattern for '{}'", r.intent.as_str()),
                tier: ClassifierTier::Fallback,
            }
        }
        None => default_classification("no local pattern matched"),
    }
}

#[async_trait]
impl ClassifyStrategy for KeywordStrategy {
    fn name(&self) -> &'static str {
        "keyword"
    }

    async fn classify(
        &self,
        ctx: &DecisionContext,
        _budget: Option<Duration>,
    ) -> EngineResult<IntentClassification> {
        Ok(classify_local(&ctx.text))
    }
}
