// ── Ambit Atoms: Pure Data Types ───────────────────────────────────────────
// All plain struct/enum definitions for request/response traffic.
// Atoms layer rule: no I/O, no side effects, no imports from engine/.
//
// Persisted per-user documents (trust, personality, auto-send metrics) live
// in atoms/records.rs; everything here is ephemeral per request.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Intents ────────────────────────────────────────────────────────────────

/// Closed set of actions the user's text can ask for.
/// Unknown labels from the provider tier map to `Assistance`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Reply,
    Compose,
    Summarize,
    Schedule,
    Translate,
    Template,
    Search,
    Assistance,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Reply => "reply",
            Intent::Compose => "compose",
            Intent::Summarize => "summarize",
            Intent::Schedule => "schedule",
            Intent::Translate => "translate",
            Intent::Template => "template",
            Intent::Search => "search",
            Intent::Assistance => "assistance",
        }
    }

    /// Parse a label leniently; anything unrecognized is `Assistance`.
    pub fn parse(label: &str) -> Intent {
        match label.trim().to_lowercase().as_str() {
            "reply" => Intent::Reply,
            "compose" | "write" | "draft" => Intent::Compose,
            "summarize" | "summary" => Intent::Summarize,
            "schedule" | "calendar" | "meeting" => Intent::Schedule,
            "translate" => Intent::Translate,
            "template" => Intent::Template,
            "search" | "find" => Intent::Search,
            _ => Intent::Assistance,
        }
    }
}

/// Which tier of the classifier chain produced a result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierTier {
    Provider,
    Fallback,
}

/// Result of one classification call. Produced fresh per call; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentClassification {
    pub intent: Intent,
    /// Always within [0, 1]; the provider tier additionally caps at 0.95.
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondary: Vec<Intent>,
    #[serde(default)]
    pub reasoning: String,
    pub tier: ClassifierTier,
}

// ── Sentiment ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

// ── Request context ────────────────────────────────────────────────────────

/// Entities the caller extracted from the conversation upstream.
/// All fields optional — absence just disables the signals that need them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedEntities {
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub urgent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
}

/// Conversation-thread metadata supplied by the mail module.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadInfo {
    #[serde(default)]
    pub depth: u32,
    /// A generated draft already exists for this thread.
    #[serde(default)]
    pub has_draft: bool,
    #[serde(default)]
    pub reply_options: Vec<String>,
}

/// Everything the engine needs for one request. Loaded state (profile,
/// trust, metrics) is NOT part of this — the engine fetches it per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionContext {
    pub user_id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<ExtractedEntities>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread: Option<ThreadInfo>,
}

impl DecisionContext {
    pub fn new(user_id: impl Into<String>, text: impl Into<String>) -> Self {
        DecisionContext {
            user_id: user_id.into(),
            text: text.into(),
            contact_email: None,
            entities: None,
            thread: None,
        }
    }
}

// ── Interaction history (trust ledger input) ───────────────────────────────

/// One historical exchange with a contact, as reported by the mail module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactInteraction {
    pub sent: u32,
    pub received: u32,
    pub response_time_seconds: f64,
    pub sentiment: Sentiment,
}

// ── Suggestions ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionCategory {
    Primary,
    Secondary,
    Contextual,
    CrossModule,
}

impl SuggestionCategory {
    /// Ranking weight: higher sorts first.
    pub fn priority(&self) -> u8 {
        match self {
            SuggestionCategory::Primary => 4,
            SuggestionCategory::Secondary => 3,
            SuggestionCategory::Contextual => 2,
            SuggestionCategory::CrossModule => 1,
        }
    }
}

/// A candidate next action offered to the caller. Ephemeral — generated per
/// request, never persisted. `id` is unique within one ranked list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSuggestion {
    pub id: String,
    pub label: String,
    pub category: SuggestionCategory,
    pub confidence: f64,
    /// Machine-readable action name the host dispatches on.
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_confirmation: Option<bool>,
}

/// Emitted when the auto-send gate fires: the host may send without explicit
/// confirmation after the countdown elapses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoSendOffer {
    pub confidence: f64,
    pub countdown_seconds: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_hint: Option<String>,
}

/// The engine's answer to one request. Never an error — worst case is a
/// lower-quality suggestion set with no auto-send block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionResponse {
    pub suggestions: Vec<ActionSuggestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_action: Option<ActionSuggestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_send: Option<AutoSendOffer>,
    #[serde(default)]
    pub contextual_hints: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
}

// ── Interaction outcomes ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    AutoSend,
    Suggestion,
    TemplateUse,
    Manual,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::AutoSend => "auto_send",
            OutcomeKind::Suggestion => "suggestion",
            OutcomeKind::TemplateUse => "template_use",
            OutcomeKind::Manual => "manual",
        }
    }

    pub fn parse(s: &str) -> OutcomeKind {
        match s {
            "auto_send" => OutcomeKind::AutoSend,
            "suggestion" => OutcomeKind::Suggestion,
            "template_use" => OutcomeKind::TemplateUse,
            _ => OutcomeKind::Manual,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeVerdict {
    Success,
    Modified,
    Canceled,
    Regretted,
}

impl OutcomeVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeVerdict::Success => "success",
            OutcomeVerdict::Modified => "modified",
            OutcomeVerdict::Canceled => "canceled",
            OutcomeVerdict::Regretted => "regretted",
        }
    }

    pub fn parse(s: &str) -> OutcomeVerdict {
        match s {
            "success" => OutcomeVerdict::Success,
            "modified" => OutcomeVerdict::Modified,
            "canceled" => OutcomeVerdict::Canceled,
            "regretted" => OutcomeVerdict::Regretted,
            _ => OutcomeVerdict::Modified,
        }
    }
}

/// Write-once event describing what actually happened to a suggestion,
/// auto-send, or template. Duplicate events count twice on purpose —
/// the log is event-sourced, not an idempotent upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionOutcome {
    pub user_id: String,
    pub kind: OutcomeKind,
    /// The user-visible text involved (draft body, reply text, …).
    #[serde(default)]
    pub content: String,
    /// Milliseconds between the offer being shown and the user acting on it.
    #[serde(default)]
    pub timing_ms: u64,
    pub verdict: OutcomeVerdict,
    /// Kind-specific payload: `confidence` and `contact_email` for auto-send,
    /// `template_id` for template use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

// ── Shared numeric helpers ─────────────────────────────────────────────────

/// Clamp a probability-like value into [0, 1]. Applied at every write of
/// every score/confidence field.
pub fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_parse_lenient() {
        assert_eq!(Intent::parse("Reply"), Intent::Reply);
        assert_eq!(Intent::parse("calendar"), Intent::Schedule);
        assert_eq!(Intent::parse("no-such-label"), Intent::Assistance);
    }

    #[test]
    fn test_category_priority_order() {
        assert!(SuggestionCategory::Primary.priority() > SuggestionCategory::Secondary.priority());
        assert!(SuggestionCategory::Secondary.priority() > SuggestionCategory::Contextual.priority());
        assert!(
            SuggestionCategory::Contextual.priority() > SuggestionCategory::CrossModule.priority()
        );
    }

    #[test]
    fn test_clamp01() {
        assert_eq!(clamp01(-0.2), 0.0);
        assert_eq!(clamp01(0.5), 0.5);
        assert_eq!(clamp01(1.7), 1.0);
    }
}
