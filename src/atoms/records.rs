// ── Ambit Atoms: Persisted Records ─────────────────────────────────────────
// Per-user documents the engine loads at request start and upserts by
// natural key. Each carries a `version` counter for optimistic writes;
// the store bumps it on every successful update.
//
// Enum string forms are the storage representation — changing one is a
// schema migration, treat them as stable identifiers.

use serde::{Deserialize, Serialize};

use crate::atoms::constants::INITIAL_THRESHOLD;

// ── Small closed enums ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipType {
    Colleague,
    Client,
    Friend,
    Manager,
    Vendor,
    Unknown,
}

impl RelationshipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::Colleague => "colleague",
            RelationshipType::Client => "client",
            RelationshipType::Friend => "friend",
            RelationshipType::Manager => "manager",
            RelationshipType::Vendor => "vendor",
            RelationshipType::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> RelationshipType {
        match s {
            "colleague" => RelationshipType::Colleague,
            "client" => RelationshipType::Client,
            "friend" => RelationshipType::Friend,
            "manager" => RelationshipType::Manager,
            "vendor" => RelationshipType::Vendor,
            _ => RelationshipType::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Professional,
    Friendly,
    Direct,
    Warm,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Friendly => "friendly",
            Tone::Direct => "direct",
            Tone::Warm => "warm",
        }
    }

    pub fn parse(s: &str) -> Option<Tone> {
        match s {
            "professional" => Some(Tone::Professional),
            "friendly" => Some(Tone::Friendly),
            "direct" => Some(Tone::Direct),
            "warm" => Some(Tone::Warm),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WritingStyle {
    Concise,
    Detailed,
    Balanced,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSpeed {
    Immediate,
    Thoughtful,
    Mixed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CommunicationPreference {
    Formal,
    Casual,
    Adaptive,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DecisionMaking {
    Quick,
    Deliberate,
    Balanced,
}

// String forms for the storage layer. Kept as plain helpers rather than
// serde round-trips so the store never deals with quoted JSON strings.

macro_rules! enum_str {
    ($ty:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $ty::$variant => $label, )+
                }
            }

            pub fn parse_or(s: &str, default: $ty) -> $ty {
                match s {
                    $( $label => $ty::$variant, )+
                    _ => default,
                }
            }
        }
    };
}

enum_str!(WritingStyle { Concise => "concise", Detailed => "detailed", Balanced => "balanced" });
enum_str!(ResponseSpeed { Immediate => "immediate", Thoughtful => "thoughtful", Mixed => "mixed" });
enum_str!(CommunicationPreference { Formal => "formal", Casual => "casual", Adaptive => "adaptive" });
enum_str!(DecisionMaking { Quick => "quick", Deliberate => "deliberate", Balanced => "balanced" });

// ── Contact trust ──────────────────────────────────────────────────────────

/// Per-contact trust state, keyed by (user_id, contact_email).
/// Created on the first interaction batch, mutated on every subsequent one,
/// never deleted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactTrustRecord {
    pub user_id: String,
    pub contact_email: String,
    /// Derived reliability estimate in [0, 1].
    pub trust_score: f64,
    /// Size of the most recent analyzed interaction window.
    pub communication_frequency: u32,
    pub response_rate: f64,
    pub relationship: RelationshipType,
    /// RFC 3339 timestamp of the last analyzed interaction batch.
    pub last_interaction: String,
    /// Running success rate of auto-sends to this contact, in [0, 1].
    pub auto_send_success: f64,
    /// Tone this contact seems to respond best to, when we can tell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_tone: Option<Tone>,
    /// Optimistic-concurrency counter, managed by the store.
    #[serde(default)]
    pub version: i64,
}

impl ContactTrustRecord {
    pub fn new(user_id: impl Into<String>, contact_email: impl Into<String>) -> Self {
        ContactTrustRecord {
            user_id: user_id.into(),
            contact_email: contact_email.into(),
            trust_score: 0.5,
            communication_frequency: 0,
            response_rate: 0.0,
            relationship: RelationshipType::Unknown,
            last_interaction: String::new(),
            auto_send_success: 0.5,
            preferred_tone: None,
            version: 0,
        }
    }
}

// ── Personality profile ────────────────────────────────────────────────────

/// Inferred behavioral traits for one user. Created with defaults on first
/// use and mutated one field at a time — never wholesale replaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalityProfile {
    pub user_id: String,
    pub writing_style: WritingStyle,
    pub response_speed: ResponseSpeed,
    pub communication_preference: CommunicationPreference,
    pub tone_preference: Tone,
    pub decision_making: DecisionMaking,
    #[serde(default)]
    pub version: i64,
}

impl PersonalityProfile {
    pub fn new(user_id: impl Into<String>) -> Self {
        PersonalityProfile {
            user_id: user_id.into(),
            writing_style: WritingStyle::Balanced,
            response_speed: ResponseSpeed::Mixed,
            communication_preference: CommunicationPreference::Adaptive,
            tone_preference: Tone::Professional,
            decision_making: DecisionMaking::Balanced,
            version: 0,
        }
    }
}

// ── Auto-send metrics ──────────────────────────────────────────────────────

/// The threshold controller's persisted state, keyed by user_id.
/// Updated after every auto-send outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoSendMetrics {
    pub user_id: String,
    pub total_auto_sends: u32,
    pub successful_auto_sends: u32,
    pub canceled_auto_sends: u32,
    pub regretted_auto_sends: u32,
    pub average_confidence_at_send: f64,
    /// Self-tuning gate threshold, kept within [0.75, 0.95].
    pub optimal_confidence_threshold: f64,
    /// RFC 3339 timestamp of the last learning update.
    pub last_threshold_update: String,
    #[serde(default)]
    pub version: i64,
}

impl AutoSendMetrics {
    pub fn new(user_id: impl Into<String>) -> Self {
        AutoSendMetrics {
            user_id: user_id.into(),
            total_auto_sends: 0,
            successful_auto_sends: 0,
            canceled_auto_sends: 0,
            regretted_auto_sends: 0,
            average_confidence_at_send: INITIAL_THRESHOLD,
            optimal_confidence_threshold: INITIAL_THRESHOLD,
            last_threshold_update: String::new(),
            version: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_metrics_defaults() {
        let m = AutoSendMetrics::new("u1");
        assert_eq!(m.optimal_confidence_threshold, 0.85);
        assert_eq!(m.average_confidence_at_send, 0.85);
        assert_eq!(m.total_auto_sends, 0);
    }

    #[test]
    fn test_enum_storage_round_trip() {
        assert_eq!(RelationshipType::parse(RelationshipType::Client.as_str()), RelationshipType::Client);
        assert_eq!(Tone::parse("friendly"), Some(Tone::Friendly));
        assert_eq!(Tone::parse("sarcastic"), None);
        assert_eq!(DecisionMaking::parse_or("quick", DecisionMaking::Balanced), DecisionMaking::Quick);
        assert_eq!(DecisionMaking::parse_or("??", DecisionMaking::Balanced), DecisionMaking::Balanced);
    }
}
