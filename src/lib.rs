// Ambit Engine — adaptive decision core for the Ambit assistant.
//
// What lives here: intent classification with a resilient local fallback,
// a per-contact trust ledger, a self-tuning auto-send gate, bounded
// suggestion generation with cross-module routing, and the outcome log
// that feeds all of the learning loops.
//
// What does not: rendering, auth, audio, calendar mechanics, and prompt
// text generation all belong to the host application. The engine sees
// them only as fields on `DecisionContext` and `SuggestionResponse`.

pub mod atoms;
pub mod engine;

pub use atoms::error::{EngineError, EngineResult};
pub use atoms::records::{
    AutoSendMetrics, CommunicationPreference, ContactTrustRecord, DecisionMaking,
    PersonalityProfile, RelationshipType, ResponseSpeed, Tone, WritingStyle,
};
pub use atoms::types::{
    ActionSuggestion, AutoSendOffer, ClassifierTier, ContactInteraction, DecisionContext,
    ExtractedEntities, Intent, IntentClassification, InteractionOutcome, OutcomeKind,
    OutcomeVerdict, Sentiment, SuggestionCategory, SuggestionResponse, ThreadInfo,
};
pub use engine::config::{EngineConfig, ProviderConfig};
pub use engine::pipeline::DecisionEngine;
pub use engine::store::ProfileStore;
