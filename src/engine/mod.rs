// ── Ambit Engine Module ────────────────────────────────────────────────────
//
// The adaptive decision core behind Ambit's assistant modules.
//
// Request flow:
//   DecisionContext → intent (provider tier, then local keyword tier)
//                   → suggestions (core / contextual / personalized / cross-module)
//                   → auto-send gate (self-tuning threshold controller)
//   InteractionOutcome → outcome log → personality / trust / controller updates
//
// Sub-modules:
//   - config:       engine construction parameters
//   - provider:     OpenAI-compatible classification client
//   - intent:       strategy-chain classifier, never raises
//   - trust:        per-contact trust ledger
//   - personality:  incremental behavioral profile inference
//   - autosend:     auto-send gate + threshold control loop
//   - cross_module: keyword routing to travel / shopping / hiring
//   - suggestions:  four-source generation + deterministic ranking
//   - outcomes:     best-effort outcome logger feeding the learning loops
//   - store:        SQLite persistence with versioned optimistic writes
//   - pipeline:     the DecisionEngine facade hosts embed

pub mod autosend;
pub mod config;
pub mod cross_module;
pub mod intent;
pub mod outcomes;
pub mod personality;
pub mod pipeline;
pub mod provider;
pub mod store;
pub mod suggestions;
pub mod trust;

// Re-exports for convenience
pub use config::{EngineConfig, ProviderConfig};
pub use intent::{classify_local, ClassifyStrategy, IntentClassifier};
pub use pipeline::DecisionEngine;
pub use store::ProfileStore;
pub use suggestions::{fallback_suggestions, generate, merge_ranked, GeneratorContext};
