// ── Ambit Atoms: Constants ─────────────────────────────────────────────────
// All named tuning constants for the decision engine live here.
// Rationale: collecting constants in one place eliminates magic numbers,
// makes auditing easier, and keeps every layer's code self-documenting.

// ── Intent classification ──────────────────────────────────────────────────
// The provider tier may not claim certainty above this ceiling; whatever the
// model reports is clamped down to it.
pub(crate) const PROVIDER_CONFIDENCE_CEILING: f64 = 0.95;
// Confidence reported by the keyword tier when no pattern matches.
pub(crate) const FALLBACK_DEFAULT_CONFIDENCE: f64 = 0.6;

// ── Auto-send threshold controller ─────────────────────────────────────────
// The adaptive threshold is kept inside [FLOOR, CEILING] at every write.
pub(crate) const THRESHOLD_FLOOR: f64 = 0.75;
pub(crate) const THRESHOLD_CEILING: f64 = 0.95;
// Fresh metrics start here before any outcome data exists.
pub(crate) const INITIAL_THRESHOLD: f64 = 0.85;
// Nudge sizes: raising is twice as fast as lowering, so the controller backs
// off quickly after failures and re-earns autonomy slowly.
pub(crate) const THRESHOLD_RAISE_STEP: f64 = 0.02;
pub(crate) const THRESHOLD_LOWER_STEP: f64 = 0.01;
// Success-rate bands that trigger a nudge.
pub(crate) const SUCCESS_RATE_LOW: f64 = 0.8;
pub(crate) const SUCCESS_RATE_HIGH: f64 = 0.95;
// Per-request threshold adjustments.
pub(crate) const TRUST_ADJUST_SCALE: f64 = 0.1;
pub(crate) const DECISIVENESS_ADJUST: f64 = 0.05;
// Cancel-window countdown for an auto-send offer.
pub(crate) const COUNTDOWN_SECS: u32 = 10;
pub(crate) const COUNTDOWN_FAST_SECS: u32 = 5;
pub(crate) const COUNTDOWN_FAST_CONFIDENCE: f64 = 0.95;

// ── Contact trust ledger ───────────────────────────────────────────────────
// Response times are capped at one day before normalization.
pub(crate) const RESPONSE_TIME_CAP_SECS: f64 = 86_400.0;
// Batch size that counts as "maximum" communication frequency.
pub(crate) const FREQUENCY_NORM: f64 = 100.0;
// Trust score component weights (positive ratio / response factor / frequency).
pub(crate) const TRUST_W_POSITIVE: f64 = 0.4;
pub(crate) const TRUST_W_RESPONSE: f64 = 0.3;
pub(crate) const TRUST_W_FREQUENCY: f64 = 0.3;
// Minimum trust for a contact to be eligible for the auto-send suggestion.
pub(crate) const TRUST_AUTOSEND_FLOOR: f64 = 0.7;

// ── Suggestion generation ──────────────────────────────────────────────────
// Ranked lists are truncated to this many entries.
pub(crate) const MAX_SUGGESTIONS: usize = 6;
// Keyword-overlap score a module must reach before a routing suggestion
// is emitted.
pub(crate) const CROSS_MODULE_MIN_SCORE: f64 = 0.3;

// ── Personality inference ──────────────────────────────────────────────────
// Reaction latency bands (milliseconds).
pub(crate) const LATENCY_IMMEDIATE_MS: u64 = 5_000;
pub(crate) const LATENCY_THOUGHTFUL_MS: u64 = 30_000;
// Word-count bands for writing style.
pub(crate) const WORDS_CONCISE: usize = 10;
pub(crate) const WORDS_DETAILED: usize = 50;

// ── Template performance ───────────────────────────────────────────────────
// performance = acceptance_rate * W_ACCEPT + min(usage / USAGE_NORM, 1) * W_USAGE
pub(crate) const TEMPLATE_W_ACCEPT: f64 = 0.7;
pub(crate) const TEMPLATE_W_USAGE: f64 = 0.3;
pub(crate) const TEMPLATE_USAGE_NORM: f64 = 10.0;
