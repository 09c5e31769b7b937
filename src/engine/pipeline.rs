// Ambit Engine — Request Pipeline
// The facade the host embeds. One `suggest` call is stateless: load the
// user's records, classify, generate, gate, respond. Learning flows back
// in through `record_outcome`; the trust ledger is fed through
// `update_trust`.
//
// `suggest` never fails the caller. Store reads degrade to defaults,
// provider failures fall back to the local classifier tier, and a broken
// suggestion pipeline is replaced by the static per-intent list.

use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::records::{AutoSendMetrics, ContactTrustRecord, PersonalityProfile};
use crate::atoms::types::{
    AutoSendOffer, ContactInteraction, DecisionContext, InteractionOutcome, SuggestionResponse,
};
use crate::engine::config::EngineConfig;
use crate::engine::intent::{classify_local, IntentClassifier};
use crate::engine::store::ProfileStore;
use crate::engine::{autosend, outcomes, suggestions, trust};
use log::{error, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct DecisionEngine {
    config: EngineConfig,
    store: Arc<ProfileStore>,
    classifier: IntentClassifier,
}

impl DecisionEngine {
    pub fn new(config: EngineConfig, store: Arc<ProfileStore>) -> Self {
        let classifier = IntentClassifier::from_config(&config);
        info!(
            "[engine] DecisionEngine ready (provider configured: {})",
            config.provider.is_some()
        );
        DecisionEngine { config, store, classifier }
    }

    /// Produce the ranked suggestion set for one request. Total — the
    /// worst case is the static fallback list, never an error.
    pub async fn suggest(&self, ctx: &DecisionContext) -> SuggestionResponse {
        let deadline = Instant::now() + Duration::from_millis(self.config.request_deadline_ms);
        match self.suggest_inner(ctx, deadline).await {
            Ok(resp) => resp,
            Err(e) => {
                error!("[engine] suggestion pipeline failed: {e} — serving static fallback");
                let classification = classify_local(&ctx.text);
                let list = suggestions::fallback_suggestions(classification.intent);
                SuggestionResponse {
                    primary_action: list.first().cloned(),
                    suggestions: list,
                    auto_send: None,
                    contextual_hints: Vec::new(),
                    reasoning: "Recovered with the static suggestion set".to_string(),
                }
            }
        }
    }

    async fn suggest_inner(
        &self,
        ctx: &DecisionContext,
        deadline: Instant,
    ) -> EngineResult<SuggestionResponse> {
        // Record loads are best-effort: an unreachable store costs us
        // personalization, not the request.
        let profile = self
            .store
            .get_personality(&ctx.user_id)
            .unwrap_or_else(|e| {
                warn!("[engine] personality load failed: {e}");
                None
            })
            .unwrap_or_else(|| PersonalityProfile::new(&ctx.user_id));

        let metrics = self
            .store
            .get_autosend_metrics(&ctx.user_id)
            .unwrap_or_else(|e| {
                warn!("[engine] metrics load failed: {e}");
                None
            })
            .unwrap_or_else(|| autosend::initial_metrics(&ctx.user_id));

        let trust_record: Option<ContactTrustRecord> = match &ctx.contact_email {
            Some(email) => self.store.get_contact_trust(&ctx.user_id, email).unwrap_or_else(|e| {
                warn!("[engine] trust load failed: {e}");
                None
            }),
            None => None,
        };

        // Classification must finish before generation — suggestions key
        // off the resolved intent. The remaining deadline caps the
        // provider tier; on expiry the local tier answers.
        let remaining = deadline.saturating_duration_since(Instant::now());
        let classification = self.classifier.classify(ctx, Some(remaining)).await;

        let gc = suggestions::GeneratorContext {
            ctx,
            classification: &classification,
            trust: trust_record.as_ref(),
            profile: &profile,
            metrics: &metrics,
        };
        let mut resp = suggestions::generate(&gc).await;
        if resp.suggestions.is_empty() {
            resp.suggestions = suggestions::fallback_suggestions(classification.intent);
            resp.primary_action = resp.suggestions.first().cloned();
        }

        resp.auto_send = self.auto_send_offer(
            ctx,
            classification.confidence,
            &metrics,
            trust_record.as_ref(),
            &profile,
        );
        Ok(resp)
    }

    fn auto_send_offer(
        &self,
        ctx: &DecisionContext,
        confidence: f64,
        metrics: &AutoSendMetrics,
        trust_record: Option<&ContactTrustRecord>,
        profile: &PersonalityProfile,
    ) -> Option<AutoSendOffer> {
        let effective = autosend::effective_threshold(
            metrics,
            trust_record.map(|t| t.trust_score),
            profile.decision_making,
        );
        // A candidate action means there is actually something to send:
        // a prepared draft or at least one reply option.
        let has_candidate = ctx
            .thread
            .as_ref()
            .map(|t| t.has_draft || !t.reply_options.is_empty())
            .unwrap_or(false);

        if !autosend::should_auto_send(confidence, effective, has_candidate) {
            return None;
        }
        info!(
            "[engine] auto-send gate open: confidence {:.2} ≥ effective {:.2}",
            confidence, effective
        );
        Some(AutoSendOffer {
            confidence,
            countdown_seconds: autosend::countdown_seconds(confidence),
            recipient_hint: ctx.contact_email.clone(),
        })
    }

    /// Feed one observed outcome back into the learning loops.
    /// Best-effort: store failures are logged and dropped.
    pub fn record_outcome(&self, outcome: &InteractionOutcome) {
        outcomes::record(&self.store, outcome);
    }

    /// Recompute a contact's trust from an interaction batch and persist
    /// the updated record. Empty batches are rejected up front.
    pub fn update_trust(
        &self,
        user_id: &str,
        contact_email: &str,
        interactions: &[ContactInteraction],
    ) -> EngineResult<ContactTrustRecord> {
        if interactions.is_empty() {
            return Err(EngineError::validation("empty interaction batch for trust update"));
        }
        self.store
            .update_contact_trust(user_id, contact_email, |rec| trust::derive_trust(rec, interactions))
    }

    pub fn store(&self) -> &Arc<ProfileStore> {
        &self.store
    }
}
