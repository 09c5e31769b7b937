// Ambit Engine — Suggestion Generation & Ranking
// Produces a bounded, ranked list of candidate next actions from four
// independent signal sources:
//
//   core         — one template per recognized intent
//   contextual   — extracted entities and thread shape
//   personalized — trust, tone, and auto-send eligibility
//   cross-module — routing to travel / shopping / hiring
//
// The generators are pure functions of the same context and run
// concurrently. The merge is deterministic: batches are concatenated in a
// fixed source order, de-duplicated by id (first occurrence wins), sorted
// by (category priority, confidence, id), and truncated. Output must not
// depend on which generator finished first.

use crate::atoms::constants::{MAX_SUGGESTIONS, TRUST_AUTOSEND_FLOOR};
use crate::atoms::records::{AutoSendMetrics, ContactTrustRecord, PersonalityProfile};
use crate::atoms::types::{
    clamp01, ActionSuggestion, DecisionContext, Intent, IntentClassification, SuggestionCategory,
    SuggestionResponse,
};
use crate::engine::{autosend, cross_module};
use log::debug;
use serde_json::json;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Everything the generators are allowed to see for one request.
/// Records are loaded by the caller; generators never touch the store.
pub struct GeneratorContext<'a> {
    pub ctx: &'a DecisionContext,
    pub classification: &'a IntentClassification,
    pub trust: Option<&'a ContactTrustRecord>,
    pub profile: &'a PersonalityProfile,
    pub metrics: &'a AutoSendMetrics,
}

fn suggestion(
    id: &str,
    label: impl Into<String>,
    category: SuggestionCategory,
    confidence: f64,
    action: &str,
) -> ActionSuggestion {
    ActionSuggestion {
        id: id.to_string(),
        label: label.into(),
        category,
        confidence: clamp01(confidence),
        action: action.to_string(),
        parameters: None,
        requires_confirmation: None,
    }
}

/// Headline template for an intent: (id, label, action).
/// Shared between the core generator and the static fallback list.
fn headline_template(intent: Intent, has_dates: bool) -> (&'static str, &'static str, &'static str) {
    match intent {
        Intent::Reply => ("reply_draft", "Draft a reply", "draft_reply"),
        Intent::Compose => ("compose_draft", "Draft this email", "draft_email"),
        Intent::Summarize => ("summarize_thread", "Summarize this thread", "summarize_thread"),
        Intent::Schedule if has_dates => {
            ("calendar_add", "Add the mentioned dates to your calendar", "calendar_add")
        }
        Intent::Schedule => ("calendar_propose", "Propose meeting times", "propose_times"),
        Intent::Translate => ("translate_message", "Translate this message", "translate"),
        Intent::Template => ("template_save", "Save as a template", "save_template"),
        Intent::Search => ("search_mail", "Search your mail", "search_mail"),
        Intent::Assistance => ("assist_general", "Let Ambit draft a response", "assist"),
    }
}

// ── Generator 1: core by intent ────────────────────────────────────────────

pub fn core_suggestions(gc: &GeneratorContext<'_>) -> Vec<ActionSuggestion> {
    let conf = gc.classification.confidence;
    let has_dates =
        gc.ctx.entities.as_ref().map(|e| !e.dates.is_empty()).unwrap_or(false);

    let (id, label, action) = headline_template(gc.classification.intent, has_dates);
    let mut out = vec![suggestion(id, label, SuggestionCategory::Primary, conf, action)];

    // Intent-specific companion actions.
    match gc.classification.intent {
        Intent::Reply => out.push(suggestion(
            "reply_quick",
            "Show quick reply options",
            SuggestionCategory::Secondary,
            conf * 0.8,
            "quick_replies",
        )),
        Intent::Compose => out.push(suggestion(
            "compose_outline",
            "Outline key points first",
            SuggestionCategory::Secondary,
            conf * 0.75,
            "outline_email",
        )),
        Intent::Summarize => out.push(suggestion(
            "summarize_actions",
            "Extract action items",
            SuggestionCategory::Secondary,
            conf * 0.8,
            "extract_actions",
        )),
        Intent::Schedule => out.push(suggestion(
            "calendar_availability",
            "Check your availability",
            SuggestionCategory::Secondary,
            conf * 0.7,
            "check_availability",
        )),
        _ => {}
    }

    // Secondary intents get their headline at a discount.
    for intent in &gc.classification.secondary {
        let (id, label, action) = headline_template(*intent, has_dates);
        out.push(suggestion(id, label, SuggestionCategory::Secondary, conf * 0.6, action));
    }

    out
}

// ── Generator 2: contextual ────────────────────────────────────────────────

pub fn contextual_suggestions(gc: &GeneratorContext<'_>) -> Vec<ActionSuggestion> {
    let mut out = Vec::new();

    if let Some(entities) = &gc.ctx.entities {
        if entities.participants.len() >= 3 {
            out.push(suggestion(
                "ctx_reply_all",
                format!("Draft a group reply to {} people", entities.participants.len()),
                SuggestionCategory::Contextual,
                0.6,
                "reply_all",
            ));
        }
        if entities.urgent {
            out.push(suggestion(
                "ctx_priority",
                "Flag as high priority",
                SuggestionCategory::Contextual,
                0.75,
                "set_priority",
            ));
        }
        if !entities.dates.is_empty() {
            let mut s = suggestion(
                "ctx_dates",
                "Put the mentioned dates on your calendar",
                SuggestionCategory::Contextual,
                0.65,
                "calendar_add",
            );
            s.parameters = Some(json!({ "dates": entities.dates }));
            out.push(s);
        }
        if !entities.locations.is_empty() {
            let mut s = suggestion(
                "ctx_locations",
                "Attach travel details",
                SuggestionCategory::Contextual,
                0.55,
                "attach_location",
            );
            s.parameters = Some(json!({ "locations": entities.locations }));
            out.push(s);
        }
    }

    if let Some(thread) = &gc.ctx.thread {
        if thread.depth > 5 {
            out.push(suggestion(
                "ctx_thread_summary",
                "Catch up with a thread summary",
                SuggestionCategory::Contextual,
                0.7,
                "summarize_thread",
            ));
        }
    }

    out
}

/// Human-readable observations shown alongside the suggestions.
pub fn contextual_hints(ctx: &DecisionContext) -> Vec<String> {
    let mut hints = Vec::new();
    if let Some(entities) = &ctx.entities {
        if entities.urgent {
            hints.push("This message is flagged urgent".to_string());
        }
        if entities.participants.len() >= 3 {
            hints.push(format!("{} participants on this thread", entities.participants.len()));
        }
        if !entities.dates.is_empty() {
            hints.push(format!("Mentions dates: {}", entities.dates.join(", ")));
        }
        if !entities.locations.is_empty() {
            hints.push(format!("Mentions places: {}", entities.locations.join(", ")));
        }
    }
    if let Some(thread) = &ctx.thread {
        if thread.depth > 5 {
            hints.push(format!("Long thread ({} messages)", thread.depth));
        }
    }
    hints
}

// ── Generator 3: personalized ──────────────────────────────────────────────

pub fn personalized_suggestions(gc: &GeneratorContext<'_>) -> Vec<ActionSuggestion> {
    let mut out = Vec::new();
    let conf = gc.classification.confidence;

    if let Some(trust) = gc.trust {
        // Auto-send eligibility: a trusted contact and enough combined
        // confidence to clear the user's current effective threshold.
        let trust_factor = 0.5 + trust.trust_score * 0.5;
        let effective = autosend::effective_threshold(
            gc.metrics,
            Some(trust.trust_score),
            gc.profile.decision_making,
        );
        if trust.trust_score > TRUST_AUTOSEND_FLOOR && conf * trust_factor > effective {
            let mut s = suggestion(
                "auto_send_offer",
                "Send automatically when ready",
                SuggestionCategory::Primary,
                conf,
                "auto_send",
            );
            s.requires_confirmation = Some(false);
            s.parameters = Some(json!({ "contact": trust.contact_email }));
            out.push(s);
        }

        // Tone nudge when the contact's inferred preference differs from
        // the user's default.
        if let Some(tone) = trust.preferred_tone {
            if tone != gc.profile.tone_preference {
                let mut s = suggestion(
                    "tone_adjust",
                    format!("Adjust tone to {}", tone.as_str()),
                    SuggestionCategory::Contextual,
                    0.6,
                    "adjust_tone",
                );
                s.parameters = Some(json!({ "tone": tone.as_str() }));
                out.push(s);
            }
        }
    }

    if matches!(gc.classification.intent, Intent::Reply | Intent::Compose) {
        out.push(suggestion(
            "signature_insert",
            "Insert your signature",
            SuggestionCategory::Secondary,
            0.5,
            "insert_signature",
        ));
    }

    out
}

// ── Generator 4: cross-module ──────────────────────────────────────────────

pub fn cross_module_suggestions(gc: &GeneratorContext<'_>) -> Vec<ActionSuggestion> {
    let Some(route) = cross_module::detect_route(&gc.ctx.text) else {
        return Vec::new();
    };
    let mut s = suggestion(
        &format!("route_{}", route.module),
        format!("Continue this in the {} module", route.module),
        SuggestionCategory::CrossModule,
        route.score,
        "open_module",
    );
    let mut params = route.hints;
    params["module"] = json!(route.module);
    params["score"] = json!(route.score);
    s.parameters = Some(params);
    vec![s]
}

// ── Merge ──────────────────────────────────────────────────────────────────

/// Deterministic merge of the four generator batches, given in canonical
/// source order (core, contextual, personalized, cross-module).
pub fn merge_ranked(batches: [Vec<ActionSuggestion>; 4]) -> Vec<ActionSuggestion> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged: Vec<ActionSuggestion> = Vec::new();
    for batch in batches {
        for s in batch {
            if seen.insert(s.id.clone()) {
                merged.push(s);
            }
        }
    }

    merged.sort_by(|a, b| {
        b.category
            .priority()
            .cmp(&a.category.priority())
            .then(b.confidence.partial_cmp(&a.confidence).unwrap_or(Ordering::Equal))
            .then_with(|| a.id.cmp(&b.id))
    });
    merged.truncate(MAX_SUGGESTIONS);
    merged
}

/// Static fallback when the pipeline fails: the user always gets
/// something actionable for the resolved intent.
pub fn fallback_suggestions(intent: Intent) -> Vec<ActionSuggestion> {
    let (id, label, action) = headline_template(intent, false);
    let mut out = vec![suggestion(id, label, SuggestionCategory::Primary, 0.5, action)];
    if intent != Intent::Assistance {
        out.push(suggestion(
            "assist_general",
            "Let Ambit draft a response",
            SuggestionCategory::Secondary,
            0.4,
            "assist",
        ));
    }
    out
}

// ── Entry point ────────────────────────────────────────────────────────────

/// Run all four generators against the same context and merge. The
/// generators share no mutable state, so concurrent evaluation is safe and
/// the merged output is independent of completion order.
pub async fn generate(gc: &GeneratorContext<'_>) -> SuggestionResponse {
    let (core, contextual, personalized, cross) = futures::join!(
        async { core_suggestions(gc) },
        async { contextual_suggestions(gc) },
        async { personalized_suggestions(gc) },
        async { cross_module_suggestions(gc) },
    );

    let sources = [&core, &contextual, &personalized, &cross]
        .iter()
        .filter(|b| !b.is_empty())
        .count();
    let suggestions = merge_ranked([core, contextual, personalized, cross]);

    let primary_action = suggestions
        .iter()
        .find(|s| s.category == SuggestionCategory::Primary)
        .or_else(|| suggestions.first())
        .cloned();

    debug!(
        "[suggest] {} suggestions from {} sources for intent '{}'",
        suggestions.len(),
        sources,
        gc.classification.intent.as_str()
    );

    SuggestionResponse {
        suggestions,
        primary_action,
        auto_send: None,
        contextual_hints: contextual_hints(gc.ctx),
        reasoning: format!(
            "Read this as '{}' ({:.0}% confident, {} tier); {} signal sources contributed",
            gc.classification.intent.as_str(),
            gc.classification.confidence * 100.0,
            match gc.classification.tier {
                crate::atoms::types::ClassifierTier::Provider => "provider",
                crate::atoms::types::ClassifierTier::Fallback => "local",
            },
            sources
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::records::Tone;
    use crate::atoms::types::{ClassifierTier, ExtractedEntities, ThreadInfo};
    use crate::engine::autosend::initial_metrics;

    fn classification(intent: Intent, confidence: f64) -> IntentClassification {
        IntentClassification {
            intent,
            confidence,
            secondary: vec![],
            reasoning: String::new(),
            tier: ClassifierTier::Fallback,
        }
    }

    fn busy_context() -> DecisionContext {
        DecisionContext {
            user_id: "u1".into(),
            text: "Reply about the flight and hotel for our vacation trip".into(),
            contact_email: Some("ana@example.com".into()),
            entities: Some(ExtractedEntities {
                participants: vec!["ana".into(), "bo".into(), "cy".into(), "di".into()],
                dates: vec!["Friday".into()],
                locations: vec!["Lisbon".into()],
                topics: vec![],
                urgent: true,
                sentiment: None,
            }),
            thread: Some(ThreadInfo {
                depth: 8,
                has_draft: true,
                reply_options: vec!["Sounds good".into()],
            }),
        }
    }

    fn trusted_contact(score: f64) -> ContactTrustRecord {
        let mut t = ContactTrustRecord::new("u1", "ana@example.com");
        t.trust_score = score;
        t.preferred_tone = Some(Tone::Friendly);
        t
    }

    #[tokio::test]
    async fn test_no_duplicate_ids_and_bounded() {
        let ctx = busy_context();
        let cls = classification(Intent::Reply, 0.9);
        let trust = trusted_contact(0.9);
        let profile = PersonalityProfile::new("u1");
        let metrics = initial_metrics("u1");
        let gc = GeneratorContext {
            ctx: &ctx,
            classification: &cls,
            trust: Some(&trust),
            profile: &profile,
            metrics: &metrics,
        };

        let resp = generate(&gc).await;
        assert!(resp.suggestions.len() <= MAX_SUGGESTIONS);
        let mut ids: Vec<&str> = resp.suggestions.iter().map(|s| s.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), resp.suggestions.len(), "duplicate suggestion ids");
    }

    #[tokio::test]
    async fn test_merge_is_independent_of_completion_order() {
        let ctx = busy_context();
        let cls = classification(Intent::Reply, 0.9);
        let trust = trusted_contact(0.9);
        let profile = PersonalityProfile::new("u1");
        let metrics = initial_metrics("u1");
        let gc = GeneratorContext {
            ctx: &ctx,
            classification: &cls,
            trust: Some(&trust),
            profile: &profile,
            metrics: &metrics,
        };

        // Concurrent path.
        let concurrent = generate(&gc).await;

        // Sequential path, generators resolved in reverse order, batches
        // still handed to the merge in canonical positions.
        let cross = cross_module_suggestions(&gc);
        let personalized = personalized_suggestions(&gc);
        let contextual = contextual_suggestions(&gc);
        let core = core_suggestions(&gc);
        let reversed = merge_ranked([core, contextual, personalized, cross]);

        let concurrent_ids: Vec<&str> =
            concurrent.suggestions.iter().map(|s| s.id.as_str()).collect();
        let reversed_ids: Vec<&str> = reversed.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(concurrent_ids, reversed_ids);
    }

    #[test]
    fn test_ranking_orders_categories_then_confidence() {
        let a = suggestion("a", "a", SuggestionCategory::CrossModule, 0.99, "x");
        let b = suggestion("b", "b", SuggestionCategory::Primary, 0.5, "x");
        let c = suggestion("c", "c", SuggestionCategory::Primary, 0.8, "x");
        let d = suggestion("d", "d", SuggestionCategory::Contextual, 0.9, "x");
        let merged = merge_ranked([vec![a], vec![b], vec![c], vec![d]]);
        let ids: Vec<&str> = merged.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "d", "a"]);
    }

    #[test]
    fn test_dedup_first_occurrence_wins() {
        let first = suggestion("same", "first", SuggestionCategory::Primary, 0.9, "x");
        let second = suggestion("same", "second", SuggestionCategory::Primary, 0.1, "x");
        let merged = merge_ranked([vec![first], vec![second], vec![], vec![]]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].label, "first");
    }

    #[test]
    fn test_auto_send_offer_requires_high_trust() {
        let ctx = busy_context();
        let cls = classification(Intent::Reply, 0.95);
        let profile = PersonalityProfile::new("u1");
        let metrics = initial_metrics("u1");

        let low = trusted_contact(0.4);
        let gc = GeneratorContext {
            ctx: &ctx,
            classification: &cls,
            trust: Some(&low),
            profile: &profile,
            metrics: &metrics,
        };
        assert!(!personalized_suggestions(&gc).iter().any(|s| s.id == "auto_send_offer"));

        let high = trusted_contact(1.0);
        let gc = GeneratorContext { trust: Some(&high), ..gc };
        let out = personalized_suggestions(&gc);
        let offer = out.iter().find(|s| s.id == "auto_send_offer").expect("offer expected");
        assert_eq!(offer.requires_confirmation, Some(false));
    }

    #[test]
    fn test_tone_adjustment_only_on_mismatch() {
        let ctx = busy_context();
        let cls = classification(Intent::Reply, 0.7);
        let metrics = initial_metrics("u1");

        let mut profile = PersonalityProfile::new("u1");
        let contact = trusted_contact(0.6);
        {
            let gc = GeneratorContext {
                ctx: &ctx,
                classification: &cls,
                trust: Some(&contact),
                profile: &profile,
                metrics: &metrics,
            };
            assert!(personalized_suggestions(&gc).iter().any(|s| s.id == "tone_adjust"));
        }

        // Matching default tone → no nudge.
        profile.tone_preference = Tone::Friendly;
        let gc = GeneratorContext {
            ctx: &ctx,
            classification: &cls,
            trust: Some(&contact),
            profile: &profile,
            metrics: &metrics,
        };
        assert!(!personalized_suggestions(&gc).iter().any(|s| s.id == "tone_adjust"));
    }

    #[tokio::test]
    async fn test_primary_action_is_top_primary() {
        let ctx = busy_context();
        let cls = classification(Intent::Summarize, 0.85);
        let profile = PersonalityProfile::new("u1");
        let metrics = initial_metrics("u1");
        let gc = GeneratorContext {
            ctx: &ctx,
            classification: &cls,
            trust: None,
            profile: &profile,
            metrics: &metrics,
        };
        let resp = generate(&gc).await;
        let primary = resp.primary_action.expect("primary expected");
        assert_eq!(primary.id, "summarize_thread");
        assert_eq!(primary.category, SuggestionCategory::Primary);
    }

    #[test]
    fn test_fallback_list_keyed_by_intent() {
        for intent in [Intent::Reply, Intent::Schedule, Intent::Assistance] {
            let out = fallback_suggestions(intent);
            assert!(!out.is_empty());
            assert_eq!(out[0].category, SuggestionCategory::Primary);
            let mut ids: Vec<&str> = out.iter().map(|s| s.id.as_str()).collect();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), out.len());
        }
    }

    #[test]
    fn test_schedule_splits_on_extracted_dates() {
        let mut ctx = busy_context();
        let cls = classification(Intent::Schedule, 0.8);
        let profile = PersonalityProfile::new("u1");
        let metrics = initial_metrics("u1");
        {
            let gc = GeneratorContext {
                ctx: &ctx,
                classification: &cls,
                trust: None,
                profile: &profile,
                metrics: &metrics,
            };
            assert!(core_suggestions(&gc).iter().any(|s| s.id == "calendar_add"));
        }

        ctx.entities = None;
        let gc = GeneratorContext {
            ctx: &ctx,
            classification: &cls,
            trust: None,
            profile: &profile,
            metrics: &metrics,
        };
        assert!(core_suggestions(&gc).iter().any(|s| s.id == "calendar_propose"));
    }
}
