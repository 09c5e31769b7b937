// Ambit Engine — Interaction Outcome Logger
// The write side of the learning loop. Every recorded outcome:
//   1. is appended to the event log (write-once; duplicates count twice),
//   2. nudges the user's personality profile,
//   3. feeds the auto-send controller when it came from an auto-send,
//   4. refreshes template stats when it came from a template.
//
// Best-effort throughout: a failing store drops the update with a warning
// and never surfaces an error to the caller.

use crate::atoms::types::{clamp01, InteractionOutcome, OutcomeKind, OutcomeVerdict};
use crate::engine::personality;
use crate::engine::store::ProfileStore;
use crate::engine::autosend;
use log::warn;

/// Running-average weight for a contact's auto-send success rate: the new
/// observation gets 20%, history keeps the rest.
const CONTACT_SUCCESS_BLEND: f64 = 0.2;

pub fn record(store: &ProfileStore, outcome: &InteractionOutcome) {
    if let Err(e) = store.append_outcome(outcome) {
        warn!("[outcome] dropping event append: {e}");
    }

    if let Err(e) = store.update_personality(&outcome.user_id, |profile| {
        personality::apply_outcome(profile, outcome);
        Ok(())
    }) {
        warn!("[outcome] dropping personality update: {e}");
    }

    match outcome.kind {
        OutcomeKind::AutoSend => record_auto_send(store, outcome),
        OutcomeKind::TemplateUse => record_template_use(store, outcome),
        OutcomeKind::Suggestion | OutcomeKind::Manual => {}
    }
}

fn record_auto_send(store: &ProfileStore, outcome: &InteractionOutcome) {
    let meta_confidence =
        outcome.metadata.as_ref().and_then(|m| m.get("confidence")).and_then(|v| v.as_f64());

    if let Err(e) = store.update_autosend_metrics(&outcome.user_id, |metrics| {
        // Missing confidence metadata falls back to the running average,
        // which leaves the mean unchanged and still counts the outcome.
        let confidence = meta_confidence.unwrap_or(metrics.average_confidence_at_send);
        autosend::record_outcome(metrics, outcome.verdict, confidence);
        Ok(())
    }) {
        warn!("[outcome] dropping auto-send learning update: {e}");
    }

    // When we know which contact this went to, fold the result into that
    // contact's own success rate.
    let contact = outcome
        .metadata
        .as_ref()
        .and_then(|m| m.get("contact_email"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());
    if let Some(email) = contact {
        let target = if outcome.verdict == OutcomeVerdict::Success { 1.0 } else { 0.0 };
        if let Err(e) = store.update_contact_trust(&outcome.user_id, &email, |rec| {
            rec.auto_send_success = clamp01(
                rec.auto_send_success * (1.0 - CONTACT_SUCCESS_BLEND)
                    + target * CONTACT_SUCCESS_BLEND,
            );
            Ok(())
        }) {
            warn!("[outcome] dropping contact success update for {email}: {e}");
        }
    }
}

fn record_template_use(store: &ProfileStore, outcome: &InteractionOutcome) {
    let template_id = outcome
        .metadata
        .as_ref()
        .and_then(|m| m.get("template_id"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());
    let Some(template_id) = template_id else {
        warn!("[outcome] template_use event without template_id — skipping stats");
        return;
    };

    let accepted = outcome.verdict == OutcomeVerdict::Success;
    match store.record_template_use(&outcome.user_id, &template_id, accepted) {
        Ok(performance) => {
            log::debug!("[outcome] template {template_id} performance now {performance:.3}")
        }
        Err(e) => warn!("[outcome] dropping template stats update: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> ProfileStore {
        ProfileStore::open_in_memory().unwrap()
    }

    fn auto_send_outcome(verdict: OutcomeVerdict, confidence: f64) -> InteractionOutcome {
        InteractionOutcome {
            user_id: "u1".into(),
            kind: OutcomeKind::AutoSend,
            content: "sent the draft".into(),
            timing_ms: 2_000,
            verdict,
            metadata: Some(json!({
                "confidence": confidence,
                "contact_email": "ana@example.com",
            })),
        }
    }

    #[test]
    fn test_duplicate_events_count_twice() {
        let s = store();
        let outcome = auto_send_outcome(OutcomeVerdict::Success, 0.9);
        record(&s, &outcome);
        record(&s, &outcome);

        assert_eq!(s.outcome_count("u1").unwrap(), 2);
        let metrics = s.get_autosend_metrics("u1").unwrap().unwrap();
        assert_eq!(metrics.total_auto_sends, 2);
        assert_eq!(metrics.successful_auto_sends, 2);
    }

    #[test]
    fn test_auto_send_updates_contact_success() {
        let s = store();
        record(&s, &auto_send_outcome(OutcomeVerdict::Success, 0.9));
        let rec = s.get_contact_trust("u1", "ana@example.com").unwrap().unwrap();
        // 0.5 * 0.8 + 1.0 * 0.2
        assert!((rec.auto_send_success - 0.6).abs() < 1e-9);

        record(&s, &auto_send_outcome(OutcomeVerdict::Regretted, 0.9));
        let rec = s.get_contact_trust("u1", "ana@example.com").unwrap().unwrap();
        // 0.6 * 0.8 + 0.0 * 0.2
        assert!((rec.auto_send_success - 0.48).abs() < 1e-9);
    }

    #[test]
    fn test_personality_nudged_by_outcome() {
        let s = store();
        record(&s, &auto_send_outcome(OutcomeVerdict::Success, 0.9));
        let profile = s.get_personality("u1").unwrap().unwrap();
        assert_eq!(
            profile.response_speed,
            crate::atoms::records::ResponseSpeed::Immediate
        );
    }

    #[test]
    fn test_template_use_updates_stats() {
        let s = store();
        let outcome = InteractionOutcome {
            user_id: "u1".into(),
            kind: OutcomeKind::TemplateUse,
            content: "hello there".into(),
            timing_ms: 0,
            verdict: OutcomeVerdict::Success,
            metadata: Some(json!({ "template_id": "tpl-intro" })),
        };
        record(&s, &outcome);
        // 1 use, 1 accepted: 1.0*0.7 + 0.1*0.3 = 0.73
        let perf = s.template_performance("u1", "tpl-intro").unwrap().unwrap();
        assert!((perf - 0.73).abs() < 1e-9, "got {perf}");
    }

    #[test]
    fn test_suggestion_outcome_touches_no_metrics() {
        let s = store();
        let outcome = InteractionOutcome {
            user_id: "u1".into(),
            kind: OutcomeKind::Suggestion,
            content: "ok".into(),
            timing_ms: 1_000,
            verdict: OutcomeVerdict::Success,
            metadata: None,
        };
        record(&s, &outcome);
        assert!(s.get_autosend_metrics("u1").unwrap().is_none());
        assert_eq!(s.outcome_count("u1").unwrap(), 1);
    }
}
