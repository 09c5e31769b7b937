// Ambit Engine — Auto-Send Threshold Controller
// Gates fully-autonomous sending. The persisted threshold self-tunes from
// observed outcomes: it only nudges, never jumps, so one bad outcome cannot
// make the gate over-react.

use crate::atoms::constants::{
    COUNTDOWN_FAST_CONFIDENCE, COUNTDOWN_FAST_SECS, COUNTDOWN_SECS, DECISIVENESS_ADJUST,
    INITIAL_THRESHOLD, SUCCESS_RATE_HIGH, SUCCESS_RATE_LOW, THRESHOLD_CEILING, THRESHOLD_FLOOR,
    THRESHOLD_LOWER_STEP, THRESHOLD_RAISE_STEP, TRUST_ADJUST_SCALE,
};
use crate::atoms::records::{AutoSendMetrics, DecisionMaking};
use crate::atoms::types::{clamp01, OutcomeVerdict};
use log::info;

/// Per-request gate threshold: the persisted optimum, lowered for trusted
/// contacts and quick deciders, raised for deliberate ones, then clamped
/// back into the controller's operating band.
pub fn effective_threshold(
    metrics: &AutoSendMetrics,
    contact_trust: Option<f64>,
    decisiveness: DecisionMaking,
) -> f64 {
    let mut threshold = metrics.optimal_confidence_threshold;

    // Only applies when a contact is actually known; trust 0.5 is neutral.
    if let Some(trust) = contact_trust {
        threshold -= (clamp01(trust) - 0.5) * TRUST_ADJUST_SCALE;
    }

    match decisiveness {
        DecisionMaking::Quick => threshold -= DECISIVENESS_ADJUST,
        DecisionMaking::Deliberate => threshold += DECISIVENESS_ADJUST,
        DecisionMaking::Balanced => {}
    }

    threshold.clamp(THRESHOLD_FLOOR, THRESHOLD_CEILING)
}

/// The gate itself. A candidate action (non-empty draft or at least one
/// reply option) is required — confidence alone never fires the gate.
pub fn should_auto_send(intent_confidence: f64, effective: f64, has_candidate_action: bool) -> bool {
    has_candidate_action && intent_confidence >= effective
}

/// Cancel window offered with an auto-send. Shorter when the classifier is
/// near its certainty ceiling.
pub fn countdown_seconds(confidence: f64) -> u32 {
    if confidence >= COUNTDOWN_FAST_CONFIDENCE {
        COUNTDOWN_FAST_SECS
    } else {
        COUNTDOWN_SECS
    }
}

/// Learning update, invoked once the outcome of a prior auto-send is known.
/// Counters and the confidence running mean always move; the threshold only
/// moves when the success rate leaves its target band.
pub fn record_outcome(
    metrics: &mut AutoSendMetrics,
    verdict: OutcomeVerdict,
    confidence_at_send: f64,
) {
    metrics.total_auto_sends += 1;
    match verdict {
        OutcomeVerdict::Success => metrics.successful_auto_sends += 1,
        OutcomeVerdict::Canceled => metrics.canceled_auto_sends += 1,
        OutcomeVerdict::Regretted => metrics.regretted_auto_sends += 1,
        // A send the user edited afterwards still counted as a send; it
        // just doesn't move the success counters.
        OutcomeVerdict::Modified => {}
    }

    let total = metrics.total_auto_sends as f64;
    metrics.average_confidence_at_send = clamp01(
        (metrics.average_confidence_at_send * (total - 1.0) + clamp01(confidence_at_send)) / total,
    );

    let success_rate = metrics.successful_auto_sends as f64 / total;
    let before = metrics.optimal_confidence_threshold;
    if success_rate < SUCCESS_RATE_LOW {
        metrics.optimal_confidence_threshold += THRESHOLD_RAISE_STEP;
    } else if success_rate > SUCCESS_RATE_HIGH {
        metrics.optimal_confidence_threshold -= THRESHOLD_LOWER_STEP;
    }
    metrics.optimal_confidence_threshold =
        metrics.optimal_confidence_threshold.clamp(THRESHOLD_FLOOR, THRESHOLD_CEILING);
    metrics.last_threshold_update = chrono::Utc::now().to_rfc3339();

    if (metrics.optimal_confidence_threshold - before).abs() > f64::EPSILON {
        info!(
            "[autosend] threshold {} → {:.3} (success rate {:.2} over {})",
            before, metrics.optimal_confidence_threshold, success_rate, metrics.total_auto_sends
        );
    }
}

/// Fresh controller state for a user with no history.
pub fn initial_metrics(user_id: &str) -> AutoSendMetrics {
    let mut m = AutoSendMetrics::new(user_id);
    m.optimal_confidence_threshold = INITIAL_THRESHOLD;
    m.average_confidence_at_send = INITIAL_THRESHOLD;
    m
}
