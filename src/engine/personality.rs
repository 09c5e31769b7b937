// Ambit Engine — Personality Inference
// Nudges a user's behavioral profile from each recorded interaction.
// Incremental by design: one outcome moves at most a couple of fields,
// and values between the bands leave the profile untouched.

use crate::atoms::constants::{
    LATENCY_IMMEDIATE_MS, LATENCY_THOUGHTFUL_MS, WORDS_CONCISE, WORDS_DETAILED,
};
use crate::atoms::records::{DecisionMaking, PersonalityProfile, ResponseSpeed, WritingStyle};
use crate::atoms::types::{InteractionOutcome, OutcomeKind};

/// Apply one observed interaction to the profile.
pub fn apply_outcome(profile: &mut PersonalityProfile, outcome: &InteractionOutcome) {
    // Reaction latency → pace.
    if outcome.timing_ms > 0 {
        if outcome.timing_ms < LATENCY_IMMEDIATE_MS {
            profile.response_speed = ResponseSpeed::Immediate;
        } else if outcome.timing_ms > LATENCY_THOUGHTFUL_MS {
            profile.response_speed = ResponseSpeed::Thoughtful;
        }
    }

    // Content length → verbosity.
    let words = outcome.content.split_whitespace().count();
    if words > 0 {
        if words < WORDS_CONCISE {
            profile.writing_style = WritingStyle::Concise;
        } else if words > WORDS_DETAILED {
            profile.writing_style = WritingStyle::Detailed;
        }
    }

    // How fast the user acts on offered actions → decisiveness, which in
    // turn biases the auto-send threshold.
    if matches!(outcome.kind, OutcomeKind::AutoSend | OutcomeKind::Suggestion)
        && outcome.timing_ms > 0
    {
        if outcome.timing_ms < LATENCY_IMMEDIATE_MS {
            profile.decision_making = DecisionMaking::Quick;
        } else if outcome.timing_ms > LATENCY_THOUGHTFUL_MS {
            profile.decision_making = DecisionMaking::Deliberate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::types::OutcomeVerdict;

    fn outcome(kind: OutcomeKind, content: &str, timing_ms: u64) -> InteractionOutcome {
        InteractionOutcome {
            user_id: "u1".into(),
            kind,
            content: content.into(),
            timing_ms,
            verdict: OutcomeVerdict::Success,
            metadata: None,
        }
    }

    #[test]
    fn test_fast_reaction_marks_immediate_and_quick() {
        let mut p = PersonalityProfile::new("u1");
        apply_outcome(&mut p, &outcome(OutcomeKind::Suggestion, "ok", 1_200));
        assert_eq!(p.response_speed, ResponseSpeed::Immediate);
        assert_eq!(p.decision_making, DecisionMaking::Quick);
    }

    #[test]
    fn test_slow_reaction_marks_thoughtful_and_deliberate() {
        let mut p = PersonalityProfile::new("u1");
        apply_outcome(&mut p, &outcome(OutcomeKind::AutoSend, "looks fine to me", 45_000));
        assert_eq!(p.response_speed, ResponseSpeed::Thoughtful);
        assert_eq!(p.decision_making, DecisionMaking::Deliberate);
    }

    #[test]
    fn test_midrange_latency_leaves_profile_alone() {
        let mut p = PersonalityProfile::new("u1");
        apply_outcome(&mut p, &outcome(OutcomeKind::Manual, "a reasonable answer here", 15_000));
        assert_eq!(p.response_speed, ResponseSpeed::Mixed);
        assert_eq!(p.decision_making, DecisionMaking::Balanced);
    }

    #[test]
    fn test_word_count_bands() {
        let mut p = PersonalityProfile::new("u1");
        apply_outcome(&mut p, &outcome(OutcomeKind::Manual, "thanks", 0));
        assert_eq!(p.writing_style, WritingStyle::Concise);

        let long = "word ".repeat(60);
        apply_outcome(&mut p, &outcome(OutcomeKind::Manual, &long, 0));
        assert_eq!(p.writing_style, WritingStyle::Detailed);
    }

    #[test]
    fn test_manual_outcome_does_not_touch_decisiveness() {
        let mut p = PersonalityProfile::new("u1");
        apply_outcome(&mut p, &outcome(OutcomeKind::Manual, "ok", 1_000));
        assert_eq!(p.decision_making, DecisionMaking::Balanced);
    }
}
