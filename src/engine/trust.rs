// Ambit Engine — Contact Trust Ledger
// Derives a per-contact trust score from a batch of interaction history and
// upserts the record by (user_id, contact_email). The score gates how much
// autonomy the auto-send controller grants toward that contact.

use crate::atoms::constants::{
    FREQUENCY_NORM, RESPONSE_TIME_CAP_SECS, TRUST_W_FREQUENCY, TRUST_W_POSITIVE, TRUST_W_RESPONSE,
};
use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::records::{ContactTrustRecord, RelationshipType, Tone};
use crate::atoms::types::{clamp01, ContactInteraction, Sentiment};
use log::info;

/// Recompute a contact's trust state from one interaction batch.
/// The batch must be non-empty — an empty batch is a caller bug, rejected
/// before any division happens.
pub fn derive_trust(
    record: &mut ContactTrustRecord,
    interactions: &[ContactInteraction],
) -> EngineResult<()> {
    let n = interactions.len();
    if n == 0 {
        return Err(EngineError::validation("empty interaction batch for trust update"));
    }
    let n_f = n as f64;

    let positive = interactions.iter().filter(|i| i.sentiment == Sentiment::Positive).count();
    let negative = interactions.iter().filter(|i| i.sentiment == Sentiment::Negative).count();
    let positive_ratio = positive as f64 / n_f;

    let avg_response_secs =
        interactions.iter().map(|i| i.response_time_seconds).sum::<f64>() / n_f;
    let response_factor = avg_response_secs.min(RESPONSE_TIME_CAP_SECS) / RESPONSE_TIME_CAP_SECS;

    // Deliberately not clamped before weighting — a 300-interaction batch
    // contributes its full 3.0 here; the final clamp bounds the sum.
    let frequency_factor = n_f / FREQUENCY_NORM;

    record.trust_score = clamp01(
        positive_ratio * TRUST_W_POSITIVE
            + response_factor * TRUST_W_RESPONSE
            + frequency_factor * TRUST_W_FREQUENCY,
    );
    record.response_rate = interactions.iter().filter(|i| i.received > 0).count() as f64 / n_f;
    record.communication_frequency = n as u32;
    record.relationship = infer_relationship(record.trust_score, n, avg_response_secs, interactions);
    record.preferred_tone =
        infer_tone(positive as f64 / n_f, negative as f64 / n_f).or(record.preferred_tone);
    record.last_interaction = chrono::Utc::now().to_rfc3339();

    info!(
        "[trust] {} → score {:.3}, {:?}, response rate {:.2}",
        record.contact_email, record.trust_score, record.relationship, record.response_rate
    );
    Ok(())
}

/// First matching rule wins, evaluated in this order.
fn infer_relationship(
    trust_score: f64,
    n: usize,
    avg_response_secs: f64,
    interactions: &[ContactInteraction],
) -> RelationshipType {
    if n > 50 && trust_score > 0.8 {
        return RelationshipType::Colleague;
    }
    if avg_response_secs < 3600.0 && trust_score > 0.7 {
        return RelationshipType::Friend;
    }
    if interactions.iter().any(|i| i.sent > 2 * i.received) {
        return RelationshipType::Client;
    }
    RelationshipType::Unknown
}

/// A strongly positive history suggests the contact responds to warmth;
/// a sour one says keep it strictly professional. In between we leave the
/// current value alone.
fn infer_tone(positive_ratio: f64, negative_ratio: f64) -> Option<Tone> {
    if positive_ratio >= 0.7 {
        Some(Tone::Friendly)
    } else if negative_ratio >= 0.3 {
        Some(Tone::Professional)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interaction(sent: u32, received: u32, rt: f64, sentiment: Sentiment) -> ContactInteraction {
        ContactInteraction { sent, received, response_time_seconds: rt, sentiment }
    }

    fn batch(n: usize, positive: usize, rt: f64) -> Vec<ContactInteraction> {
        (0..n)
            .map(|i| {
                let s = if i < positive { Sentiment::Positive } else { Sentiment::Neutral };
                interaction(1, 1, rt, s)
            })
            .collect()
    }

    #[test]
    fn test_worked_example() {
        // 10 interactions, 8 positive, 1h average response:
        // 0.8*0.4 + (3600/86400)*0.3 + (10/100)*0.3 = 0.3625
        let mut rec = ContactTrustRecord::new("u1", "a@example.com");
        derive_trust(&mut rec, &batch(10, 8, 3600.0)).unwrap();
        assert!((rec.trust_score - 0.3625).abs() < 1e-9, "got {}", rec.trust_score);
        assert_eq!(rec.communication_frequency, 10);
        assert_eq!(rec.response_rate, 1.0);
    }

    #[test]
    fn test_empty_batch_rejected() {
        let mut rec = ContactTrustRecord::new("u1", "a@example.com");
        let err = derive_trust(&mut rec, &[]).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn test_trust_clamped_for_huge_batches() {
        // 300 interactions → frequency factor 3.0 before weighting; the
        // final score still lands inside [0, 1].
        let mut rec = ContactTrustRecord::new("u1", "a@example.com");
        derive_trust(&mut rec, &batch(300, 300, 86_400.0)).unwrap();
        assert_eq!(rec.trust_score, 1.0);
    }

    #[test]
    fn test_relationship_colleague() {
        // N > 50 with a high score: all positive, slow responses, big batch.
        // 1.0*0.4 + 1.0*0.3 + 0.6*0.3 = 0.88
        let mut rec = ContactTrustRecord::new("u1", "c@example.com");
        derive_trust(&mut rec, &batch(60, 60, 86_400.0)).unwrap();
        assert!(rec.trust_score > 0.8);
        assert_eq!(rec.relationship, RelationshipType::Colleague);
    }

    #[test]
    fn test_relationship_friend() {
        // Fast responses and decent trust, but N ≤ 50 blocks the colleague rule.
        // 1.0*0.4 + (1800/86400)*0.3 + 0.5*0.3 ≈ 0.556 — not enough; raise
        // frequency: N=100 exceeds 50 but trust 0.706 < 0.8 so the colleague
        // rule falls through to friend.
        let mut rec = ContactTrustRecord::new("u1", "f@example.com");
        derive_trust(&mut rec, &batch(100, 100, 1800.0)).unwrap();
        assert!(rec.trust_score > 0.7 && rec.trust_score <= 0.8, "got {}", rec.trust_score);
        assert_eq!(rec.relationship, RelationshipType::Friend);
    }

    #[test]
    fn test_relationship_client_on_outbound_skew() {
        let mut interactions = batch(10, 2, 50_000.0);
        interactions[0] = interaction(5, 1, 50_000.0, Sentiment::Neutral);
        let mut rec = ContactTrustRecord::new("u1", "client@example.com");
        derive_trust(&mut rec, &interactions).unwrap();
        assert_eq!(rec.relationship, RelationshipType::Client);
    }

    #[test]
    fn test_relationship_unknown_by_default() {
        let mut rec = ContactTrustRecord::new("u1", "x@example.com");
        derive_trust(&mut rec, &batch(5, 1, 50_000.0)).unwrap();
        assert_eq!(rec.relationship, RelationshipType::Unknown);
    }

    #[test]
    fn test_preferred_tone_from_sentiment_mix() {
        let mut rec = ContactTrustRecord::new("u1", "t@example.com");
        derive_trust(&mut rec, &batch(10, 8, 3600.0)).unwrap();
        assert_eq!(rec.preferred_tone, Some(Tone::Friendly));

        // Mixed history keeps whatever was already inferred.
        derive_trust(&mut rec, &batch(10, 5, 3600.0)).unwrap();
        assert_eq!(rec.preferred_tone, Some(Tone::Friendly));

        // A sour stretch flips it to professional.
        let sour: Vec<ContactInteraction> =
            (0..10).map(|_| interaction(1, 1, 3600.0, Sentiment::Negative)).collect();
        derive_trust(&mut rec, &sour).unwrap();
        assert_eq!(rec.preferred_tone, Some(Tone::Professional));
    }

    #[test]
    fn test_response_rate_counts_received() {
        let interactions = vec![
            interaction(1, 1, 100.0, Sentiment::Neutral),
            interaction(1, 0, 100.0, Sentiment::Neutral),
            interaction(1, 2, 100.0, Sentiment::Neutral),
            interaction(1, 0, 100.0, Sentiment::Neutral),
        ];
        let mut rec = ContactTrustRecord::new("u1", "r@example.com");
        derive_trust(&mut rec, &interactions).unwrap();
        assert_eq!(rec.response_rate, 0.5);
    }
}
