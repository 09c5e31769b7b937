// Ambit Engine — Cross-Module Routing
// Detects that the user's text is better served by a different Ambit module
// (travel, shopping, hiring) and emits a routing suggestion with pre-filled
// hints so the receiving module can pick up mid-thought.
//
// Scoring is keyword-set overlap: score = |matched keywords| / |set|.
// A route is only offered above CROSS_MODULE_MIN_SCORE — weak overlap
// produces nothing rather than a noisy suggestion.

use crate::atoms::constants::CROSS_MODULE_MIN_SCORE;
use log::debug;
use regex::Regex;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::LazyLock;

// ── Module keyword sets ────────────────────────────────────────────────────
// Fixed vocabularies; set size is part of the scoring contract.

const TRAVEL_KEYWORDS: [&str; 9] = [
    "flight", "hotel", "vacation", "trip", "travel", "booking", "airport", "itinerary",
    "destination",
];

const SHOPPING_KEYWORDS: [&str; 9] = [
    "buy", "purchase", "order", "price", "product", "cart", "deal", "discount", "shipping",
];

const HIRING_KEYWORDS: [&str; 9] = [
    "candidate", "resume", "interview", "hire", "recruiter", "job", "position", "applicant",
    "salary",
];

#[derive(Debug, Clone)]
pub struct ModuleRoute {
    /// Target module id: "travel", "shopping", or "hiring".
    pub module: &'static str,
    pub score: f64,
    /// Structured hints for pre-filling the receiving module.
    pub hints: Value,
}

/// Score one keyword set against the tokenized input.
fn overlap_score(tokens: &HashSet<String>, keywords: &[&str]) -> f64 {
    let matched = keywords.iter().filter(|k| tokens.contains(**k)).count();
    matched as f64 / keywords.len() as f64
}

/// Lowercase word tokens with surrounding punctuation stripped, so
/// "flight," still counts but "buyer" does not match "buy".
fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Detect the best-scoring module route, if any clears the gate.
/// Evaluation order (travel, shopping, hiring) breaks exact ties, so the
/// result is deterministic for a given input.
pub fn detect_route(text: &str) -> Option<ModuleRoute> {
    let tokens = tokenize(text);

    let candidates = [
        ("travel", overlap_score(&tokens, &TRAVEL_KEYWORDS)),
        ("shopping", overlap_score(&tokens, &SHOPPING_KEYWORDS)),
        ("hiring", overlap_score(&tokens, &HIRING_KEYWORDS)),
    ];

    let (module, score) =
        candidates.into_iter().fold(("none", 0.0), |best, c| if c.1 > best.1 { c } else { best });

    if score <= CROSS_MODULE_MIN_SCORE {
        return None;
    }

    let hints = match module {
        "travel" => travel_hints(text),
        "shopping" => shopping_hints(text),
        "hiring" => hiring_hints(text),
        _ => return None,
    };

    debug!("[route] {} scored {:.3} on input", module, score);
    Some(ModuleRoute { module, score, hints })
}

// ── Hint extraction ────────────────────────────────────────────────────────
// Fixed pattern lists, not NLP: enough to pre-fill a search form.

static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:to|from|in|at|near)\s+([A-Z][a-zA-Z]+(?:\s[A-Z][a-zA-Z]+)?)")
        .expect("location pattern")
});

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2}/\d{1,2}(?:/\d{2,4})?|(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{1,2}|tomorrow|next (?:week|month|monday|tuesday|wednesday|thursday|friday|saturday|sunday)|this weekend)\b",
    )
    .expect("date pattern")
});

static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\s?\d[\d,]*(?:\.\d{2})?").expect("price pattern"));

static QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]{2,60})""#).expect("quoted pattern"));

static COMPANY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:at|with|for)\s+([A-Z][A-Za-z0-9]+(?:\s[A-Z][A-Za-z0-9]+)?)")
        .expect("company pattern")
});

const SKILL_TERMS: [&str; 10] =
    ["rust", "python", "java", "sql", "react", "design", "marketing", "sales", "devops", "ml"];

fn captures(re: &Regex, text: &str, limit: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for cap in re.captures_iter(text).take(limit * 2) {
        let value = cap.get(1).or_else(|| cap.get(0)).map(|m| m.as_str().trim().to_string());
        if let Some(v) = value {
            if !out.contains(&v) {
                out.push(v);
            }
        }
        if out.len() >= limit {
            break;
        }
    }
    out
}

fn travel_hints(text: &str) -> Value {
    json!({
        "locations": captures(&LOCATION_RE, text, 4),
        "dates": captures(&DATE_RE, text, 4),
    })
}

fn shopping_hints(text: &str) -> Value {
    json!({
        "products": captures(&QUOTED_RE, text, 4),
        "prices": captures(&PRICE_RE, text, 4),
    })
}

fn hiring_hints(text: &str) -> Value {
    let tokens = tokenize(text);
    let skills: Vec<&str> =
        SKILL_TERMS.iter().copied().filter(|s| tokens.contains(*s)).collect();
    json!({
        "companies": captures(&COMPANY_RE, text, 4),
        "skills": skills,
    })
}
