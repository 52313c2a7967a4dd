//! Payments-support lexicon scorer.
//!
//! Used as the sentiment classifier when no model endpoint is configured.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Word weights for merchant-payments support replies.
///
/// Keys are lowercase single words. Positive weights in `(0.0, 1.0]`,
/// negative in `[-1.0, 0.0)`.
pub(crate) const LEXICON: &[(&str, f32)] = &[
    // Positive signals
    ("thanks", 0.3),
    ("thank", 0.3),
    ("thankyou", 0.3),
    ("great", 0.4),
    ("good", 0.3),
    ("excellent", 0.5),
    ("awesome", 0.5),
    ("amazing", 0.5),
    ("love", 0.5),
    ("best", 0.5),
    ("helpful", 0.4),
    ("resolved", 0.5),
    ("quick", 0.3),
    ("fast", 0.3),
    ("smooth", 0.4),
    ("seamless", 0.4),
    ("easy", 0.3),
    ("reliable", 0.4),
    ("appreciate", 0.4),
    ("happy", 0.4),
    ("prompt", 0.3),
    ("recommend", 0.4),
    ("success", 0.3),
    ("successful", 0.3),
    // Negative signals
    ("worst", -0.7),
    ("pathetic", -0.7),
    ("terrible", -0.6),
    ("horrible", -0.6),
    ("useless", -0.6),
    ("fraud", -0.8),
    ("scam", -0.8),
    ("cheated", -0.7),
    ("bad", -0.4),
    ("poor", -0.4),
    ("failed", -0.5),
    ("failure", -0.5),
    ("stuck", -0.4),
    ("pending", -0.3),
    ("delay", -0.4),
    ("delayed", -0.4),
    ("deducted", -0.4),
    ("blocked", -0.5),
    ("unresolved", -0.5),
    ("complaint", -0.4),
    ("disappointed", -0.5),
    ("waiting", -0.3),
    ("slow", -0.3),
    ("issue", -0.2),
    ("problem", -0.3),
    ("error", -0.3),
    ("never", -0.3),
    ("no", -0.1),
    ("not", -0.2),
];

static INDEX: LazyLock<HashMap<&'static str, f32>> =
    LazyLock::new(|| LEXICON.iter().copied().collect());

/// Score a text string using the lexicon.
///
/// Splits text into lowercase words, sums matching weights, and clamps
/// the result to `[-1.0, 1.0]`. Returns `0.0` for empty or unknown text.
#[must_use]
pub fn lexicon_score(text: &str) -> f32 {
    let score: f32 = text
        .split_whitespace()
        .filter_map(|word| {
            let w = word
                .trim_matches(|c: char| !c.is_alphabetic())
                .to_lowercase();
            INDEX.get(w.as_str()).copied()
        })
        .sum();
    score.clamp(-1.0, 1.0)
}
