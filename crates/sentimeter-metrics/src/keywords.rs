use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use sentimeter_core::{ReplyRecord, Sentiment};

static URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"http\S+").expect("valid regex"));
static EMAIL_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S*@\S*\s?").expect("valid regex"));
static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));
static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

const STOP_WORDS: &[&str] = &[
    "the", "and", "is", "in", "it", "to", "that", "of", "for", "on", "with", "as", "this", "by",
    "be", "are", "was", "were", "at", "from", "has", "have", "had", "a", "an", "i", "my", "we",
    "you", "your", "our", "they", "their", "app", "pine", "labs", "would", "could", "should",
    "will", "can", "just", "not", "but", "or", "so", "what", "when", "where", "who", "how",
    "which", "there", "here", "than", "then", "them", "these", "those", "some", "such", "very",
    "much", "many", "any", "all", "one", "two", "three", "first", "last",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordCount {
    pub word: String,
    pub count: usize,
}

fn clean(text: &str) -> String {
    let text = URL.replace_all(text, "");
    let text = EMAIL_LIKE.replace_all(&text, "");
    let text = PUNCTUATION.replace_all(&text, "");
    DIGITS.replace_all(&text, "").to_lowercase()
}

/// Most frequent words across negative replies.
///
/// URLs, mentions/e-mail-like tokens, punctuation and digits are stripped
/// first. Stop words, company names seen in `records`, and words of two
/// characters or fewer are dropped. Equal counts keep first-seen order.
#[must_use]
pub fn top_negative_keywords(records: &[ReplyRecord], limit: usize) -> Vec<KeywordCount> {
    let sources: Vec<String> = records.iter().map(|r| r.source.to_lowercase()).collect();

    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in records.iter().filter(|r| r.sentiment == Sentiment::Negative) {
        for word in clean(&record.review).split_whitespace() {
            if word.chars().count() <= 2
                || STOP_WORDS.contains(&word)
                || sources.iter().any(|s| s == word)
            {
                continue;
            }
            let count = counts.entry(word.to_owned()).or_insert_with(|| {
                order.push(word.to_owned());
                0
            });
            *count += 1;
        }
    }

    let mut ranked: Vec<KeywordCount> = order
        .into_iter()
        .map(|word| {
            let count = counts.get(&word).copied().unwrap_or_default();
            KeywordCount { word, count }
        })
        .collect();
    // Stable sort keeps first-seen order among equal counts.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(limit);
    ranked
}
