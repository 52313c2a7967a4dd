use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentiment label produced by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }

    /// Parse a label case-insensitively. Returns `None` for anything else.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "positive" => Some(Sentiment::Positive),
            "neutral" => Some(Sentiment::Neutral),
            "negative" => Some(Sentiment::Negative),
            _ => None,
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Topic category assigned to a reply.
///
/// The six named variants are the closed set the category model is asked to
/// choose from. Anything the model returns outside that set is recorded as
/// [`Category::Unclassified`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    TransactionSuccess,
    Settlement,
    Servicing,
    Onboarding,
    Pricing,
    DeviceIssue,
    Unclassified,
}

impl Category {
    /// The closed set offered to the category model, in prompt order.
    pub const KNOWN: [Category; 6] = [
        Category::TransactionSuccess,
        Category::Settlement,
        Category::Servicing,
        Category::Onboarding,
        Category::Pricing,
        Category::DeviceIssue,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::TransactionSuccess => "transaction-success",
            Category::Settlement => "settlement",
            Category::Servicing => "servicing",
            Category::Onboarding => "onboarding",
            Category::Pricing => "pricing",
            Category::DeviceIssue => "device-issue",
            Category::Unclassified => "unclassified",
        }
    }

    /// Parse an exact label (including `unclassified`).
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::KNOWN
            .into_iter()
            .chain(std::iter::once(Category::Unclassified))
            .find(|c| c.as_str() == label)
    }

    /// Map free-form model output onto the closed set.
    ///
    /// Trims whitespace and surrounding punctuation, lowercases, and joins
    /// runs of spaces, underscores and hyphens with a single hyphen, so
    /// `"Transaction  success."` and `"device_issue"` both resolve. A
    /// `Response:` prefix in any case, echoed from the prompt's sample format,
    /// is ignored. Everything else is `Unclassified`.
    #[must_use]
    pub fn from_model_output(output: &str) -> Self {
        let first_line = output
            .trim()
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        let without_prefix = first_line
            .strip_prefix("response:")
            .unwrap_or(&first_line);
        let normalized = without_prefix
            .trim_matches(|c: char| !c.is_ascii_alphanumeric())
            .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
            .filter(|word| !word.is_empty())
            .collect::<Vec<_>>()
            .join("-");

        Self::KNOWN
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .unwrap_or(Category::Unclassified)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reply as returned by the fetcher, before annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReply {
    pub review: String,
    pub at: DateTime<Utc>,
    /// Queried handle until normalized, then the canonical company name.
    pub source: String,
}

/// An annotated reply, as cached and aggregated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyRecord {
    pub review: String,
    pub at: DateTime<Utc>,
    pub source: String,
    pub sentiment: Sentiment,
    /// Classifier confidence in `[0.0, 1.0]`.
    pub score: f32,
    /// `None` when a cached row carries no category at all.
    pub category: Option<Category>,
}

impl ReplyRecord {
    /// Attach annotation results to a fetched reply.
    #[must_use]
    pub fn annotated(raw: RawReply, sentiment: Sentiment, score: f32, category: Category) -> Self {
        Self {
            review: raw.review,
            at: raw.at,
            source: raw.source,
            sentiment,
            score,
            category: Some(category),
        }
    }
}
