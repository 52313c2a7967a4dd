//! Sentiment classification.
//!
//! Two backends sit behind [`Classifier`]: a Text Embeddings Inference (TEI)
//! server hosting a sequence-classification model, reached over `/predict`,
//! and the in-process payments lexicon. The process keeps one immutable
//! classifier, built on first use by [`Classifier::shared`].

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use sentimeter_core::Sentiment;

use crate::error::SentimentError;
use crate::llm::HttpSettings;
use crate::retry::retry_with_backoff;
use crate::scorer::lexicon_score;

const SERVICE: &str = "TEI";

/// Lexicon scores strictly above this are positive, strictly below its
/// negation are negative.
const LEXICON_THRESHOLD: f32 = 0.1;

static SHARED: OnceLock<Classifier> = OnceLock::new();

/// Replace user mentions with `@user` and links with `http`.
///
/// Splits on single spaces so the original spacing survives.
#[must_use]
pub fn preprocess(text: &str) -> String {
    text.split(' ')
        .map(|token| {
            if token.starts_with('@') && token.len() > 1 {
                "@user"
            } else if token.starts_with("http") {
                "http"
            } else {
                token
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One classification result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub sentiment: Sentiment,
    /// Confidence in `[0.0, 1.0]`.
    pub score: f32,
}

#[derive(Debug, Clone)]
pub struct ClassifierSettings {
    /// TEI base URL. `None` selects the lexicon backend.
    pub url: Option<String>,
    pub http: HttpSettings,
}

pub enum Classifier {
    Tei(TeiClassifier),
    Lexicon(LexiconClassifier),
}

impl Classifier {
    /// Build a classifier for `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the TEI HTTP client cannot be built.
    pub fn from_settings(settings: &ClassifierSettings) -> Result<Self, SentimentError> {
        match settings.url.as_deref() {
            Some(url) => Ok(Self::Tei(TeiClassifier::new(url, &settings.http)?)),
            None => Ok(Self::Lexicon(LexiconClassifier)),
        }
    }

    /// The process-wide classifier, initialized on first call.
    ///
    /// Later calls return the same instance and ignore `settings`.
    ///
    /// # Errors
    ///
    /// Propagates [`Classifier::from_settings`] failures from the first call.
    pub fn shared(settings: &ClassifierSettings) -> Result<&'static Self, SentimentError> {
        if let Some(existing) = SHARED.get() {
            return Ok(existing);
        }
        let built = Self::from_settings(settings)?;
        match settings.url.as_deref() {
            Some(url) => tracing::info!(url, "sentiment classifier: TEI"),
            None => tracing::info!("sentiment classifier: built-in lexicon"),
        }
        Ok(SHARED.get_or_init(|| built))
    }

    /// Classify one reply.
    ///
    /// # Errors
    ///
    /// TEI failures after retries, or a label outside the three sentiments.
    pub async fn classify(&self, text: &str) -> Result<Prediction, SentimentError> {
        let text = preprocess(text);
        match self {
            Self::Tei(tei) => tei.predict(&text).await,
            Self::Lexicon(lexicon) => Ok(lexicon.predict(&text)),
        }
    }
}

/// Rule-based fallback built on [`lexicon_score`].
pub struct LexiconClassifier;

impl LexiconClassifier {
    #[must_use]
    pub fn predict(&self, text: &str) -> Prediction {
        let raw = lexicon_score(text);
        let magnitude = raw.abs();
        if raw > LEXICON_THRESHOLD {
            Prediction {
                sentiment: Sentiment::Positive,
                score: (0.5 + magnitude / 2.0).min(1.0),
            }
        } else if raw < -LEXICON_THRESHOLD {
            Prediction {
                sentiment: Sentiment::Negative,
                score: (0.5 + magnitude / 2.0).min(1.0),
            }
        } else {
            Prediction {
                sentiment: Sentiment::Neutral,
                score: 1.0 - magnitude / LEXICON_THRESHOLD * 0.5,
            }
        }
    }
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    inputs: &'a str,
    truncate: bool,
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f32,
}

/// TEI answers a single input with a flat list, some versions nest it once.
#[derive(Deserialize)]
#[serde(untagged)]
enum PredictResponse {
    Flat(Vec<LabelScore>),
    Nested(Vec<Vec<LabelScore>>),
}

/// Client for a TEI `/predict` endpoint.
pub struct TeiClassifier {
    client: reqwest::Client,
    url: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl TeiClassifier {
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, http: &HttpSettings) -> Result<Self, SentimentError> {
        Ok(Self {
            client: http.build_client()?,
            url: format!("{}/predict", base_url.trim_end_matches('/')),
            max_retries: http.max_retries,
            backoff_base_ms: http.backoff_base_ms,
        })
    }

    /// # Errors
    ///
    /// HTTP failures after retries, an unparseable body, an empty label list,
    /// or a label that is not a known sentiment.
    pub async fn predict(&self, text: &str) -> Result<Prediction, SentimentError> {
        let labels = retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            let response = self
                .client
                .post(&self.url)
                .json(&PredictRequest {
                    inputs: text,
                    truncate: true,
                })
                .send()
                .await?;
            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(SentimentError::RateLimited {
                    service: SERVICE,
                    retry_after_secs: 1,
                });
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(SentimentError::UnexpectedStatus {
                    service: SERVICE,
                    status: status.as_u16(),
                    body: body.chars().take(200).collect(),
                });
            }

            let body = response.text().await?;
            let parsed: PredictResponse =
                serde_json::from_str(&body).map_err(|e| SentimentError::Deserialize {
                    context: "TEI /predict response".to_owned(),
                    source: e,
                })?;
            Ok(match parsed {
                PredictResponse::Flat(labels) => labels,
                PredictResponse::Nested(nested) => nested.into_iter().flatten().collect(),
            })
        })
        .await?;

        let best = labels
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .ok_or_else(|| SentimentError::Classifier("TEI returned no labels".to_owned()))?;

        let sentiment = label_to_sentiment(&best.label).ok_or_else(|| {
            SentimentError::Classifier(format!("unrecognized label '{}'", best.label))
        })?;

        Ok(Prediction {
            sentiment,
            score: best.score.clamp(0.0, 1.0),
        })
    }
}

/// Map a model label onto a sentiment.
///
/// Accepts the plain names in any case and the generic `LABEL_<n>` ids in the
/// model's negative/neutral/positive order.
fn label_to_sentiment(label: &str) -> Option<Sentiment> {
    Sentiment::parse(label).or_else(|| match label.trim().to_ascii_uppercase().as_str() {
        "LABEL_0" => Some(Sentiment::Negative),
        "LABEL_1" => Some(Sentiment::Neutral),
        "LABEL_2" => Some(Sentiment::Positive),
        _ => None,
    })
}
