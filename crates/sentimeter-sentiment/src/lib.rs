//! Reply annotation for sentimeter.
//!
//! Classifies each reply's sentiment (a TEI-hosted model, or the built-in
//! payments lexicon when none is configured), asks a hosted chat model for its
//! topic category, and drafts improvement narratives from negative replies.

pub mod annotate;
pub mod categorizer;
pub mod classifier;
pub mod error;
pub mod llm;
pub mod report;
pub mod scorer;

mod retry;

pub use annotate::annotate_replies;
pub use categorizer::Categorizer;
pub use classifier::{preprocess, Classifier, ClassifierSettings, Prediction};
pub use error::SentimentError;
pub use llm::{ChatClient, ChatMessage, ChatRequest, HttpSettings};
pub use report::ReportWriter;
pub use scorer::lexicon_score;
