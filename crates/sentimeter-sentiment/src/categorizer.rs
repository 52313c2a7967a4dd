use sentimeter_core::Category;

use crate::error::SentimentError;
use crate::llm::{ChatClient, ChatMessage, ChatRequest};

const CATEGORY_PROMPT: &str = "\
You categorize customer feedback for a merchant payments company.

Choose the single most appropriate category for the comment below from this list: \
[transaction-success, settlement, servicing, onboarding, pricing, device-issue]. \
Reply with the category name only.

Example:
Comment: I was charged twice but never got a confirmation.
Response: transaction-success

Comment: {comment}
";

/// Assigns each reply one of the fixed topic categories.
pub struct Categorizer {
    chat: ChatClient,
    model: String,
}

impl Categorizer {
    #[must_use]
    pub fn new(chat: ChatClient, model: &str) -> Self {
        Self {
            chat,
            model: model.to_owned(),
        }
    }

    /// Ask the model for a category and validate its answer.
    ///
    /// Output outside the closed set becomes [`Category::Unclassified`].
    ///
    /// # Errors
    ///
    /// Propagates [`ChatClient::complete`] failures.
    pub async fn categorize(&self, text: &str) -> Result<Category, SentimentError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(category_prompt(text))],
            temperature: 0.0,
            max_tokens: 50,
        };
        let output = self.chat.complete(&request).await?;
        let category = Category::from_model_output(&output);
        if category == Category::Unclassified {
            tracing::debug!(output = %output, "category model answered outside the closed set");
        }
        Ok(category)
    }
}

fn category_prompt(comment: &str) -> String {
    CATEGORY_PROMPT.replace("{comment}", comment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_lists_every_category() {
        let prompt = category_prompt("my settlement is late");
        for category in Category::KNOWN {
            assert!(prompt.contains(category.as_str()), "missing {category}");
        }
        assert!(prompt.ends_with("Comment: my settlement is late\n"));
    }
}
