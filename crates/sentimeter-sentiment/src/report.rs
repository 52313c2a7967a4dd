use crate::error::SentimentError;
use crate::llm::{ChatClient, ChatMessage, ChatRequest};

const REPORT_PROMPT: &str = "\
You analyse customer feedback and recommend product improvements.

Write a concise, professional improvement report for {company} based on the negative \
replies below.

Negative replies:
{comments}

Guidelines:
- Summarize the recurring issues.
- Suggest concrete, actionable improvements.
- Keep it to 100-150 words.
- Keep the tone constructive.
";

/// Drafts an improvement narrative from negative replies.
pub struct ReportWriter {
    chat: ChatClient,
    model: String,
}

impl ReportWriter {
    #[must_use]
    pub fn new(chat: ChatClient, model: &str) -> Self {
        Self {
            chat,
            model: model.to_owned(),
        }
    }

    /// Generate improvement prose for `company` from `negative_texts`, in order.
    ///
    /// # Errors
    ///
    /// [`SentimentError::NoInput`] for an empty list; otherwise propagates
    /// [`ChatClient::complete`] failures.
    pub async fn improvement_report(
        &self,
        company: &str,
        negative_texts: &[String],
    ) -> Result<String, SentimentError> {
        if negative_texts.is_empty() {
            return Err(SentimentError::NoInput);
        }
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(report_prompt(company, negative_texts))],
            temperature: 0.7,
            max_tokens: 400,
        };
        self.chat.complete(&request).await
    }
}

fn report_prompt(company: &str, negative_texts: &[String]) -> String {
    REPORT_PROMPT
        .replace("{company}", company)
        .replace("{comments}", &negative_texts.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_company_and_comments_in_order() {
        let prompt = report_prompt(
            "PineLabs",
            &["first complaint".to_owned(), "second complaint".to_owned()],
        );
        assert!(prompt.contains("for PineLabs"));
        assert!(prompt.contains("first complaint\nsecond complaint"));
    }
}
