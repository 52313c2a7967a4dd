//! Integration tests for the model clients and the annotation pipeline.
//!
//! A `wiremock` server stands in for the TEI `/predict` endpoint and the
//! chat completions API.

use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sentimeter_core::{Category, RawReply, Sentiment};
use sentimeter_sentiment::{
    annotate_replies, Categorizer, ChatClient, Classifier, ClassifierSettings, HttpSettings,
    ReportWriter, SentimentError,
};

fn http(max_retries: u32) -> HttpSettings {
    HttpSettings {
        timeout_secs: 5,
        user_agent: "sentimeter-test/0.1".to_owned(),
        max_retries,
        backoff_base_ms: 0,
    }
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
    })
}

fn reply(text: &str) -> RawReply {
    RawReply {
        review: text.to_owned(),
        at: Utc.with_ymd_and_hms(2025, 3, 4, 10, 0, 0).unwrap(),
        source: "PineLabs".to_owned(),
    }
}

fn lexicon() -> Classifier {
    Classifier::from_settings(&ClassifierSettings {
        url: None,
        http: http(0),
    })
    .unwrap()
}

fn categorizer_for(server: &MockServer, max_retries: u32) -> Categorizer {
    let chat = ChatClient::new(&server.uri(), "test-key", &http(max_retries)).unwrap();
    Categorizer::new(chat, "category-model")
}

// ---------------------------------------------------------------------------
// TEI classifier
// ---------------------------------------------------------------------------

#[tokio::test]
async fn tei_picks_highest_scoring_label() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .and(body_partial_json(json!({ "inputs": "@user settlement is late" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "label": "neutral", "score": 0.2 },
            { "label": "negative", "score": 0.75 },
            { "label": "positive", "score": 0.05 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let classifier = Classifier::from_settings(&ClassifierSettings {
        url: Some(server.uri()),
        http: http(0),
    })
    .unwrap();
    let prediction = classifier
        .classify("@PineLabs settlement is late")
        .await
        .unwrap();

    assert_eq!(prediction.sentiment, Sentiment::Negative);
    assert!((prediction.score - 0.75).abs() < 1e-6);
}

#[tokio::test]
async fn tei_accepts_nested_label_ids() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([[
            { "label": "LABEL_2", "score": 0.9 },
            { "label": "LABEL_0", "score": 0.1 }
        ]])))
        .mount(&server)
        .await;

    let classifier = Classifier::from_settings(&ClassifierSettings {
        url: Some(server.uri()),
        http: http(0),
    })
    .unwrap();
    let prediction = classifier.classify("love it").await.unwrap();
    assert_eq!(prediction.sentiment, Sentiment::Positive);
}

#[tokio::test]
async fn tei_unknown_label_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "label": "joy", "score": 0.9 }])),
        )
        .mount(&server)
        .await;

    let classifier = Classifier::from_settings(&ClassifierSettings {
        url: Some(server.uri()),
        http: http(0),
    })
    .unwrap();
    let result = classifier.classify("hi").await;
    assert!(matches!(result, Err(SentimentError::Classifier(_))));
}

// ---------------------------------------------------------------------------
// Chat completions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn categorizer_sends_bearer_key_and_deterministic_settings() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "category-model",
            "temperature": 0.0,
            "max_tokens": 50
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Device issue")))
        .expect(1)
        .mount(&server)
        .await;

    let categorizer = categorizer_for(&server, 0);
    let category = categorizer.categorize("terminal keeps rebooting").await.unwrap();
    assert_eq!(category, Category::DeviceIssue);
}

#[tokio::test]
async fn categorizer_maps_free_text_to_unclassified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion("I'm not sure, maybe billing?")),
        )
        .mount(&server)
        .await;

    let categorizer = categorizer_for(&server, 0);
    let category = categorizer.categorize("hmm").await.unwrap();
    assert_eq!(category, Category::Unclassified);
}

#[tokio::test]
async fn chat_server_error_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("pricing")))
        .mount(&server)
        .await;

    let categorizer = categorizer_for(&server, 2);
    assert_eq!(
        categorizer.categorize("fees too high").await.unwrap(),
        Category::Pricing
    );
}

#[tokio::test]
async fn empty_completion_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let categorizer = categorizer_for(&server, 0);
    let result = categorizer.categorize("x").await;
    assert!(matches!(result, Err(SentimentError::EmptyCompletion { .. })));
}

#[tokio::test]
async fn report_writer_uses_report_settings() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "model": "report-model",
            "max_tokens": 400
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion("  Speed up settlements.  ")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let chat = ChatClient::new(&server.uri(), "test-key", &http(0)).unwrap();
    let writer = ReportWriter::new(chat, "report-model");
    let report = writer
        .improvement_report("PineLabs", &["settlement delayed".to_owned()])
        .await
        .unwrap();
    assert_eq!(report, "Speed up settlements.");
}

#[tokio::test]
async fn report_writer_rejects_empty_input_without_calling() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let chat = ChatClient::new(&server.uri(), "test-key", &http(0)).unwrap();
    let writer = ReportWriter::new(chat, "report-model");
    let result = writer.improvement_report("PineLabs", &[]).await;
    assert!(matches!(result, Err(SentimentError::NoInput)));
}

// ---------------------------------------------------------------------------
// Annotation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn annotate_preserves_order_and_fills_every_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("settlement")))
        .mount(&server)
        .await;

    let classifier = lexicon();
    let categorizer = categorizer_for(&server, 0);
    let replies = vec![
        reply("great and quick support, thanks"),
        reply("worst experience, payment failed"),
        reply("what is the status"),
    ];

    let records = annotate_replies(replies, &classifier, &categorizer, 2)
        .await
        .unwrap();

    let sentiments: Vec<Sentiment> = records.iter().map(|r| r.sentiment).collect();
    assert_eq!(
        sentiments,
        vec![Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral]
    );
    assert!(records
        .iter()
        .all(|r| r.category == Some(Category::Settlement) && r.source == "PineLabs"));
    assert_eq!(records[1].review, "worst experience, payment failed");
}

#[tokio::test]
async fn annotate_aborts_on_persistent_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
        .mount(&server)
        .await;

    let classifier = lexicon();
    let categorizer = categorizer_for(&server, 3);
    let result = annotate_replies(vec![reply("a"), reply("b")], &classifier, &categorizer, 4).await;

    assert!(matches!(
        result,
        Err(SentimentError::UnexpectedStatus { status: 401, .. })
    ));
}

#[tokio::test]
async fn annotate_empty_input_makes_no_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("pricing")))
        .expect(0)
        .mount(&server)
        .await;

    let classifier = lexicon();
    let categorizer = categorizer_for(&server, 0);
    let records = annotate_replies(Vec::new(), &classifier, &categorizer, 4)
        .await
        .unwrap();
    assert!(records.is_empty());
}
