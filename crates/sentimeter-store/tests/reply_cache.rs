//! Integration tests for `ReplyCache` against a temporary directory.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};

use chrono::{TimeZone, Utc};
use sentimeter_core::{Category, ReplyRecord, Sentiment};
use sentimeter_store::{
    export_csv, read_records_csv, BoxError, RecordSource, ReplyCache, StoreError,
};

const FINGERPRINT: &str = "a1b2c3d4e5f60718293a4b5c6d7e8f90";

fn record(review: &str, sentiment: Sentiment) -> ReplyRecord {
    ReplyRecord {
        review: review.to_owned(),
        at: Utc.with_ymd_and_hms(2025, 3, 4, 10, 15, 0).unwrap(),
        source: "PineLabs".to_owned(),
        sentiment,
        score: 0.5,
        category: Some(Category::Servicing),
    }
}

/// Source that counts how often it is asked for data.
struct CountingSource {
    calls: AtomicUsize,
    records: Vec<ReplyRecord>,
}

impl CountingSource {
    fn new(records: Vec<ReplyRecord>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            records,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RecordSource for CountingSource {
    async fn collect(&self, _window_days: u32) -> Result<Vec<ReplyRecord>, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.clone())
    }
}

struct FailingSource;

impl RecordSource for FailingSource {
    async fn collect(&self, _window_days: u32) -> Result<Vec<ReplyRecord>, BoxError> {
        Err("classifier unavailable".into())
    }
}

fn cache_in(dir: &std::path::Path, max_age: Duration) -> ReplyCache {
    ReplyCache::new(dir.join("cache"), max_age, FINGERPRINT)
}

#[tokio::test]
async fn second_load_within_validity_uses_cache() {
    let tmp = tempfile::tempdir().unwrap();
    let cache = cache_in(tmp.path(), Duration::from_secs(3600));
    let source = CountingSource::new(vec![
        record("first", Sentiment::Positive),
        record("second", Sentiment::Negative),
    ]);

    let first = cache.load_or_fetch(30, &source).await.unwrap();
    let second = cache.load_or_fetch(30, &source).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(source.calls(), 1);
    assert!(cache.path_for(30).exists());
}

#[tokio::test]
async fn windows_are_cached_independently() {
    let tmp = tempfile::tempdir().unwrap();
    let cache = cache_in(tmp.path(), Duration::from_secs(3600));
    let source = CountingSource::new(vec![record("x", Sentiment::Neutral)]);

    cache.load_or_fetch(7, &source).await.unwrap();
    cache.load_or_fetch(30, &source).await.unwrap();
    cache.load_or_fetch(7, &source).await.unwrap();

    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn stale_entry_is_refetched() {
    let tmp = tempfile::tempdir().unwrap();
    let cache = cache_in(tmp.path(), Duration::ZERO);
    let source = CountingSource::new(vec![record("x", Sentiment::Neutral)]);

    cache.load_or_fetch(30, &source).await.unwrap();
    cache.load_or_fetch(30, &source).await.unwrap();

    assert_eq!(source.calls(), 2);
}

#[test]
fn read_fresh_honours_max_age() {
    let tmp = tempfile::tempdir().unwrap();
    let cache = cache_in(tmp.path(), Duration::from_secs(60));
    cache.write(30, &[record("x", Sentiment::Positive)]).unwrap();

    let now = SystemTime::now();
    assert!(cache.read_fresh(30, now).is_some());
    assert!(cache.read_fresh(30, now + Duration::from_secs(120)).is_none());
    assert!(cache.read_fresh(7, now).is_none());
}

#[tokio::test]
async fn refresh_bypasses_fresh_entry() {
    let tmp = tempfile::tempdir().unwrap();
    let cache = cache_in(tmp.path(), Duration::from_secs(3600));
    let source = CountingSource::new(vec![record("x", Sentiment::Positive)]);

    cache.load_or_fetch(30, &source).await.unwrap();
    cache.refresh(30, &source).await.unwrap();

    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn failed_source_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let cache = cache_in(tmp.path(), Duration::from_secs(3600));

    let result = cache.load_or_fetch(30, &FailingSource).await;

    assert!(matches!(result, Err(StoreError::Source(_))));
    assert!(!cache.path_for(30).exists());
}

#[tokio::test]
async fn failed_refresh_keeps_previous_entry() {
    let tmp = tempfile::tempdir().unwrap();
    let cache = cache_in(tmp.path(), Duration::from_secs(3600));
    cache.write(30, &[record("earlier", Sentiment::Positive)]).unwrap();

    let result = cache.refresh(30, &FailingSource).await;

    assert!(matches!(result, Err(StoreError::Source(_))));
    let kept = cache.read_fresh(30, SystemTime::now()).unwrap();
    assert_eq!(kept[0].review, "earlier");
}

#[tokio::test]
async fn corrupt_entry_is_treated_as_absent() {
    let tmp = tempfile::tempdir().unwrap();
    let cache = cache_in(tmp.path(), Duration::from_secs(3600));
    std::fs::create_dir_all(cache.dir()).unwrap();
    std::fs::write(cache.path_for(30), "not,a,cache\nfile").unwrap();

    let source = CountingSource::new(vec![record("fresh", Sentiment::Positive)]);
    let records = cache.load_or_fetch(30, &source).await.unwrap();

    assert_eq!(source.calls(), 1);
    assert_eq!(records[0].review, "fresh");
    assert!(cache.read_fresh(30, SystemTime::now()).is_some());
}

#[test]
fn entries_list_windows_and_flag_other_handle_sets() {
    let tmp = tempfile::tempdir().unwrap();
    let cache = cache_in(tmp.path(), Duration::from_secs(3600));
    cache.write(30, &[]).unwrap();
    cache.write(7, &[]).unwrap();

    let other = ReplyCache::new(cache.dir(), Duration::from_secs(3600), "ffffffffffffffff");
    other.write(14, &[]).unwrap();
    std::fs::write(cache.dir().join("README.txt"), "ignored").unwrap();

    let entries = cache.entries(SystemTime::now()).unwrap();
    let windows: Vec<u32> = entries.iter().map(|e| e.window_days).collect();
    assert_eq!(windows, vec![7, 14, 30]);
    assert!(entries[0].fresh && entries[0].current_handles);
    assert!(!entries[1].current_handles && !entries[1].fresh);
}

#[test]
fn entries_of_missing_dir_is_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let cache = cache_in(tmp.path(), Duration::from_secs(60));
    assert!(cache.entries(SystemTime::now()).unwrap().is_empty());
}

#[test]
fn export_writes_readable_csv() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("out").join("export.csv");
    let records = vec![record("a", Sentiment::Negative), record("b", Sentiment::Positive)];

    export_csv(&path, &records).unwrap();

    let file = std::fs::File::open(&path).unwrap();
    assert_eq!(read_records_csv(file).unwrap(), records);
}
