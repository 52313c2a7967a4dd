//! CSV encoding of [`ReplyRecord`] rows.
//!
//! Columns: `review, at, source, sentiment, score, category`. `at` is written
//! as RFC 3339 and read back as RFC 3339 or `YYYY-MM-DD HH:MM:SS[.f]±HH:MM`.
//! An empty `category` reads as `None`.

use std::io::{Read, Write};

use chrono::{DateTime, Utc};
use csv::{Reader, StringRecord, Writer};
use sentimeter_core::{Category, ReplyRecord, Sentiment};

use crate::error::StoreError;

pub(crate) const HEADER: [&str; 6] = ["review", "at", "source", "sentiment", "score", "category"];

const LEGACY_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%z";

/// Write `records` as CSV, header first.
///
/// # Errors
///
/// Returns [`StoreError::Csv`] if the underlying writer fails.
pub fn write_records_csv<W: Write>(writer: W, records: &[ReplyRecord]) -> Result<(), StoreError> {
    let mut writer = Writer::from_writer(writer);
    writer.write_record(HEADER)?;

    for record in records {
        let at = record.at.to_rfc3339();
        let score = record.score.to_string();
        writer.write_record([
            record.review.as_str(),
            at.as_str(),
            record.source.as_str(),
            record.sentiment.as_str(),
            score.as_str(),
            record.category.map_or("", Category::as_str),
        ])?;
    }

    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Read records written by [`write_records_csv`] (or an older cache layout).
///
/// Columns are located by header name. The `category` column may be absent,
/// in which case every record has `category: None`.
///
/// # Errors
///
/// [`StoreError::MissingColumn`] for a missing required header,
/// [`StoreError::InvalidRow`] for a row that does not parse.
pub fn read_records_csv<R: Read>(reader: R) -> Result<Vec<ReplyRecord>, StoreError> {
    let mut reader = Reader::from_reader(reader);
    let columns = Columns::locate(reader.headers()?)?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let line = row.position().map_or(0, csv::Position::line);
        records.push(columns.parse(&row).map_err(|reason| StoreError::InvalidRow { line, reason })?);
    }
    Ok(records)
}

struct Columns {
    review: usize,
    at: usize,
    source: usize,
    sentiment: usize,
    score: usize,
    category: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, StoreError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &'static str| find(name).ok_or(StoreError::MissingColumn(name));
        Ok(Self {
            review: require("review")?,
            at: require("at")?,
            source: require("source")?,
            sentiment: require("sentiment")?,
            score: require("score")?,
            category: find("category"),
        })
    }

    fn parse(&self, row: &StringRecord) -> Result<ReplyRecord, String> {
        let field = |idx: usize| row.get(idx).unwrap_or_default();

        let at = parse_at(field(self.at)).ok_or_else(|| format!("bad timestamp '{}'", field(self.at)))?;
        let sentiment = Sentiment::parse(field(self.sentiment))
            .ok_or_else(|| format!("bad sentiment '{}'", field(self.sentiment)))?;
        let score: f32 = field(self.score)
            .trim()
            .parse()
            .map_err(|_| format!("bad score '{}'", field(self.score)))?;
        let category = self.category.map(field).and_then(parse_category);

        Ok(ReplyRecord {
            review: field(self.review).to_owned(),
            at,
            source: field(self.source).to_owned(),
            sentiment,
            score,
            category,
        })
    }
}

fn parse_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, LEGACY_AT_FORMAT))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Empty means "never categorized"; unknown labels become `Unclassified`.
fn parse_category(raw: &str) -> Option<Category> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Some(Category::parse(raw).unwrap_or_else(|| Category::from_model_output(raw)))
}
