use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Date bounds of a lookback window, as sent in the search query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    pub since: NaiveDate,
    pub until: NaiveDate,
}

impl SearchWindow {
    /// The trailing `days` ending at `now`.
    #[must_use]
    pub fn trailing(days: u32, now: DateTime<Utc>) -> Self {
        let start = now - Duration::days(i64::from(days));
        Self {
            since: start.date_naive(),
            until: now.date_naive(),
        }
    }

    /// Search expression for replies addressed to `handle`.
    #[must_use]
    pub fn query_for(&self, handle: &str) -> String {
        let handle = handle.trim_start_matches('@');
        format!("to:{handle} since:{} until:{}", self.since, self.until)
    }
}
