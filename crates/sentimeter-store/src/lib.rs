//! On-disk persistence for annotated replies.
//!
//! One CSV file per (lookback window, tracked-handle fingerprint), served
//! while younger than the staleness threshold and rebuilt from a
//! [`RecordSource`] otherwise.

pub mod cache;
pub mod codec;
pub mod error;
pub mod export;

pub use cache::{BoxError, CacheEntry, RecordSource, ReplyCache};
pub use codec::{read_records_csv, write_records_csv};
pub use error::StoreError;
pub use export::export_csv;
