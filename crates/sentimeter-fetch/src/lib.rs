//! Reply collection from the advanced-search API.
//!
//! Pages through `to:<handle>` searches for every tracked handle, maps each
//! item to a [`sentimeter_core::RawReply`], and folds alias handles into their
//! canonical company name.

pub mod client;
pub mod collect;
pub mod error;
pub mod normalize;
pub mod types;
pub mod window;

mod retry;

pub use client::{FetchOutcome, SearchClient};
pub use collect::fetch_all_replies;
pub use error::FetchError;
pub use normalize::{normalize_source, normalize_sources};
pub use types::{parse_created_at, SearchResponse, SearchTweet};
pub use window::SearchWindow;
