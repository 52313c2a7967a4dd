use sentimeter_core::{RawReply, TrackedCompanies};

/// Resolve a queried handle to its canonical company name.
///
/// Unknown sources pass through unchanged so nothing is silently dropped.
#[must_use]
pub fn normalize_source(companies: &TrackedCompanies, source: &str) -> String {
    companies
        .canonical_name(source)
        .map_or_else(|| source.to_owned(), str::to_owned)
}

/// Rewrite every reply's `source` to its canonical company name.
///
/// Alias handles (e.g. a support account) fold into the owning company.
pub fn normalize_sources(companies: &TrackedCompanies, replies: &mut [RawReply]) {
    for reply in replies.iter_mut() {
        let canonical = normalize_source(companies, &reply.source);
        if canonical != reply.source {
            reply.source = canonical;
        }
    }
}
