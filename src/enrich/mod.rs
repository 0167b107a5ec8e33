//! Page enrichment for the bookmark ingestion pipeline.
//!
//! Metadata (title + favicon) and the text summary come from two independent
//! fetches with different failure contracts: a metadata failure aborts the
//! ingestion, while a summary failure degrades to a sentinel value. The two
//! fetches run concurrently and the caller persists only after both settle.

pub mod metadata;
pub mod summary;

pub use metadata::PageMetadata;

use anyhow::Result;

#[derive(Debug, Clone)]
pub struct Enrichment {
    pub title: String,
    pub favicon: String,
    pub summary: String,
}

/// Fetch metadata and summary for a URL concurrently.
///
/// End-to-end latency is bounded by the slower of the two fetches, not
/// their sum. Only the metadata result can fail the operation.
pub async fn enrich(
    client: &reqwest::Client,
    summarizer_url: &str,
    url: &str,
) -> Result<Enrichment> {
    let (meta, summary) = tokio::join!(
        metadata::fetch(client, url),
        summary::fetch(client, summarizer_url, url),
    );

    let meta = meta?;

    Ok(Enrichment {
        title: meta.title,
        favicon: meta.favicon,
        summary,
    })
}
