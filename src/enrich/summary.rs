//! Summary provider adapter.
//!
//! Asks the summarization service for a text summary of the page. This is
//! the optional enrichment step: any failure degrades to the sentinel value
//! and never aborts bookmark creation. One attempt, no retries.

/// Sentinel stored when no summary could be produced
pub const SUMMARY_UNAVAILABLE: &str = "Summary is unavailable.";

/// Fetch a summary for `url` from the service at `base`.
///
/// The page URL is appended to the base as a path, the convention used by
/// reader-style services (e.g. https://r.jina.ai/https://example.com).
pub async fn fetch(client: &reqwest::Client, base: &str, url: &str) -> String {
    let endpoint = format!("{}/{}", base.trim_end_matches('/'), url);

    let response = match client.get(&endpoint).send().await {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(url = %url, error = %err, "Summary fetch failed, using sentinel");
            return SUMMARY_UNAVAILABLE.to_string();
        }
    };

    if !response.status().is_success() {
        tracing::warn!(url = %url, status = %response.status(), "Summarizer returned an error status, using sentinel");
        return SUMMARY_UNAVAILABLE.to_string();
    }

    match response.text().await {
        Ok(text) => text.trim().to_string(),
        Err(err) => {
            tracing::warn!(url = %url, error = %err, "Summary body read failed, using sentinel");
            SUMMARY_UNAVAILABLE.to_string()
        }
    }
}
