//! Page metadata extraction: title and favicon.
//!
//! The page is fetched once and scanned for the `<title>` element and the
//! first `<link>` whose rel attribute carries the `icon` token. Scanning is
//! byte-index based with ASCII case-insensitive matching; HTML markup is
//! ASCII even when the content is not.

use anyhow::{Context, Result};
use url::Url;

/// Sentinel title when the page has none
pub const NO_TITLE: &str = "No title found";

#[derive(Debug, Clone)]
pub struct PageMetadata {
    pub title: String,
    pub favicon: String,
}

/// Fetch a page and derive its metadata.
///
/// Any network failure propagates: this is the required enrichment step and
/// the caller aborts the whole ingestion on error. An error-status response
/// still counts as a page; its body is parsed like any other.
pub async fn fetch(client: &reqwest::Client, url: &str) -> Result<PageMetadata> {
    let page_url = Url::parse(url).with_context(|| format!("Invalid page URL: {url}"))?;

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch {url}"))?;

    let html = response
        .text()
        .await
        .with_context(|| format!("Failed to read response body from {url}"))?;

    Ok(parse(&html, &page_url))
}

/// Derive title and favicon from a page body.
pub fn parse(html: &str, page_url: &Url) -> PageMetadata {
    let title = extract_title(html).unwrap_or_else(|| NO_TITLE.to_string());

    // A missing icon link, a missing href, and an href that does not resolve
    // all fall back to /favicon.ico next to the page
    let favicon = find_icon_href(html)
        .and_then(|href| page_url.join(&href).ok())
        .map(|u| u.to_string())
        .unwrap_or_else(|| fallback_favicon(page_url));

    PageMetadata { title, favicon }
}

fn fallback_favicon(page_url: &Url) -> String {
    page_url
        .join("/favicon.ico")
        .map(|u| u.to_string())
        .unwrap_or_else(|_| "/favicon.ico".to_string())
}

/// Case-insensitive substring search over ASCII needles, returning a byte
/// offset into the original haystack.
fn find_ci(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || h.len() < n.len() || from > h.len() - n.len() {
        return None;
    }
    (from..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

fn extract_title(html: &str) -> Option<String> {
    let start = find_ci(html, "<title", 0)?;
    let after = &html[start..];
    let gt = after.find('>')?;
    let content = &after[gt + 1..];
    let end = find_ci(content, "</title>", 0)?;
    let title = content[..end].trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

/// The href of the first `<link>` whose rel attribute contains the token
/// `icon`. Returns None when no such link exists, or when the first match
/// has a missing or empty href; all of these mean the fallback favicon.
fn find_icon_href(html: &str) -> Option<String> {
    let mut pos = 0;
    while let Some(start) = find_ci(html, "<link", pos) {
        let gt = html[start..].find('>')?;
        let tag = &html[start..start + gt];

        if let Some(rel) = attr_value(tag, "rel") {
            if rel.split_whitespace().any(|t| t.eq_ignore_ascii_case("icon")) {
                return attr_value(tag, "href").filter(|href| !href.is_empty());
            }
        }

        pos = start + gt + 1;
    }
    None
}

/// Pull an attribute value out of a single tag's text. Handles double
/// quotes, single quotes, and unquoted values.
fn attr_value(tag: &str, name: &str) -> Option<String> {
    let mut search = 0;
    while let Some(idx) = find_ci(tag, name, search) {
        let preceded = tag[..idx]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_whitespace());
        let rest = tag[idx + name.len()..].trim_start();

        if preceded {
            if let Some(rest) = rest.strip_prefix('=') {
                let rest = rest.trim_start();
                let value = if let Some(r) = rest.strip_prefix('"') {
                    r.split('"').next()
                } else if let Some(r) = rest.strip_prefix('\'') {
                    r.split('\'').next()
                } else {
                    rest.split(char::is_whitespace).next()
                };
                return value.map(str::to_string);
            }
        }
        search = idx + name.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("http://example.com/posts/1").unwrap()
    }

    #[test]
    fn title_extracted_and_trimmed() {
        let meta = parse(
            "<html><head><title>  Example Post </title></head></html>",
            &page_url(),
        );
        assert_eq!(meta.title, "Example Post");
    }

    #[test]
    fn missing_or_empty_title_gets_sentinel() {
        assert_eq!(parse("<html></html>", &page_url()).title, NO_TITLE);
        assert_eq!(
            parse("<html><title>   </title></html>", &page_url()).title,
            NO_TITLE
        );
    }

    #[test]
    fn uppercase_markup_is_matched() {
        let meta = parse(
            r#"<HTML><TITLE>Shouty</TITLE><LINK REL="ICON" HREF="/i.png"></HTML>"#,
            &page_url(),
        );
        assert_eq!(meta.title, "Shouty");
        assert_eq!(meta.favicon, "http://example.com/i.png");
    }

    #[test]
    fn relative_icon_href_resolves_against_page_url() {
        let meta = parse(
            r#"<link rel="icon" href="assets/fav.png">"#,
            &page_url(),
        );
        assert_eq!(meta.favicon, "http://example.com/posts/assets/fav.png");
    }

    #[test]
    fn absolute_icon_href_is_kept() {
        let meta = parse(
            r#"<link rel="shortcut icon" href="https://cdn.example.net/fav.ico">"#,
            &page_url(),
        );
        assert_eq!(meta.favicon, "https://cdn.example.net/fav.ico");
    }

    #[test]
    fn no_icon_link_falls_back_to_favicon_ico() {
        let meta = parse("<html><title>t</title></html>", &page_url());
        assert_eq!(meta.favicon, "http://example.com/favicon.ico");
    }

    #[test]
    fn icon_link_without_href_falls_back() {
        let meta = parse(r#"<link rel="icon">"#, &page_url());
        assert_eq!(meta.favicon, "http://example.com/favicon.ico");

        let meta = parse(r#"<link rel="icon" href="">"#, &page_url());
        assert_eq!(meta.favicon, "http://example.com/favicon.ico");
    }

    #[test]
    fn unresolvable_href_falls_back() {
        let meta = parse(r#"<link rel="icon" href="http://[bad">"#, &page_url());
        assert_eq!(meta.favicon, "http://example.com/favicon.ico");
    }

    #[test]
    fn apple_touch_icon_is_not_an_icon_token() {
        // rel~=icon matches whole tokens only
        let meta = parse(
            r#"<link rel="apple-touch-icon" href="/apple.png">"#,
            &page_url(),
        );
        assert_eq!(meta.favicon, "http://example.com/favicon.ico");
    }

    #[test]
    fn first_icon_link_wins() {
        let meta = parse(
            r#"<link rel="stylesheet" href="/style.css">
               <link rel="icon" href="/first.png">
               <link rel="icon" href="/second.png">"#,
            &page_url(),
        );
        assert_eq!(meta.favicon, "http://example.com/first.png");
    }

    #[test]
    fn single_quoted_and_unquoted_attrs() {
        let meta = parse(r#"<link rel='icon' href=/plain.ico>"#, &page_url());
        assert_eq!(meta.favicon, "http://example.com/plain.ico");
    }

    #[tokio::test]
    async fn fetch_parses_served_page() {
        let mut server = mockito::Server::new_async().await;
        let html = r#"<html><head><title>Served</title><link rel="icon" href="/fav.svg"></head></html>"#;
        let mock = server
            .mock("GET", "/page")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(html)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/page", server.url());
        let meta = fetch(&client, &url).await.unwrap();

        assert_eq!(meta.title, "Served");
        assert_eq!(meta.favicon, format!("{}/fav.svg", server.url()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn fetch_parses_error_status_body_too() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/gone")
            .with_status(404)
            .with_body("<html><title>Not Here</title></html>")
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/gone", server.url());
        let meta = fetch(&client, &url).await.unwrap();
        assert_eq!(meta.title, "Not Here");
    }

    #[tokio::test]
    async fn fetch_propagates_connection_errors() {
        let client = reqwest::Client::new();
        // Port 1 is never listening
        assert!(fetch(&client, "http://127.0.0.1:1/nope").await.is_err());
    }

    #[tokio::test]
    async fn fetch_rejects_unparseable_urls() {
        let client = reqwest::Client::new();
        assert!(fetch(&client, "not a url").await.is_err());
    }
}
