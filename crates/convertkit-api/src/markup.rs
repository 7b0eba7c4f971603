//! Legacy form and landing page markup retrieval.
//!
//! Legacy resources are served as full HTML documents from public URLs.
//! Fetches require no authentication; the document's relative links are
//! rewritten to absolute URLs so the markup can be embedded on another
//! origin, and results are cached per URL in a client-owned cache with
//! explicit invalidation.

use std::sync::OnceLock;
use std::time::Duration;

use regex::{Captures, Regex};
use reqwest::Method;
use url::Url;

use crate::client::ConvertKitClient;
use crate::error::ApiError;
use crate::logging::LogLevel;
use crate::request::RequestSpec;

/// Sizing for the client-owned legacy markup cache.
#[derive(Debug, Clone)]
pub struct MarkupCacheConfig {
    /// Time-to-live for cached documents.
    pub ttl: Duration,
    /// Maximum number of cached documents.
    pub max_capacity: u64,
}

impl Default for MarkupCacheConfig {
    fn default() -> Self {
        Self {
            // Legacy documents change rarely; a day keeps embeds fresh
            // without refetching on every page render.
            ttl: Duration::from_secs(24 * 60 * 60),
            max_capacity: 100,
        }
    }
}

/// Matches `href`/`src`/`action` attributes with single- or double-quoted
/// values.
const ATTRIBUTE_PATTERN: &str = r#"(?i)\b(href|src|action)\s*=\s*(?:"([^"]*)"|'([^']*)')"#;

fn attribute_regex() -> &'static Regex {
    static ATTRIBUTE: OnceLock<Regex> = OnceLock::new();
    ATTRIBUTE.get_or_init(|| Regex::new(ATTRIBUTE_PATTERN).expect("attribute pattern is valid"))
}

impl ConvertKitClient {
    /// Fetch the HTML markup for a legacy form or legacy landing page.
    ///
    /// Relative `href`, `src` and `action` attribute values are rewritten
    /// against the document's scheme and host. Already-absolute URLs and
    /// protocol-relative Google Fonts references are left untouched.
    ///
    /// # Errors
    ///
    /// [`ApiError::InvalidArgument`] for a URL that is not absolute
    /// `http(s)`; otherwise the usual engine errors.
    pub async fn legacy_markup(&self, url: &str) -> Result<String, ApiError> {
        let parsed = Url::parse(url)
            .map_err(|_| ApiError::InvalidArgument(format!("invalid markup URL: {url}")))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(ApiError::InvalidArgument(format!(
                "invalid markup URL: {url}"
            )));
        }

        self.log(LogLevel::Info, &format!("Getting markup from {url}."));

        if let Some(cached) = self.markup_cache.get(url) {
            self.log(LogLevel::Info, "Markup already cached.");
            return Ok(cached);
        }

        let spec = RequestSpec::absolute(Method::GET, parsed.clone())
            .without_auth()
            .content_type("text/html");
        let body = self.fetch_raw(spec).await?;

        let origin = parsed.origin().ascii_serialization();
        let rewritten = rewrite_relative_urls(&body, &origin);

        self.markup_cache.insert(url.to_string(), rewritten.clone());
        Ok(rewritten)
    }

    /// Drop the cached markup for one URL.
    pub fn invalidate_markup(&self, url: &str) {
        self.markup_cache.invalidate(url);
    }

    /// Drop all cached markup.
    pub fn clear_markup_cache(&self) {
        self.markup_cache.invalidate_all();
    }
}

/// Rewrite relative link attributes to absolute URLs against `origin`.
fn rewrite_relative_urls(html: &str, origin: &str) -> String {
    attribute_regex()
        .replace_all(html, |caps: &Captures<'_>| {
            let attribute = &caps[1];
            let (quote, value) = match (caps.get(2), caps.get(3)) {
                (Some(value), _) => ('"', value.as_str()),
                (_, Some(value)) => ('\'', value.as_str()),
                _ => return caps[0].to_string(),
            };

            if value.is_empty()
                || Url::parse(value).is_ok()
                || value.contains("//fonts.googleapis.com")
            {
                return caps[0].to_string();
            }

            format!("{attribute}={quote}{origin}{value}{quote}")
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://pages.example.com";

    #[test]
    fn relative_attributes_are_rewritten_to_absolute() {
        let html = r#"<a href="/offers"><img src='/assets/logo.png'><form action="/subscribe">"#;
        let rewritten = rewrite_relative_urls(html, ORIGIN);
        assert_eq!(
            rewritten,
            "<a href=\"https://pages.example.com/offers\">\
             <img src='https://pages.example.com/assets/logo.png'>\
             <form action=\"https://pages.example.com/subscribe\">"
        );
    }

    #[test]
    fn absolute_urls_are_left_untouched() {
        let html = r#"<link href="https://cdn.example.com/app.css"><a href="mailto:team@example.com">"#;
        assert_eq!(rewrite_relative_urls(html, ORIGIN), html);
    }

    #[test]
    fn google_fonts_references_are_skipped() {
        let html = r#"<link href="//fonts.googleapis.com/css?family=Lato">"#;
        assert_eq!(rewrite_relative_urls(html, ORIGIN), html);
    }

    #[test]
    fn empty_attribute_values_are_skipped() {
        let html = r#"<a href="">"#;
        assert_eq!(rewrite_relative_urls(html, ORIGIN), html);
    }
}
