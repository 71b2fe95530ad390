//! Header utilities for upstream requests
//!
//! The backend only serves its chat API to its own web front end, so every
//! outbound request carries the same browser-identity header set the front
//! end sends. Client headers are never forwarded upstream.

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, COOKIE, ORIGIN, PRAGMA, REFERER,
    USER_AGENT,
};

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:123.0) Gecko/20100101 Firefox/123.0";

/// Build the browser-identity headers attached to every upstream request
pub fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();

    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("de,en-US;q=0.7,en;q=0.3"),
    );
    headers.insert(REFERER, HeaderValue::from_static("https://duckduckgo.com/"));
    headers.insert(ORIGIN, HeaderValue::from_static("https://duckduckgo.com"));
    headers.insert(COOKIE, HeaderValue::from_static("dcm=1"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("empty"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("cors"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("same-origin"),
    );

    headers
}
