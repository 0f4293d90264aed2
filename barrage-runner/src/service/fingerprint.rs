//! Request fingerprinting
//!
//! Builds the parts of an outgoing request that vary per call: the
//! cache-busted URL, the browser-like header set and the synthetic body.

use barrage_core::domain::profile::LoadProfile;
use rand::Rng;
use rand::distributions::Alphanumeric;
use reqwest::header::{
    ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CACHE_CONTROL, CONNECTION, CONTENT_TYPE, HeaderMap,
    HeaderName, HeaderValue, PRAGMA, USER_AGENT,
};

/// Query parameter appended when cache-busting is enabled
pub const CACHE_BUST_PARAM: &str = "_cb";

/// Rotation pool for the default User-Agent
pub const USER_AGENTS: [&str; 5] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0.2478.51",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1",
];

/// Returns the URL a single request should hit
pub fn effective_url<R: Rng>(profile: &LoadProfile, rng: &mut R) -> String {
    if !profile.cache_busting {
        return profile.target_url.clone();
    }

    let token: String = std::iter::repeat_with(|| char::from(rng.sample(Alphanumeric)))
        .take(8)
        .collect();
    let value = format!("{}-{}", chrono::Utc::now().timestamp_millis(), token);
    with_query_param(&profile.target_url, CACHE_BUST_PARAM, &value)
}

/// Appends `name=value` to the query string, ahead of any fragment
pub fn with_query_param(url: &str, name: &str, value: &str) -> String {
    let (base, fragment) = match url.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (url, None),
    };

    let separator = if base.contains('?') { '&' } else { '?' };
    let mut out = format!("{}{}{}={}", base, separator, name, value);
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

/// Default browser-like headers with the profile's headers merged on top
pub fn build_headers<R: Rng>(profile: &LoadProfile, rng: &mut R) -> Result<HeaderMap, String> {
    let mut headers = HeaderMap::new();

    let agent = USER_AGENTS[rng.gen_range(0..USER_AGENTS.len())];
    headers.insert(USER_AGENT, HeaderValue::from_static(agent));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,application/json;q=0.8,*/*;q=0.7",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate, br"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

    if profile.payload_bytes() > 0 {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    for (name, value) in &profile.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| format!("Invalid header name '{}': {}", name, e))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| format!("Invalid value for header '{}': {}", name, e))?;
        headers.insert(name, value);
    }

    Ok(headers)
}

/// JSON filler body of exactly `len` bytes
pub fn synthetic_body(len: usize) -> Vec<u8> {
    const PREFIX: &[u8] = br#"{"payload":""#;
    const SUFFIX: &[u8] = br#""}"#;

    let overhead = PREFIX.len() + SUFFIX.len();
    if len < overhead {
        return vec![b'x'; len];
    }

    let mut body = Vec::with_capacity(len);
    body.extend_from_slice(PREFIX);
    body.resize(len - SUFFIX.len(), b'x');
    body.extend_from_slice(SUFFIX);
    body
}
