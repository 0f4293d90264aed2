//! Load profile domain types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

pub const DEFAULT_CONCURRENCY: u32 = 10;
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Declarative description of a load test
///
/// Immutable for the lifetime of the job it was submitted with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadProfile {
    pub target_url: String,
    #[serde(default)]
    pub method: HttpMethod,
    pub iterations: u32,
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default, rename = "payloadSizeKB")]
    pub payload_size_kb: u32,
    #[serde(default)]
    pub cache_busting: bool,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_concurrency() -> u32 {
    DEFAULT_CONCURRENCY
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl LoadProfile {
    /// Creates a GET profile with default concurrency and timeout
    pub fn new(target_url: impl Into<String>, iterations: u32) -> Self {
        Self {
            target_url: target_url.into(),
            method: HttpMethod::Get,
            iterations,
            concurrency: DEFAULT_CONCURRENCY,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            payload_size_kb: 0,
            cache_busting: false,
            headers: HashMap::new(),
        }
    }

    /// Size in bytes of the synthetic request body, zero when none is sent
    pub fn payload_bytes(&self) -> usize {
        if self.method == HttpMethod::Post {
            self.payload_size_kb as usize * 1024
        } else {
            0
        }
    }

    /// Checks the profile against structural rules and the configured ceilings
    pub fn validate(&self, limits: &ProfileLimits) -> Result<(), ProfileError> {
        let url = url::Url::parse(&self.target_url)
            .map_err(|e| ProfileError::InvalidUrl(format!("{}: {}", self.target_url, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ProfileError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }

        if self.concurrency == 0 {
            return Err(ProfileError::OutOfRange {
                field: "concurrency",
                reason: "must be at least 1".to_string(),
            });
        }

        if self.timeout_ms == 0 {
            return Err(ProfileError::OutOfRange {
                field: "timeoutMs",
                reason: "must be at least 1".to_string(),
            });
        }

        check_ceiling("iterations", self.iterations as u64, limits.max_iterations as u64)?;
        check_ceiling("concurrency", self.concurrency as u64, limits.max_concurrency as u64)?;
        check_ceiling("timeoutMs", self.timeout_ms, limits.max_timeout_ms)?;
        check_ceiling(
            "payloadSizeKB",
            self.payload_size_kb as u64,
            limits.max_payload_kb as u64,
        )?;

        for (name, value) in &self.headers {
            http::HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ProfileError::InvalidHeader(name.clone()))?;
            http::HeaderValue::from_str(value)
                .map_err(|_| ProfileError::InvalidHeader(name.clone()))?;
        }

        Ok(())
    }
}

fn check_ceiling(field: &'static str, value: u64, max: u64) -> Result<(), ProfileError> {
    if value > max {
        return Err(ProfileError::OutOfRange {
            field,
            reason: format!("{} exceeds the limit of {}", value, max),
        });
    }
    Ok(())
}

/// HTTP method issued by every request of a job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            other => Err(ProfileError::UnsupportedMethod(other.to_string())),
        }
    }
}

impl From<HttpMethod> for http::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Put => http::Method::PUT,
            HttpMethod::Patch => http::Method::PATCH,
            HttpMethod::Delete => http::Method::DELETE,
            HttpMethod::Head => http::Method::HEAD,
            HttpMethod::Options => http::Method::OPTIONS,
        }
    }
}

/// Upper bounds a submitted profile must respect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileLimits {
    pub max_iterations: u32,
    pub max_concurrency: u32,
    pub max_payload_kb: u32,
    pub max_timeout_ms: u64,
}

impl Default for ProfileLimits {
    fn default() -> Self {
        Self {
            max_iterations: 1_000_000,
            max_concurrency: 1_000,
            max_payload_kb: 10_240,
            max_timeout_ms: 300_000,
        }
    }
}

/// Reasons a load profile is rejected at submission
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("invalid target URL: {0}")]
    InvalidUrl(String),

    #[error("{field} {reason}")]
    OutOfRange { field: &'static str, reason: String },

    #[error("invalid header '{0}'")]
    InvalidHeader(String),

    #[error("unsupported HTTP method '{0}'")]
    UnsupportedMethod(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied_when_fields_missing() {
        let profile: LoadProfile = serde_json::from_str(
            r#"{"targetUrl": "http://example.test", "iterations": 3}"#,
        )
        .unwrap();

        assert_eq!(profile.method, HttpMethod::Get);
        assert_eq!(profile.concurrency, 10);
        assert_eq!(profile.timeout_ms, 10_000);
        assert_eq!(profile.payload_size_kb, 0);
        assert!(!profile.cache_busting);
        assert!(profile.headers.is_empty());
    }

    #[test]
    fn test_wire_field_names() {
        let profile: LoadProfile = serde_json::from_str(
            r#"{
                "targetUrl": "http://example.test/upload",
                "method": "POST",
                "iterations": 1,
                "concurrency": 2,
                "timeoutMs": 500,
                "payloadSizeKB": 2,
                "cacheBusting": true,
                "headers": {"X-Trace": "abc"}
            }"#,
        )
        .unwrap();

        assert_eq!(profile.method, HttpMethod::Post);
        assert_eq!(profile.payload_size_kb, 2);
        assert_eq!(profile.payload_bytes(), 2048);
        assert!(profile.cache_busting);
        assert_eq!(profile.headers.get("X-Trace"), Some(&"abc".to_string()));
    }

    #[test]
    fn test_payload_only_for_post() {
        let mut profile = LoadProfile::new("http://example.test", 1);
        profile.payload_size_kb = 4;
        assert_eq!(profile.payload_bytes(), 0);

        profile.method = HttpMethod::Post;
        assert_eq!(profile.payload_bytes(), 4096);
    }

    #[test]
    fn test_validate_accepts_zero_iterations() {
        let profile = LoadProfile::new("https://example.test/path?q=1", 0);
        assert!(profile.validate(&ProfileLimits::default()).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_profiles() {
        let limits = ProfileLimits::default();

        let profile = LoadProfile::new("not a url", 1);
        assert!(matches!(
            profile.validate(&limits),
            Err(ProfileError::InvalidUrl(_))
        ));

        let profile = LoadProfile::new("ftp://example.test", 1);
        assert!(matches!(
            profile.validate(&limits),
            Err(ProfileError::InvalidUrl(_))
        ));

        let mut profile = LoadProfile::new("http://example.test", 1);
        profile.concurrency = 0;
        assert!(matches!(
            profile.validate(&limits),
            Err(ProfileError::OutOfRange { field: "concurrency", .. })
        ));

        let mut profile = LoadProfile::new("http://example.test", 1);
        profile.timeout_ms = 0;
        assert!(profile.validate(&limits).is_err());

        let mut profile = LoadProfile::new("http://example.test", 1);
        profile.headers.insert("bad header".to_string(), "x".to_string());
        assert_eq!(
            profile.validate(&limits),
            Err(ProfileError::InvalidHeader("bad header".to_string()))
        );
    }

    #[test]
    fn test_validate_enforces_limits() {
        let limits = ProfileLimits {
            max_iterations: 100,
            ..ProfileLimits::default()
        };

        let profile = LoadProfile::new("http://example.test", 101);
        assert!(matches!(
            profile.validate(&limits),
            Err(ProfileError::OutOfRange { field: "iterations", .. })
        ));
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("post".parse::<HttpMethod>().unwrap(), HttpMethod::Post);
        assert_eq!("DELETE".parse::<HttpMethod>().unwrap(), HttpMethod::Delete);
        assert!("TRACE".parse::<HttpMethod>().is_err());
    }
}
