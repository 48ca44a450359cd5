//! Form submission pipeline: extraction, validation, anti-abuse gating,
//! notification delivery, and redirect-encoded terminal status.

pub mod assessment;
pub mod callback;
pub mod fields;
pub mod messages;
pub mod quote;
pub mod status;
pub mod validate;

use axum::http::HeaderMap;
use axum::response::Redirect;

/// Why a submission was rejected. Exactly one reason is surfaced per
/// rejected submission; the first failing check wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// Required field missing or malformed (generic field fault).
    Validation,
    Phone,
    Date,
    Time,
    Location,
    Severity,
    Service,
    /// Too many attached files.
    Files,
    /// Combined attachment size over the limit.
    Total,
    /// An individual attachment over the per-file limit.
    Size,
    /// An attachment outside the allowed types.
    Type,
    /// Honeypot field tripped.
    Spam,
    /// Fixed-window rate limit exceeded.
    Rate,
    /// Inflight delivery ceiling reached.
    Busy,
    /// Provider API key absent from the environment.
    Config,
    /// Delivery failed (timeout, network fault, or non-2xx from provider).
    Send,
}

impl Reason {
    pub fn code(&self) -> &'static str {
        match self {
            Reason::Validation => "validation",
            Reason::Phone => "phone",
            Reason::Date => "date",
            Reason::Time => "time",
            Reason::Location => "location",
            Reason::Severity => "severity",
            Reason::Service => "service",
            Reason::Files => "files",
            Reason::Total => "total",
            Reason::Size => "size",
            Reason::Type => "type",
            Reason::Spam => "spam",
            Reason::Rate => "rate",
            Reason::Busy => "busy",
            Reason::Config => "config",
            Reason::Send => "send",
        }
    }
}

/// Terminal state of one submission, communicated to the browser purely
/// as a redirect back to the originating page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Success,
    Rejected(Reason),
}

impl Terminal {
    /// Redirect target for a form that posts from `page`, optionally
    /// jumping to a page fragment such as `#booking`.
    pub fn redirect(self, page: &str, fragment: Option<&str>) -> Redirect {
        let query = match self {
            Terminal::Success => "status=success".to_string(),
            Terminal::Rejected(reason) => format!("status=error&reason={}", reason.code()),
        };

        let target = match fragment {
            Some(fragment) => format!("{page}?{query}#{fragment}"),
            None => format!("{page}?{query}"),
        };

        Redirect::to(&target)
    }
}

/// Derives the client identity used for rate-limit keying: the first
/// forwarded hop, then the raw-IP header, then a literal placeholder.
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }

    "unknown".to_string()
}

/// Rate-limit bucket key: `{client ip}|{primary identity field}`.
pub fn rate_limit_key(headers: &HeaderMap, identity: &str) -> String {
    let identity = if identity.is_empty() { "unknown" } else { identity };
    format!("{}|{}", client_ip(headers), identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_reason_codes() {
        assert_eq!(Reason::Validation.code(), "validation");
        assert_eq!(Reason::Rate.code(), "rate");
        assert_eq!(Reason::Config.code(), "config");
        assert_eq!(Reason::Send.code(), "send");
    }

    #[test]
    fn test_client_ip_prefers_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));

        assert_eq!(client_ip(&headers), "203.0.113.9");
    }

    #[test]
    fn test_client_ip_falls_back_to_real_ip_then_unknown() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(client_ip(&headers), "198.51.100.2");

        assert_eq!(client_ip(&HeaderMap::new()), "unknown");
    }

    #[test]
    fn test_rate_limit_key_shape() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));

        assert_eq!(
            rate_limit_key(&headers, "john@example.co.za"),
            "198.51.100.2|john@example.co.za"
        );
        assert_eq!(rate_limit_key(&headers, ""), "198.51.100.2|unknown");
    }
}
