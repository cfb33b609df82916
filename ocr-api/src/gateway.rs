//! Error type shared by the upstream gateways.
//!
//! Each gateway issues one logical call to a third-party service and folds every
//! failure into a [`GatewayError`]. Callers treat it as opaque: the HTTP layer
//! reports it as a processing error and logs the full chain.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway was never configured (for example, a missing credential).
    #[error("{service} unavailable: {reason}")]
    Unavailable {
        service: &'static str,
        reason: String,
    },

    /// Network, TLS, timeout or body read failure. The request URL is stripped.
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The upstream answered with a non-success status.
    #[error("{service} returned {status}: {message}")]
    Upstream {
        service: &'static str,
        status: StatusCode,
        message: String,
    },

    /// The upstream answered 2xx but the body was not what the protocol promises.
    #[error("{service} returned a malformed response: {detail}")]
    Malformed {
        service: &'static str,
        detail: String,
    },

    /// The request was refused on content grounds (blocked prompt, unsupported language).
    #[error("{service} rejected the request: {detail}")]
    Rejected {
        service: &'static str,
        detail: String,
    },
}

impl GatewayError {
    pub fn transport(service: &'static str, err: reqwest::Error) -> Self {
        GatewayError::Transport {
            service,
            source: err.without_url(),
        }
    }

    pub fn service(&self) -> &'static str {
        match self {
            GatewayError::Unavailable { service, .. }
            | GatewayError::Transport { service, .. }
            | GatewayError::Upstream { service, .. }
            | GatewayError::Malformed { service, .. }
            | GatewayError::Rejected { service, .. } => service,
        }
    }
}

/// Upstream error bodies can be large HTML pages; keep the first line, bounded.
pub(crate) fn summarize_body(body: &str) -> String {
    const MAX_CHARS: usize = 200;

    let line = body.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    if line.chars().count() > MAX_CHARS {
        let truncated: String = line.chars().take(MAX_CHARS).collect();
        format!("{truncated}...")
    } else if line.is_empty() {
        "empty response body".to_string()
    } else {
        line.to_string()
    }
}
