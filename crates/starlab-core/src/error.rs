//! Error taxonomy for the collection pipeline
//!
//! Only [`CollectError::TransientNetwork`] is retried. [`CollectError::DataIntegrity`]
//! is scoped to a single record and never aborts a run; every other variant is fatal.

/// Error raised while fetching, paginating or normalizing repository data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectError {
    /// Connection failure, timeout or 5xx response. The same cursor may be retried.
    TransientNetwork { message: String },
    /// Invalid credentials or exhausted rate limit.
    Authentication {
        status: Option<u16>,
        message: String,
    },
    /// Response body does not have the expected shape (API contract drift).
    MalformedResponse { message: String },
    /// Data source claims more pages but cannot deliver them.
    InconsistentPagination { page: usize, message: String },
    /// A single record failed validation; it is excluded from the dataset.
    DataIntegrity { record: String, message: String },
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TransientNetwork { message } => write!(f, "transient network error: {message}"),
            Self::Authentication {
                status: Some(s),
                message,
            } => write!(f, "authentication failed (HTTP {s}): {message}"),
            Self::Authentication {
                status: None,
                message,
            } => write!(f, "authentication failed: {message}"),
            Self::MalformedResponse { message } => write!(f, "malformed response: {message}"),
            Self::InconsistentPagination { page, message } => {
                write!(f, "inconsistent pagination at page {page}: {message}")
            }
            Self::DataIntegrity { record, message } => {
                write!(f, "data integrity error in {record}: {message}")
            }
        }
    }
}

impl std::error::Error for CollectError {}

impl CollectError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self::TransientNetwork {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    pub fn integrity(record: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataIntegrity {
            record: record.into(),
            message: message.into(),
        }
    }

    /// Classify a non-success HTTP status.
    ///
    /// 401/403/429 mean bad credentials or rate limiting, 5xx is retryable,
    /// anything else means the request itself no longer matches the API.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = truncate_body(body);
        match status {
            401 | 403 | 429 => Self::Authentication {
                status: Some(status),
                message,
            },
            500..=599 => Self::TransientNetwork {
                message: format!("HTTP {status}: {message}"),
            },
            _ => Self::MalformedResponse {
                message: format!("HTTP {status}: {message}"),
            },
        }
    }

    /// Classify a reqwest transport error.
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        let message = e.to_string();
        if let Some(status) = e.status() {
            return Self::from_status(status.as_u16(), &message);
        }
        if e.is_decode() {
            return Self::malformed(message);
        }
        // connect, timeout, truncated body
        Self::transient(message)
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientNetwork { .. })
    }

    /// Whether this error must abort the whole run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::DataIntegrity { .. })
    }

    /// Short machine-friendly name used in summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TransientNetwork { .. } => "TransientNetworkError",
            Self::Authentication { .. } => "AuthenticationError",
            Self::MalformedResponse { .. } => "MalformedResponseError",
            Self::InconsistentPagination { .. } => "InconsistentPaginationError",
            Self::DataIntegrity { .. } => "DataIntegrityError",
        }
    }
}

/// Keep error bodies short enough for a log line.
fn truncate_body(body: &str) -> String {
    const MAX_CHARS: usize = 200;
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_CHARS {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(MAX_CHARS).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_401_is_authentication() {
        let err = CollectError::from_status(401, "Bad credentials");
        assert!(matches!(
            err,
            CollectError::Authentication {
                status: Some(401),
                ..
            }
        ));
        assert!(!err.is_retryable());
        assert!(err.is_fatal());
    }

    #[test]
    fn status_429_is_authentication() {
        let err = CollectError::from_status(429, "rate limited");
        assert_eq!(err.kind(), "AuthenticationError");
    }

    #[test]
    fn status_502_is_transient() {
        let err = CollectError::from_status(502, "Bad Gateway");
        assert!(err.is_retryable());
        assert_eq!(err.kind(), "TransientNetworkError");
    }

    #[test]
    fn status_400_is_malformed() {
        let err = CollectError::from_status(400, "Problems parsing JSON");
        assert!(!err.is_retryable());
        assert_eq!(err.kind(), "MalformedResponseError");
    }

    #[test]
    fn integrity_is_not_fatal() {
        let err = CollectError::integrity("a/b", "negative star count");
        assert!(!err.is_fatal());
        assert!(!err.is_retryable());
    }

    #[test]
    fn pagination_is_fatal() {
        let err = CollectError::InconsistentPagination {
            page: 3,
            message: "empty page".to_string(),
        };
        assert!(err.is_fatal());
        assert_eq!(format!("{err}"), "inconsistent pagination at page 3: empty page");
    }

    #[test]
    fn display_authentication_without_status() {
        let err = CollectError::Authentication {
            status: None,
            message: "RATE_LIMITED".to_string(),
        };
        assert_eq!(format!("{err}"), "authentication failed: RATE_LIMITED");
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(1000);
        let err = CollectError::from_status(500, &body);
        let msg = format!("{err}");
        assert!(msg.len() < 300);
        assert!(msg.ends_with("..."));
    }
}
