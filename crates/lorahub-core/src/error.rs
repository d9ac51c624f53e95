// ── Core error types ──
//
// User-facing errors from lorahub-core. Consumers never see reqwest
// failures or JSON parse errors directly; the `From<lorahub_api::Error>`
// impl translates transport-layer errors into domain-appropriate
// variants, and `status()` gives the HTTP boundary a code to emit.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Lookup errors ────────────────────────────────────────────────
    #[error("{entity} not found: {identifier}")]
    NotFound {
        entity: &'static str,
        identifier: String,
    },

    // ── Validation errors ────────────────────────────────────────────
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    // ── Remote errors ────────────────────────────────────────────────
    #[error("Cannot reach network server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Network server authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// The remote accepted the connection but rejected the operation.
    #[error("Network server error: {message}")]
    Remote { message: String, status: Option<u16> },

    // ── Local errors ─────────────────────────────────────────────────
    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn not_found(entity: &'static str, identifier: impl ToString) -> Self {
        Self::NotFound {
            entity,
            identifier: identifier.to_string(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Returns `true` if the failure means "no such object", locally or
    /// remotely.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::Remote {
                    status: Some(404),
                    ..
                }
        )
    }

    /// HTTP status for the server boundary.
    pub fn status(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::BadRequest { .. } => 400,
            Self::AuthenticationFailed { .. } => 401,
            Self::Remote { status, .. } => status.unwrap_or(502),
            Self::ConnectionFailed { .. } => 502,
            Self::Crypto(_) | Self::Config { .. } | Self::Internal(_) => 500,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<lorahub_api::Error> for CoreError {
    fn from(err: lorahub_api::Error) -> Self {
        match err {
            lorahub_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            lorahub_api::Error::SessionExpired => CoreError::AuthenticationFailed {
                message: "session expired -- re-authentication required".into(),
            },
            lorahub_api::Error::Transport(ref e) => {
                if e.is_connect() || e.is_timeout() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Remote {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            lorahub_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid URL: {e}"),
            },
            lorahub_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            lorahub_api::Error::Api { message, status } => CoreError::Remote {
                message,
                status: Some(status),
            },
            lorahub_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn remote_404_counts_as_not_found() {
        let err = CoreError::from(lorahub_api::Error::Api {
            message: "object does not exist".into(),
            status: 404,
        });
        assert!(err.is_not_found());
        assert_eq!(err.status(), 404);
    }

    #[test]
    fn auth_errors_map_to_401() {
        let err = CoreError::from(lorahub_api::Error::SessionExpired);
        assert_eq!(err.status(), 401);
    }
}
