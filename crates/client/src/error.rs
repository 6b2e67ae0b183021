use ipmes_core::errors::{DomainError, Notice, Presentation, Severity};
use ipmes_core::privilege::Privilege;
use ipmes_core::session::SessionError;
use serde_json::Value;
use thiserror::Error;

pub const NETWORK_ERROR_MESSAGE: &str =
    "Could not reach the server. Check your connection and try again.";

/// A failed call, normalized to one shape whatever went wrong.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("{message}")]
    Response { status: u16, message: String, body: Value },
    /// No response arrived (connection refused, timeout, DNS).
    #[error("{}", NETWORK_ERROR_MESSAGE)]
    NoResponse { reason: String },
}

impl ApiError {
    /// Builds the error for a non-2xx response. The body's `message` is kept
    /// verbatim; a missing, empty or non-JSON body gets a generic message.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let fallback = || format!("Request failed with status {status}");

        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => {
                let message = map
                    .get("message")
                    .or_else(|| map.get("error"))
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|message| !message.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(fallback);
                Self::Response { status, message, body: Value::Object(map) }
            }
            _ => Self::Response { status, message: fallback(), body: Value::Null },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Response { status, .. } => Some(*status),
            Self::NoResponse { .. } => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401))
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("permission denied: missing `{0}`")]
    PermissionDenied(Privilege),
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<SessionError> for ClientError {
    fn from(error: SessionError) -> Self {
        Self::Domain(DomainError::Session(error))
    }
}

impl ClientError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(error) => error.to_string(),
            Self::Domain(error) => error.user_message(),
            Self::PermissionDenied(privilege) => {
                format!("Permission denied: you need the `{privilege}` privilege.")
            }
            Self::Decode(_) => "The server sent a response this client could not read.".to_string(),
            Self::Io(error) => format!("File error: {error}"),
        }
    }

    /// Page loads report inline; actions report transiently.
    pub fn notice(&self, presentation: Presentation) -> Notice {
        match self {
            Self::Domain(error) => Notice { presentation, ..error.notice() },
            _ => Notice::error(self.user_message(), presentation),
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied(_)
                | Self::Domain(DomainError::PermissionDenied(_))
                | Self::Domain(DomainError::Guard(_))
        )
    }

    pub fn severity(&self) -> Severity {
        self.notice(Presentation::Transient).severity
    }
}

#[cfg(test)]
mod tests {
    use ipmes_core::errors::{Presentation, Severity};
    use serde_json::json;

    use super::{ApiError, ClientError, NETWORK_ERROR_MESSAGE};

    #[test]
    fn body_message_is_surfaced_verbatim() {
        let error = ApiError::from_response(
            422,
            br#"{"message":"Amount exceeds remaining budget","field":"amount"}"#,
        );

        assert_eq!(error.to_string(), "Amount exceeds remaining budget");
        let ApiError::Response { status, body, .. } = error else {
            panic!("expected response error");
        };
        assert_eq!(status, 422);
        assert_eq!(body["field"], json!("amount"));
    }

    #[test]
    fn empty_and_non_json_bodies_get_generic_message() {
        for body in [&b""[..], &b"<html>Bad Gateway</html>"[..], &b"{}"[..], &b"[1,2]"[..]] {
            let error = ApiError::from_response(502, body);
            assert_eq!(error.to_string(), "Request failed with status 502");
        }
    }

    #[test]
    fn no_response_uses_network_message_and_has_no_status() {
        let error = ApiError::NoResponse { reason: "connection refused".to_string() };
        assert_eq!(error.to_string(), NETWORK_ERROR_MESSAGE);
        assert_eq!(error.status(), None);
    }

    #[test]
    fn api_failures_become_error_notices_in_requested_presentation() {
        let error = ClientError::from(ApiError::from_response(500, b""));
        let notice = error.notice(Presentation::Inline);

        assert_eq!(notice.severity, Severity::Error);
        assert_eq!(notice.presentation, Presentation::Inline);
        assert_eq!(notice.message, "Request failed with status 500");
    }
}
