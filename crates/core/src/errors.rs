use serde::Serialize;
use thiserror::Error;

use crate::approvals::{ActionValidationError, GuardDenial};
use crate::forms::FieldError;
use crate::privilege::Privilege;
use crate::session::SessionError;
use crate::upload::UploadValidationError;

/// Failures detected on the client before any request is issued.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("permission denied: missing `{0}`")]
    PermissionDenied(Privilege),
    #[error("approval action unavailable: {0}")]
    Guard(#[from] GuardDenial),
    #[error(transparent)]
    ActionValidation(#[from] ActionValidationError),
    #[error("form validation failed on {} field(s)", .0.len())]
    FormInvalid(Vec<FieldError>),
    #[error("unknown form field `{0}`")]
    UnknownField(String),
    #[error(transparent)]
    Upload(#[from] UploadValidationError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

/// How a notice is shown: a persistent inline alert for page-level state,
/// or a transient toast for the outcome of a single action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presentation {
    Inline,
    Transient,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
    pub presentation: Presentation,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
            presentation: Presentation::Transient,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            presentation: Presentation::Transient,
        }
    }

    pub fn error(message: impl Into<String>, presentation: Presentation) -> Self {
        Self { severity: Severity::Error, message: message.into(), presentation }
    }
}

impl DomainError {
    pub fn user_message(&self) -> String {
        match self {
            Self::PermissionDenied(privilege) => {
                format!("Permission denied: you need the `{privilege}` privilege.")
            }
            Self::Guard(denial) => format!("Permission denied: {denial}."),
            Self::ActionValidation(error) => error.to_string(),
            Self::FormInvalid(errors) => errors
                .iter()
                .map(|error| error.message.as_str())
                .collect::<Vec<_>>()
                .join("; "),
            Self::UnknownField(field) => format!("The form has no field named `{field}`."),
            Self::Upload(error) => error.to_string(),
            Self::Session(error) => error.to_string(),
            Self::InvariantViolation(_) => "An unexpected internal error occurred.".to_string(),
        }
    }

    /// Client-side failures are reported on the action that triggered them.
    pub fn notice(&self) -> Notice {
        let severity = match self {
            Self::PermissionDenied(_) | Self::Guard(_) | Self::InvariantViolation(_) => {
                Severity::Error
            }
            _ => Severity::Warning,
        };
        Notice { severity, message: self.user_message(), presentation: Presentation::Transient }
    }
}

#[cfg(test)]
mod tests {
    use crate::approvals::ActionValidationError;
    use crate::domain::approval::ApprovalAction;
    use crate::errors::{DomainError, Presentation, Severity};
    use crate::forms::FieldError;
    use crate::privilege::Privilege;

    #[test]
    fn permission_denial_is_a_transient_error_notice() {
        let notice = DomainError::PermissionDenied(Privilege::PaymentRequestUpdate).notice();

        assert_eq!(notice.severity, Severity::Error);
        assert_eq!(notice.presentation, Presentation::Transient);
        assert!(notice.message.starts_with("Permission denied"));
        assert!(notice.message.contains("payment_request.update"));
    }

    #[test]
    fn missing_notes_is_a_warning() {
        let notice = DomainError::from(ActionValidationError::NotesRequired {
            action: ApprovalAction::Reject,
        })
        .notice();

        assert_eq!(notice.severity, Severity::Warning);
        assert_eq!(notice.message, "notes are required for `Reject`");
    }

    #[test]
    fn form_errors_are_joined_for_display() {
        let error = DomainError::FormInvalid(vec![
            FieldError { field: "a".to_string(), message: "A is required".to_string() },
            FieldError { field: "b".to_string(), message: "B must be a number".to_string() },
        ]);

        assert_eq!(error.user_message(), "A is required; B must be a number");
        assert_eq!(error.to_string(), "form validation failed on 2 field(s)");
    }
}
