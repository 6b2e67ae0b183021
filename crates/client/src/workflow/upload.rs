use std::future::Future;
use std::time::Duration;

use ipmes_core::domain::document::{Document, DocumentType};
use ipmes_core::domain::{MilestoneId, PaymentRequestId};
use ipmes_core::errors::{DomainError, Notice, Presentation};
use ipmes_core::upload::{UploadForm, UploadPayload, CONFIRMATION_CLOSE_DELAY};
use tracing::{info, warn};

use crate::error::ClientError;
use crate::http::ApiClient;

#[derive(Clone, Debug, PartialEq)]
pub struct UploadConfirmation {
    pub message: String,
    pub documents: Vec<Document>,
    /// How long to show the confirmation before closing.
    pub close_after: Duration,
}

/// An upload dialog: a form, an inline error slot and a submit step.
///
/// Where the files go is up to the caller, who passes the submit function.
#[derive(Debug)]
pub struct UploadDialog {
    form: UploadForm,
    error: Option<Notice>,
    submitting: bool,
}

impl UploadDialog {
    pub fn new(form: UploadForm) -> Self {
        Self { form, error: None, submitting: false }
    }

    /// Supporting documents for a payment request, with a type selector.
    pub fn for_request_documents(request_id: PaymentRequestId) -> Self {
        Self::new(
            UploadForm::with_type_selector(vec![
                DocumentType::Invoice,
                DocumentType::InspectionReport,
                DocumentType::Contract,
            ])
            .with_field("requestId", request_id),
        )
    }

    pub fn for_payment_photos(request_id: PaymentRequestId) -> Self {
        Self::new(
            UploadForm::with_fixed_type(DocumentType::PhotoPayment)
                .with_field("requestId", request_id),
        )
    }

    pub fn for_milestone_photos(milestone_id: MilestoneId) -> Self {
        Self::new(
            UploadForm::with_fixed_type(DocumentType::PhotoMilestone)
                .with_field("milestoneId", milestone_id),
        )
    }

    pub fn form(&self) -> &UploadForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut UploadForm {
        &mut self.form
    }

    pub fn error(&self) -> Option<&Notice> {
        self.error.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Validates and hands the payload to `submit`. Failures, local or from
    /// the server, are kept for inline display.
    pub async fn submit<F, Fut>(&mut self, submit: F) -> Result<UploadConfirmation, ClientError>
    where
        F: FnOnce(UploadPayload) -> Fut,
        Fut: Future<Output = Result<Vec<Document>, ClientError>>,
    {
        self.error = None;
        let payload = match self.form.payload() {
            Ok(payload) => payload,
            Err(error) => {
                let error = ClientError::from(DomainError::from(error));
                self.error = Some(error.notice(Presentation::Inline));
                return Err(error);
            }
        };

        let file_count = payload.files.len();
        self.submitting = true;
        let result = submit(payload).await;
        self.submitting = false;

        match result {
            Ok(documents) => {
                info!(event_name = "upload.completed", files = file_count, "files uploaded");
                Ok(UploadConfirmation {
                    message: format!("{file_count} file(s) uploaded successfully."),
                    documents,
                    close_after: CONFIRMATION_CLOSE_DELAY,
                })
            }
            Err(error) => {
                warn!(event_name = "upload.failed", error = %error, "upload rejected");
                self.error = Some(error.notice(Presentation::Inline));
                Err(error)
            }
        }
    }

    /// Submits to the documents endpoint.
    pub async fn submit_to(&mut self, api: &ApiClient) -> Result<UploadConfirmation, ClientError> {
        self.submit(|payload| async move { api.documents().upload(payload).await }).await
    }
}

#[cfg(test)]
mod tests {
    use ipmes_core::domain::document::DocumentType;
    use ipmes_core::domain::PaymentRequestId;
    use ipmes_core::errors::{DomainError, Presentation};
    use ipmes_core::upload::{UploadFile, UploadValidationError, CONFIRMATION_CLOSE_DELAY};

    use super::UploadDialog;
    use crate::error::{ApiError, ClientError};

    #[tokio::test]
    async fn validation_failure_never_calls_submit() {
        let mut dialog = UploadDialog::for_request_documents(PaymentRequestId(3));
        let mut called = false;

        let error = dialog
            .submit(|_| {
                called = true;
                async { Ok(Vec::new()) }
            })
            .await
            .expect_err("no files");

        assert!(!called);
        assert!(matches!(
            error,
            ClientError::Domain(DomainError::Upload(UploadValidationError::NoFiles))
        ));
        assert_eq!(dialog.error().map(|notice| notice.presentation), Some(Presentation::Inline));
    }

    #[tokio::test]
    async fn selector_without_choice_blocks_submission() {
        let mut dialog = UploadDialog::for_request_documents(PaymentRequestId(3));
        dialog.form_mut().add_file(UploadFile::new("invoice.pdf", vec![1, 2, 3]));

        let error = dialog.submit(|_| async { Ok(Vec::new()) }).await.expect_err("type needed");
        assert!(matches!(
            error,
            ClientError::Domain(DomainError::Upload(UploadValidationError::DocumentTypeRequired))
        ));
    }

    #[tokio::test]
    async fn server_message_is_kept_inline() {
        let mut dialog = UploadDialog::for_payment_photos(PaymentRequestId(3));
        dialog.form_mut().add_file(UploadFile::new("site.jpg", vec![0xff, 0xd8]));

        let error = dialog
            .submit(|_| async {
                Err(ApiError::from_response(413, br#"{"message":"File too large"}"#).into())
            })
            .await
            .expect_err("server refused");

        assert_eq!(error.user_message(), "File too large");
        assert_eq!(dialog.error().map(|notice| notice.message.as_str()), Some("File too large"));
        assert!(!dialog.is_submitting());
    }

    #[tokio::test]
    async fn success_reports_confirmation_with_close_delay() {
        let mut dialog = UploadDialog::for_payment_photos(PaymentRequestId(3));
        dialog.form_mut().add_file(UploadFile::new("a.jpg", vec![1]));
        dialog.form_mut().add_file(UploadFile::new("b.jpg", vec![2]));

        let confirmation = dialog
            .submit(|payload| async move {
                assert_eq!(payload.fields["documentType"], DocumentType::PhotoPayment.to_string());
                assert_eq!(payload.fields["requestId"], "3");
                Ok(Vec::new())
            })
            .await
            .expect("uploaded");

        assert_eq!(confirmation.message, "2 file(s) uploaded successfully.");
        assert_eq!(confirmation.close_after, CONFIRMATION_CLOSE_DELAY);
        assert!(dialog.error().is_none());
    }
}
