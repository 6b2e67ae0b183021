use ipmes_core::domain::approval::{ApprovalActionPayload, ApprovalHistoryEntry};
use ipmes_core::domain::payment::{NewPaymentRequest, PaymentRequest};
use ipmes_core::domain::{DocumentId, PaymentRequestId, ProjectId};
use serde_json::json;
use tracing::info;

use crate::error::ClientError;
use crate::http::{ApiClient, HttpRequest, Method};

pub struct PaymentsService<'a> {
    api: &'a ApiClient,
}

impl<'a> PaymentsService<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, project: Option<ProjectId>) -> Result<Vec<PaymentRequest>, ClientError> {
        let mut request = HttpRequest::new(Method::Get, "/payment-requests");
        if let Some(project_id) = project {
            request = request.with_query("projectId", project_id);
        }
        self.api.request(request).await
    }

    pub async fn get(&self, request_id: PaymentRequestId) -> Result<PaymentRequest, ClientError> {
        self.api.get(&format!("/payment-requests/{request_id}")).await
    }

    pub async fn create(&self, request: &NewPaymentRequest) -> Result<PaymentRequest, ClientError> {
        let created: PaymentRequest = self.api.post("/payment-requests", request).await?;
        info!(
            event_name = "payment.request.created",
            request_id = %created.request_id,
            project_id = %created.project_id,
            "payment request created"
        );
        Ok(created)
    }

    /// Creates the request, then links documents uploaded beforehand.
    pub async fn create_with_documents(
        &self,
        request: &NewPaymentRequest,
        documents: &[DocumentId],
    ) -> Result<PaymentRequest, ClientError> {
        let created = self.create(request).await?;
        if documents.is_empty() {
            return Ok(created);
        }
        self.api
            .send_ignoring_body(
                Method::Put,
                &format!("/payment-requests/{}/documents", created.request_id),
                &json!({ "documentIds": documents }),
            )
            .await?;
        Ok(created)
    }

    pub async fn delete(&self, request_id: PaymentRequestId) -> Result<(), ClientError> {
        self.api.delete(&format!("/payment-requests/{request_id}")).await
    }

    pub async fn history(
        &self,
        request_id: PaymentRequestId,
    ) -> Result<Vec<ApprovalHistoryEntry>, ClientError> {
        self.api.get(&format!("/payment-requests/{request_id}/history")).await
    }

    pub async fn act(
        &self,
        request_id: PaymentRequestId,
        payload: &ApprovalActionPayload,
    ) -> Result<(), ClientError> {
        self.api
            .send_ignoring_body(
                Method::Post,
                &format!("/payment-requests/{request_id}/actions"),
                payload,
            )
            .await
    }
}
