use ipmes_core::domain::document::{DisplayOrder, Document};
use ipmes_core::domain::{DocumentId, MilestoneId, PaymentRequestId};
use ipmes_core::upload::UploadPayload;
use serde::Deserialize;

use crate::error::ClientError;
use crate::http::{ApiClient, Method};

/// The upload endpoint answers either with the created documents or with
/// an object wrapping them.
#[derive(Deserialize)]
#[serde(untagged)]
enum Uploaded {
    List(Vec<Document>),
    Wrapped {
        #[serde(default)]
        documents: Vec<Document>,
    },
}

pub struct DocumentsService<'a> {
    api: &'a ApiClient,
}

impl<'a> DocumentsService<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn upload(&self, payload: UploadPayload) -> Result<Vec<Document>, ClientError> {
        let uploaded: Option<Uploaded> = self.api.upload("/documents", payload).await?;
        Ok(match uploaded {
            Some(Uploaded::List(documents)) | Some(Uploaded::Wrapped { documents }) => documents,
            None => Vec::new(),
        })
    }

    pub async fn for_request(
        &self,
        request_id: PaymentRequestId,
    ) -> Result<Vec<Document>, ClientError> {
        self.api.get(&format!("/documents/payment-request/{request_id}")).await
    }

    pub async fn for_milestone(&self, milestone_id: MilestoneId) -> Result<Vec<Document>, ClientError> {
        self.api.get(&format!("/documents/milestone/{milestone_id}")).await
    }

    /// Persists display orders for a set of documents in one call.
    pub async fn reorder(&self, orders: &[DisplayOrder]) -> Result<(), ClientError> {
        self.api.send_ignoring_body(Method::Put, "/documents/reorder", orders).await
    }

    pub async fn delete(&self, document_id: DocumentId) -> Result<(), ClientError> {
        self.api.delete(&format!("/documents/{document_id}")).await
    }
}
