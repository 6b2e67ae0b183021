//! Ordered photo gallery for a payment request.

use ipmes_core::domain::document::{display_orders, Document, DocumentType};
use ipmes_core::domain::{DocumentId, PaymentRequestId, ProjectId};
use ipmes_core::errors::{Notice, Presentation};
use ipmes_core::generations::RequestGenerations;
use ipmes_core::optimistic::{move_item, Optimistic, RollbackSource};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::http::ApiClient;
use crate::workflow::review::Refresh;

/// A reorder that could not be persisted, and how the list was restored.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct ReorderFailure {
    pub error: ClientError,
    /// Set when reloading the authoritative order failed as well.
    pub refetch_error: Option<ClientError>,
    /// `None` when nothing was changed locally.
    pub restored_from: Option<RollbackSource>,
}

impl ReorderFailure {
    pub fn notice(&self) -> Notice {
        let mut message = self.error.user_message();
        if let Some(refetch_error) = &self.refetch_error {
            message.push_str(&format!(
                " The photo order could not be reloaded either: {}",
                refetch_error.user_message()
            ));
        }
        Notice::error(message, Presentation::Transient)
    }
}

pub struct PhotoGallery {
    api: ApiClient,
    request_id: PaymentRequestId,
    photos: Mutex<Vec<Document>>,
    generations: RequestGenerations,
}

impl PhotoGallery {
    pub async fn load(api: ApiClient, request_id: PaymentRequestId) -> Result<Self, ClientError> {
        let photos = fetch_photos(&api, request_id).await?;
        Ok(Self { api, request_id, photos: Mutex::new(photos), generations: RequestGenerations::new() })
    }

    pub async fn photos(&self) -> Vec<Document> {
        self.photos.lock().await.clone()
    }

    pub async fn refresh(&self) -> Result<Refresh, ClientError> {
        let generation = self.generations.begin();
        let fresh = fetch_photos(&self.api, self.request_id).await?;

        let mut photos = self.photos.lock().await;
        if !self.generations.is_current(generation) {
            debug!(
                event_name = "photos.refresh.stale_discarded",
                request_id = %self.request_id,
                "discarding stale photo load"
            );
            return Ok(Refresh::Stale);
        }
        *photos = fresh;
        Ok(Refresh::Applied)
    }

    /// Moves the photo at `from` to `to`.
    ///
    /// The move shows locally straight away. If saving it fails, the order
    /// is reloaded from the server; if that fails too, the order from before
    /// the move is put back.
    pub async fn reorder(&self, from: usize, to: usize) -> Result<(), ReorderFailure> {
        let (change, orders) = {
            let mut photos = self.photos.lock().await;
            let change = Optimistic::try_apply(&mut *photos, |photos| move_item(photos, from, to))
                .map_err(|error| ReorderFailure {
                    error: error.into(),
                    refetch_error: None,
                    restored_from: None,
                })?;
            (change, display_orders(&photos))
        };
        // Loads already in flight predate the move and must not overwrite it.
        self.generations.invalidate();

        let error = match self.api.documents().reorder(&orders).await {
            Ok(()) => {
                change.commit();
                info!(
                    event_name = "photos.reorder.persisted",
                    request_id = %self.request_id,
                    from,
                    to,
                    "photo order saved"
                );
                return Ok(());
            }
            Err(error) => error,
        };

        warn!(
            event_name = "photos.reorder.failed",
            request_id = %self.request_id,
            error = %error,
            "photo order could not be saved"
        );
        let (authoritative, refetch_error) = match fetch_photos(&self.api, self.request_id).await {
            Ok(photos) => (Some(photos), None),
            Err(refetch_error) => (None, Some(refetch_error)),
        };

        let restored_from = {
            let mut photos = self.photos.lock().await;
            change.rollback(&mut *photos, authoritative)
        };
        warn!(
            event_name = "photos.reorder.rolled_back",
            request_id = %self.request_id,
            source = ?restored_from,
            "photo order restored"
        );

        Err(ReorderFailure { error, refetch_error, restored_from: Some(restored_from) })
    }

    /// Makes `document_id` the project's cover photo and reloads the gallery.
    pub async fn set_cover(
        &self,
        project_id: ProjectId,
        document_id: DocumentId,
    ) -> Result<Refresh, ClientError> {
        self.api.projects().set_cover_photo(project_id, document_id).await?;
        info!(
            event_name = "photos.cover.set",
            project_id = %project_id,
            document_id = %document_id,
            "cover photo updated"
        );
        self.refresh().await
    }
}

async fn fetch_photos(
    api: &ApiClient,
    request_id: PaymentRequestId,
) -> Result<Vec<Document>, ClientError> {
    let mut photos: Vec<Document> = api
        .documents()
        .for_request(request_id)
        .await?
        .into_iter()
        .filter(|document| document.document_type == DocumentType::PhotoPayment)
        .collect();
    photos.sort_by_key(|photo| (photo.display_order.unwrap_or(i32::MAX), photo.document_id));
    Ok(photos)
}
