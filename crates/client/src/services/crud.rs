use std::marker::PhantomData;

use ipmes_core::domain::records::Resource;
use ipmes_core::forms::Submission;
use serde::Serialize;
use tracing::info;

use crate::error::ClientError;
use crate::http::ApiClient;

/// List/get/create/update/delete against one resource collection.
pub struct CrudService<'a, R> {
    api: &'a ApiClient,
    collection: String,
    _resource: PhantomData<fn() -> R>,
}

impl<'a, R: Resource> CrudService<'a, R> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self::at(api, R::COLLECTION)
    }

    /// Same resource served under a different path, e.g. nested under a parent.
    pub fn at(api: &'a ApiClient, collection: impl Into<String>) -> Self {
        Self { api, collection: collection.into(), _resource: PhantomData }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn item_path(&self, id: i64) -> String {
        format!("{}/{id}", self.collection)
    }

    pub async fn list(&self) -> Result<Vec<R>, ClientError> {
        self.api.get(&self.collection).await
    }

    pub async fn get(&self, id: i64) -> Result<R, ClientError> {
        self.api.get(&self.item_path(id)).await
    }

    pub async fn create<B: Serialize + ?Sized>(&self, body: &B) -> Result<R, ClientError> {
        let created: R = self.api.post(&self.collection, body).await?;
        info!(
            event_name = "crud.created",
            resource = R::LABEL,
            id = created.id(),
            "record created"
        );
        Ok(created)
    }

    pub async fn update<B: Serialize + ?Sized>(&self, id: i64, body: &B) -> Result<R, ClientError> {
        let updated = self.api.put(&self.item_path(id), body).await?;
        info!(event_name = "crud.updated", resource = R::LABEL, id, "record updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ClientError> {
        self.api.delete(&self.item_path(id)).await?;
        info!(event_name = "crud.deleted", resource = R::LABEL, id, "record deleted");
        Ok(())
    }

    /// Creates or updates depending on what the form was editing.
    pub async fn submit(&self, submission: &Submission) -> Result<R, ClientError> {
        match submission {
            Submission::Create(body) => self.create(body).await,
            Submission::Update { id, body } => self.update(*id, body).await,
        }
    }
}
