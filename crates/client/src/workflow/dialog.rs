use std::marker::PhantomData;

use ipmes_core::domain::records::Resource;
use ipmes_core::errors::{DomainError, Notice};
use ipmes_core::forms::EntityForm;
use ipmes_core::privilege::Privilege;
use ipmes_core::session::Session;
use serde_json::Value;
use tracing::warn;

use crate::error::ClientError;
use crate::http::ApiClient;
use crate::services::CrudService;

#[derive(Clone, Debug)]
pub struct DialogOutcome<R> {
    pub saved: R,
    /// The reloaded collection; `None` if reloading failed after the save.
    pub records: Option<Vec<R>>,
    pub notice: Notice,
}

/// Add/edit dialog for any [`Resource`].
pub struct EntityDialog<R> {
    api: ApiClient,
    form: EntityForm,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> EntityDialog<R> {
    pub fn create(api: ApiClient) -> Self {
        Self { api, form: EntityForm::for_create(R::form_fields()), _resource: PhantomData }
    }

    pub fn edit(api: ApiClient, record: &R) -> Result<Self, ClientError> {
        let Some(id) = record.id() else {
            return Err(DomainError::InvariantViolation(format!(
                "cannot edit a {} that has no id",
                R::LABEL
            ))
            .into());
        };
        let form = EntityForm::for_edit(R::form_fields(), id, record)?;
        Ok(Self { api, form, _resource: PhantomData })
    }

    pub fn form(&self) -> &EntityForm {
        &self.form
    }

    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<(), ClientError> {
        self.form.set(field, value)?;
        Ok(())
    }

    pub fn required_privilege(&self) -> Privilege {
        if self.form.is_editing() {
            R::UPDATE
        } else {
            R::CREATE
        }
    }

    /// Checks the privilege, validates, then creates or updates and reloads
    /// the collection. Nothing is sent if either check fails.
    pub async fn submit(&self, session: &Session) -> Result<DialogOutcome<R>, ClientError> {
        let privilege = self.required_privilege();
        if !session.has_privilege(privilege) {
            return Err(ClientError::PermissionDenied(privilege));
        }
        let submission = self.form.submission()?;

        let service = CrudService::<R>::new(&self.api);
        let saved = service.submit(&submission).await?;
        let verb = if self.form.is_editing() { "updated" } else { "created" };

        let records = match service.list().await {
            Ok(records) => Some(records),
            Err(error) => {
                warn!(
                    event_name = "crud.reload.failed",
                    resource = R::LABEL,
                    error = %error,
                    "could not reload collection after save"
                );
                None
            }
        };

        Ok(DialogOutcome {
            saved,
            records,
            notice: Notice::success(format!("{} {verb} successfully.", capitalize(R::LABEL))),
        })
    }

    /// Deletes one record and returns the reloaded collection.
    pub async fn delete(api: &ApiClient, session: &Session, id: i64) -> Result<Vec<R>, ClientError> {
        if !session.has_privilege(R::DELETE) {
            return Err(ClientError::PermissionDenied(R::DELETE));
        }
        let service = CrudService::<R>::new(api);
        service.delete(id).await?;
        service.list().await
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
