use ipmes_core::domain::records::{PrivilegeRecord, Role};
use ipmes_core::domain::user::{User, UserSummary};
use ipmes_core::domain::UserId;
use serde::Serialize;

use super::crud::CrudService;
use crate::error::ClientError;
use crate::http::ApiClient;

pub struct UsersService<'a> {
    api: &'a ApiClient,
}

impl<'a> UsersService<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<User>, ClientError> {
        self.api.get("/users").await
    }

    pub async fn get(&self, user_id: UserId) -> Result<User, ClientError> {
        self.api.get(&format!("/users/{user_id}")).await
    }

    pub async fn create<B: Serialize + ?Sized>(&self, body: &B) -> Result<User, ClientError> {
        self.api.post("/users", body).await
    }

    pub async fn update<B: Serialize + ?Sized>(
        &self,
        user_id: UserId,
        body: &B,
    ) -> Result<User, ClientError> {
        self.api.put(&format!("/users/{user_id}"), body).await
    }

    pub async fn delete(&self, user_id: UserId) -> Result<(), ClientError> {
        self.api.delete(&format!("/users/{user_id}")).await
    }

    /// All users in summary form, for labelling history rows and picking
    /// reassignment targets.
    pub async fn directory(&self) -> Result<Vec<UserSummary>, ClientError> {
        self.api.get("/users").await
    }

    pub fn roles(&self) -> CrudService<'a, Role> {
        CrudService::new(self.api)
    }

    pub fn privileges(&self) -> CrudService<'a, PrivilegeRecord> {
        CrudService::new(self.api)
    }
}
