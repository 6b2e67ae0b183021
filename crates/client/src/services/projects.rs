use ipmes_core::domain::records::{Milestone, Project};
use ipmes_core::domain::{DocumentId, ProjectId};
use serde_json::json;

use super::crud::CrudService;
use crate::error::ClientError;
use crate::http::{ApiClient, Method};

pub struct ProjectsService<'a> {
    api: &'a ApiClient,
}

impl<'a> ProjectsService<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub fn records(&self) -> CrudService<'a, Project> {
        CrudService::new(self.api)
    }

    pub fn milestone_records(&self) -> CrudService<'a, Milestone> {
        CrudService::new(self.api)
    }

    pub async fn list(&self) -> Result<Vec<Project>, ClientError> {
        self.records().list().await
    }

    pub async fn get(&self, project_id: ProjectId) -> Result<Project, ClientError> {
        self.records().get(project_id.0).await
    }

    pub async fn milestones(&self, project_id: ProjectId) -> Result<Vec<Milestone>, ClientError> {
        self.api.get(&format!("/projects/{project_id}/milestones")).await
    }

    /// Marks `document_id` as the project's cover photo. The backend clears
    /// the flag on whichever photo held it before.
    pub async fn set_cover_photo(
        &self,
        project_id: ProjectId,
        document_id: DocumentId,
    ) -> Result<(), ClientError> {
        self.api
            .send_ignoring_body(
                Method::Put,
                &format!("/projects/{project_id}/cover-photo"),
                &json!({ "documentId": document_id }),
            )
            .await
    }
}
