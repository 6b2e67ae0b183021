use ipmes_core::domain::approval::{ordered_levels, ApprovalLevel, ApprovalLevelDraft};
use ipmes_core::domain::ApprovalLevelId;

use crate::error::ClientError;
use crate::http::ApiClient;

const LEVELS: &str = "/approval/levels";

pub struct ApprovalLevelsService<'a> {
    api: &'a ApiClient,
}

impl<'a> ApprovalLevelsService<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Levels sorted by approval order.
    pub async fn list(&self) -> Result<Vec<ApprovalLevel>, ClientError> {
        let levels: Vec<ApprovalLevel> = self.api.get(LEVELS).await?;
        Ok(ordered_levels(&levels))
    }

    pub async fn create(&self, draft: &ApprovalLevelDraft) -> Result<ApprovalLevel, ClientError> {
        self.api.post(LEVELS, draft).await
    }

    pub async fn update(
        &self,
        level_id: ApprovalLevelId,
        draft: &ApprovalLevelDraft,
    ) -> Result<ApprovalLevel, ClientError> {
        self.api.put(&format!("{LEVELS}/{level_id}"), draft).await
    }

    pub async fn delete(&self, level_id: ApprovalLevelId) -> Result<(), ClientError> {
        self.api.delete(&format!("{LEVELS}/{level_id}")).await
    }
}
