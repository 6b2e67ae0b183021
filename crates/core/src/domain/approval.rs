use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ApprovalLevelId, RoleId, UserId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApprovalAction {
    Approve,
    Reject,
    #[serde(rename = "Returned for Correction")]
    ReturnedForCorrection,
}

impl ApprovalAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "Approve",
            Self::Reject => "Reject",
            Self::ReturnedForCorrection => "Returned for Correction",
        }
    }

    pub fn requires_notes(&self) -> bool {
        !matches!(self, Self::Approve)
    }
}

impl fmt::Display for ApprovalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ApprovalAction {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            "return" | "returned for correction" => Ok(Self::ReturnedForCorrection),
            other => Err(format!("unsupported approval action `{other}`")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalLevel {
    pub level_id: ApprovalLevelId,
    pub level_name: String,
    pub role_id: RoleId,
    pub approval_order: i32,
}

/// Body for creating or updating an approval level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalLevelDraft {
    pub level_name: String,
    pub role_id: RoleId,
    pub approval_order: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalHistoryEntry {
    #[serde(default)]
    pub history_id: Option<i64>,
    pub action: ApprovalAction,
    #[serde(default)]
    pub notes: String,
    pub action_by_user_id: UserId,
    #[serde(default)]
    pub assigned_to_user_id: Option<UserId>,
    pub action_date: DateTime<Utc>,
}

/// Body of `POST /payment-requests/{id}/actions`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalActionPayload {
    pub action: ApprovalAction,
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to_user_id: Option<UserId>,
}

/// Levels in the order a request passes through them.
pub fn ordered_levels(levels: &[ApprovalLevel]) -> Vec<ApprovalLevel> {
    let mut ordered = levels.to_vec();
    ordered.sort_by_key(|level| level.approval_order);
    ordered
}
