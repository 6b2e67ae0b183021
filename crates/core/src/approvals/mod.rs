//! Client-side gating and drafting of payment-request approval actions.
//!
//! The backend owns the approval state machine. What the client decides is
//! narrower: whether the signed-in user may act on the request's current
//! level, and whether the action they drafted is complete enough to send.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::approval::{ApprovalAction, ApprovalActionPayload, ApprovalLevel};
use crate::domain::payment::PaymentRequest;
use crate::domain::{ApprovalLevelId, RoleId, UserId};
use crate::privilege::Privilege;
use crate::session::Session;

pub const ACTION_PRIVILEGE: Privilege = Privilege::PaymentRequestUpdate;

#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GuardDenial {
    #[error("you are not signed in")]
    SignedOut,
    #[error("missing `{privilege}` privilege")]
    MissingPrivilege { privilege: Privilege },
    #[error("the request is not awaiting approval at any level")]
    NoCurrentLevel,
    #[error("approval level {level_id} is not configured")]
    UnknownLevel { level_id: ApprovalLevelId },
    #[error("only role {required_role} may act at the `{level_name}` level (your role is {user_role})")]
    RoleMismatch { level_name: String, required_role: RoleId, user_role: RoleId },
}

#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionValidationError {
    #[error("notes are required for `{action}`")]
    NotesRequired { action: ApprovalAction },
}

/// Whether the approve/reject/return controls are enabled, and why not.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionAvailability {
    pub enabled: bool,
    pub reason: String,
    pub denial: Option<GuardDenial>,
    pub level: Option<ApprovalLevel>,
}

impl ActionAvailability {
    fn allow(level: ApprovalLevel) -> Self {
        Self {
            enabled: true,
            reason: format!("awaiting action at the `{}` level", level.level_name),
            denial: None,
            level: Some(level),
        }
    }

    fn deny(denial: GuardDenial, level: Option<ApprovalLevel>) -> Self {
        Self { enabled: false, reason: denial.to_string(), denial: Some(denial), level }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ApprovalGuard;

impl ApprovalGuard {
    /// Returns the level the user may act on, or the first reason they may not.
    pub fn authorize<'a>(
        session: &Session,
        request: &PaymentRequest,
        levels: &'a [ApprovalLevel],
    ) -> Result<&'a ApprovalLevel, GuardDenial> {
        let Some(user) = session.user() else {
            return Err(GuardDenial::SignedOut);
        };

        if !session.has_privilege(ACTION_PRIVILEGE) {
            return Err(GuardDenial::MissingPrivilege { privilege: ACTION_PRIVILEGE });
        }

        let Some(level_id) = request.current_approval_level_id else {
            return Err(GuardDenial::NoCurrentLevel);
        };

        let Some(level) = levels.iter().find(|level| level.level_id == level_id) else {
            return Err(GuardDenial::UnknownLevel { level_id });
        };

        if user.role_id != level.role_id {
            return Err(GuardDenial::RoleMismatch {
                level_name: level.level_name.clone(),
                required_role: level.role_id,
                user_role: user.role_id,
            });
        }

        Ok(level)
    }

    pub fn evaluate(
        session: &Session,
        request: &PaymentRequest,
        levels: &[ApprovalLevel],
    ) -> ActionAvailability {
        match Self::authorize(session, request, levels) {
            Ok(level) => ActionAvailability::allow(level.clone()),
            Err(denial) => {
                let level = request
                    .current_approval_level_id
                    .and_then(|id| levels.iter().find(|level| level.level_id == id))
                    .cloned();
                ActionAvailability::deny(denial, level)
            }
        }
    }
}

/// An approval action as typed by the reviewer, before validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDraft {
    pub action: ApprovalAction,
    pub notes: String,
    pub assigned_to: Option<UserId>,
}

impl ActionDraft {
    pub fn new(action: ApprovalAction, notes: impl Into<String>) -> Self {
        Self { action, notes: notes.into(), assigned_to: None }
    }

    pub fn assign_to(mut self, user_id: UserId) -> Self {
        self.assigned_to = Some(user_id);
        self
    }

    /// Validates the draft against the level being acted on.
    ///
    /// Reject and return need a reason. Approve without notes records a
    /// generated note naming the level.
    pub fn prepare(
        &self,
        level: &ApprovalLevel,
    ) -> Result<ApprovalActionPayload, ActionValidationError> {
        let notes = self.notes.trim();
        let notes = if notes.is_empty() {
            if self.action.requires_notes() {
                return Err(ActionValidationError::NotesRequired { action: self.action });
            }
            default_approval_note(level)
        } else {
            notes.to_string()
        };

        Ok(ApprovalActionPayload {
            action: self.action,
            notes,
            assigned_to_user_id: self.assigned_to,
        })
    }
}

pub fn default_approval_note(level: &ApprovalLevel) -> String {
    format!("Approved at {} level.", level.level_name)
}
