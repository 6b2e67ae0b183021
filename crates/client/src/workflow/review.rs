//! Payment request review: the detail view a reviewer acts from, and the
//! project manager's board listing a project's requests.

use std::sync::Arc;

use ipmes_core::approvals::{ActionAvailability, ActionDraft, ApprovalGuard, GuardDenial};
use ipmes_core::domain::approval::{ApprovalHistoryEntry, ApprovalLevel};
use ipmes_core::domain::payment::{PaymentRequest, PaymentStatus};
use ipmes_core::domain::user::UserSummary;
use ipmes_core::domain::{PaymentRequestId, ProjectId, UserId};
use ipmes_core::errors::{DomainError, Notice};
use ipmes_core::generations::RequestGenerations;
use ipmes_core::session::Session;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::http::ApiClient;

/// Whether a finished load was applied or discarded as stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Refresh {
    Applied,
    Stale,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReviewSnapshot {
    pub request: PaymentRequest,
    pub history: Vec<ApprovalHistoryEntry>,
    pub levels: Vec<ApprovalLevel>,
    pub directory: Vec<UserSummary>,
}

impl ReviewSnapshot {
    pub fn current_level(&self) -> Option<&ApprovalLevel> {
        let level_id = self.request.current_approval_level_id?;
        self.levels.iter().find(|level| level.level_id == level_id)
    }

    pub fn user_name(&self, user_id: UserId) -> String {
        self.directory
            .iter()
            .find(|user| user.user_id == user_id)
            .map(UserSummary::display_name)
            .unwrap_or_else(|| format!("user #{user_id}"))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ActionOutcome {
    pub status: PaymentStatus,
    pub notice: Notice,
}

pub struct PaymentReview {
    api: ApiClient,
    request_id: PaymentRequestId,
    state: Mutex<ReviewSnapshot>,
    generations: RequestGenerations,
}

impl PaymentReview {
    /// Loads the request together with its history, the approval levels
    /// and the user directory.
    pub async fn open(api: ApiClient, request_id: PaymentRequestId) -> Result<Self, ClientError> {
        let snapshot = fetch_snapshot(&api, request_id).await?;
        debug!(event_name = "payment.review.opened", request_id = %request_id, "review opened");
        Ok(Self {
            api,
            request_id,
            state: Mutex::new(snapshot),
            generations: RequestGenerations::new(),
        })
    }

    pub fn request_id(&self) -> PaymentRequestId {
        self.request_id
    }

    pub async fn snapshot(&self) -> ReviewSnapshot {
        self.state.lock().await.clone()
    }

    pub async fn availability(&self, session: &Session) -> ActionAvailability {
        let state = self.state.lock().await;
        ApprovalGuard::evaluate(session, &state.request, &state.levels)
    }

    /// Re-reads everything the view shows. A load that finishes after a
    /// newer one started is dropped.
    pub async fn refresh(&self) -> Result<Refresh, ClientError> {
        let generation = self.generations.begin();
        let snapshot = fetch_snapshot(&self.api, self.request_id).await?;

        let mut state = self.state.lock().await;
        if !self.generations.is_current(generation) {
            debug!(
                event_name = "payment.review.stale_discarded",
                request_id = %self.request_id,
                generation = generation.value(),
                "discarding stale review load"
            );
            return Ok(Refresh::Stale);
        }
        *state = snapshot;
        Ok(Refresh::Applied)
    }

    /// Submits an approval action for the current level.
    ///
    /// Nothing is sent when the guard denies the user or the draft is
    /// incomplete. Once the action call has been made the view is reloaded
    /// whether it succeeded or not, so the status shown is the server's.
    pub async fn act(
        &self,
        session: &Session,
        draft: &ActionDraft,
    ) -> Result<ActionOutcome, ClientError> {
        let level = {
            let state = self.state.lock().await;
            match ApprovalGuard::authorize(session, &state.request, &state.levels) {
                Ok(level) => level.clone(),
                Err(GuardDenial::MissingPrivilege { privilege }) => {
                    return Err(ClientError::PermissionDenied(privilege));
                }
                Err(denial) => {
                    warn!(
                        event_name = "payment.action.denied",
                        request_id = %self.request_id,
                        denial = %denial,
                        "approval action blocked by guard"
                    );
                    return Err(DomainError::from(denial).into());
                }
            }
        };
        let payload = draft.prepare(&level).map_err(DomainError::from)?;

        info!(
            event_name = "payment.action.submitted",
            request_id = %self.request_id,
            action = %payload.action,
            level = %level.level_name,
            "submitting approval action"
        );
        let action_result = self.api.payments().act(self.request_id, &payload).await;
        let refresh_result = self.refresh().await;

        if let Err(error) = action_result {
            warn!(
                event_name = "payment.action.failed",
                request_id = %self.request_id,
                error = %error,
                "approval action rejected"
            );
            return Err(error);
        }
        refresh_result?;

        let status = self.state.lock().await.request.payment_status.clone();
        info!(
            event_name = "payment.action.completed",
            request_id = %self.request_id,
            status = %status,
            "approval action recorded"
        );
        let notice = Notice::success(format!(
            "{} recorded for payment request #{}. Status: {status}.",
            payload.action, self.request_id
        ));
        Ok(ActionOutcome { status, notice })
    }
}

async fn fetch_snapshot(
    api: &ApiClient,
    request_id: PaymentRequestId,
) -> Result<ReviewSnapshot, ClientError> {
    let payments = api.payments();
    let approval_levels = api.approval_levels();
    let users = api.users();
    let (request, history, levels, directory) = tokio::try_join!(
        payments.get(request_id),
        payments.history(request_id),
        approval_levels.list(),
        users.directory(),
    )?;
    Ok(ReviewSnapshot { request, history, levels, directory })
}

/// A project's payment requests with one of them open for review.
pub struct ProjectReviewBoard {
    api: ApiClient,
    project_id: ProjectId,
    requests: Mutex<Vec<PaymentRequest>>,
    selected: Mutex<Option<Arc<PaymentReview>>>,
    generations: RequestGenerations,
}

impl ProjectReviewBoard {
    pub async fn load(api: ApiClient, project_id: ProjectId) -> Result<Self, ClientError> {
        let requests = api.payments().list(Some(project_id)).await?;
        Ok(Self {
            api,
            project_id,
            requests: Mutex::new(requests),
            selected: Mutex::new(None),
            generations: RequestGenerations::new(),
        })
    }

    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    pub async fn requests(&self) -> Vec<PaymentRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn refresh(&self) -> Result<Refresh, ClientError> {
        let generation = self.generations.begin();
        let fresh = self.api.payments().list(Some(self.project_id)).await?;

        let mut requests = self.requests.lock().await;
        if !self.generations.is_current(generation) {
            return Ok(Refresh::Stale);
        }
        *requests = fresh;
        Ok(Refresh::Applied)
    }

    /// Opens `request_id` in the inline review panel.
    pub async fn select(&self, request_id: PaymentRequestId) -> Result<Arc<PaymentReview>, ClientError> {
        let review = Arc::new(PaymentReview::open(self.api.clone(), request_id).await?);
        *self.selected.lock().await = Some(review.clone());
        Ok(review)
    }

    pub async fn selected(&self) -> Option<Arc<PaymentReview>> {
        self.selected.lock().await.clone()
    }

    pub async fn close_review(&self) {
        self.selected.lock().await.take();
    }

    /// Acts on the selected request, then reloads the list so the row
    /// shows the new status. A failed reload keeps the previous list.
    pub async fn act(&self, session: &Session, draft: &ActionDraft) -> Result<ActionOutcome, ClientError> {
        let Some(review) = self.selected().await else {
            return Err(DomainError::InvariantViolation(
                "no payment request is selected for review".to_string(),
            )
            .into());
        };
        let outcome = review.act(session, draft).await?;
        if let Err(error) = self.refresh().await {
            warn!(
                event_name = "payment.board.reload_failed",
                project_id = %self.project_id,
                error = %error,
                "could not reload payment requests after action"
            );
        }
        Ok(outcome)
    }
}
