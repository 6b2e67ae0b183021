use ipmes_client::workflow::PaymentReview;
use ipmes_core::approvals::ActionDraft;
use ipmes_core::domain::approval::{ApprovalAction, ApprovalLevel};
use ipmes_core::domain::payment::{PaymentRequest, PaymentStatus};
use ipmes_core::domain::{PaymentRequestId, ProjectId, UserId};
use ipmes_core::privilege::Privilege;
use serde::Serialize;

use crate::commands::{runtime, CommandResult, Context};

#[derive(Debug, Serialize)]
struct HistoryRow {
    action: ApprovalAction,
    notes: String,
    action_by: String,
    assigned_to: Option<String>,
    action_date: String,
}

#[derive(Debug, Serialize)]
struct RequestDetail {
    request: PaymentRequest,
    current_level: Option<ApprovalLevel>,
    actions_enabled: bool,
    actions_reason: String,
    history: Vec<HistoryRow>,
}

#[derive(Debug, Serialize)]
struct ActionResult {
    request_id: PaymentRequestId,
    action: ApprovalAction,
    status: PaymentStatus,
}

pub fn list(project: Option<i64>) -> CommandResult {
    const COMMAND: &str = "payments.list";
    let (context, runtime) = match prepare(COMMAND, Some(Privilege::PaymentRequestRead)) {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    match runtime.block_on(context.api.payments().list(project.map(ProjectId))) {
        Ok(requests) => CommandResult::success_with_data(
            COMMAND,
            format!("{} payment request(s)", requests.len()),
            requests,
        ),
        Err(error) => CommandResult::from_client_error(COMMAND, &error),
    }
}

pub fn show(request_id: i64) -> CommandResult {
    const COMMAND: &str = "payments.show";
    let (context, runtime) = match prepare(COMMAND, Some(Privilege::PaymentRequestRead)) {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let detail = runtime.block_on(async {
        let review = PaymentReview::open(context.api.clone(), PaymentRequestId(request_id)).await?;
        let snapshot = review.snapshot().await;
        let availability = review.availability(&context.session).await;

        let history = snapshot
            .history
            .iter()
            .map(|entry| HistoryRow {
                action: entry.action,
                notes: entry.notes.clone(),
                action_by: snapshot.user_name(entry.action_by_user_id),
                assigned_to: entry.assigned_to_user_id.map(|user_id| snapshot.user_name(user_id)),
                action_date: entry.action_date.to_rfc3339(),
            })
            .collect();

        Ok::<_, ipmes_client::error::ClientError>(RequestDetail {
            current_level: snapshot.current_level().cloned(),
            actions_enabled: availability.enabled,
            actions_reason: availability.reason,
            history,
            request: snapshot.request,
        })
    });

    match detail {
        Ok(detail) => CommandResult::success_with_data(
            COMMAND,
            format!("payment request #{request_id}: {}", detail.request.payment_status),
            detail,
        ),
        Err(error) => CommandResult::from_client_error(COMMAND, &error),
    }
}

/// Approves, rejects or returns a request at its current level.
pub fn act(
    request_id: i64,
    action: ApprovalAction,
    notes: Option<String>,
    assign_to: Option<i64>,
) -> CommandResult {
    const COMMAND: &str = "payments.act";
    let (context, runtime) = match prepare(COMMAND, None) {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let mut draft = ActionDraft::new(action, notes.unwrap_or_default());
    if let Some(user_id) = assign_to {
        draft = draft.assign_to(UserId(user_id));
    }

    let outcome = runtime.block_on(async {
        let review = PaymentReview::open(context.api.clone(), PaymentRequestId(request_id)).await?;
        review.act(&context.session, &draft).await
    });

    match outcome {
        Ok(outcome) => CommandResult::success_with_data(
            COMMAND,
            outcome.notice.message,
            ActionResult {
                request_id: PaymentRequestId(request_id),
                action,
                status: outcome.status,
            },
        ),
        Err(error) => CommandResult::from_client_error(COMMAND, &error),
    }
}

/// Without a privilege only a session is required; approval actions leave
/// the rest to the review guard, which checks privilege and role together.
fn prepare(
    command: &str,
    privilege: Option<Privilege>,
) -> Result<(Context, tokio::runtime::Runtime), CommandResult> {
    let context = Context::load(command)?;
    match privilege {
        Some(privilege) => context.require(command, privilege)?,
        None => context.require_signed_in(command)?,
    }
    let runtime = runtime(command)?;
    Ok((context, runtime))
}
