use ipmes_client::workflow::PhotoGallery;
use ipmes_core::domain::PaymentRequestId;
use ipmes_core::privilege::Privilege;
use serde::Serialize;

use crate::commands::{runtime, CommandResult, Context};

#[derive(Debug, Serialize)]
struct PhotoOrder {
    document_id: i64,
    display_order: Option<i32>,
    url: String,
}

/// Moves the photo at `from` to `to` in a request's gallery.
pub fn reorder(request_id: i64, from: usize, to: usize) -> CommandResult {
    const COMMAND: &str = "photos.reorder";
    let context = match Context::load(COMMAND) {
        Ok(context) => context,
        Err(failure) => return failure,
    };
    if let Err(failure) = context.require(COMMAND, Privilege::DocumentUpdate) {
        return failure;
    }
    let runtime = match runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    runtime.block_on(async {
        let gallery = match PhotoGallery::load(context.api.clone(), PaymentRequestId(request_id)).await
        {
            Ok(gallery) => gallery,
            Err(error) => return CommandResult::from_client_error(COMMAND, &error),
        };

        match gallery.reorder(from, to).await {
            Ok(()) => {
                let order: Vec<PhotoOrder> = gallery
                    .photos()
                    .await
                    .into_iter()
                    .map(|photo| PhotoOrder {
                        document_id: photo.document_id.0,
                        display_order: photo.display_order,
                        url: photo.resolve_url(&context.config.files.base_url),
                    })
                    .collect();
                CommandResult::success_with_data(COMMAND, "photo order saved", order)
            }
            Err(failure) => {
                let mut result = CommandResult::from_client_error(COMMAND, &failure.error);
                if failure.restored_from.is_some() {
                    result = CommandResult::failure(
                        COMMAND,
                        "reorder_rolled_back",
                        failure.notice().message,
                        result.exit_code,
                    );
                }
                result
            }
        }
    })
}
