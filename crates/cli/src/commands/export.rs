use std::path::PathBuf;

use ipmes_client::services::ReportFormat;
use ipmes_core::privilege::Privilege;
use serde::Serialize;

use crate::commands::{runtime, CommandResult, Context};

#[derive(Debug, Serialize)]
struct SavedExport {
    path: String,
    content_type: String,
    bytes: usize,
}

pub fn run(report: &str, format: &str, out: PathBuf) -> CommandResult {
    const COMMAND: &str = "export";
    let format = match format.parse::<ReportFormat>() {
        Ok(format) => format,
        Err(message) => return CommandResult::failure(COMMAND, "invalid_argument", message, 8),
    };
    let context = match Context::load(COMMAND) {
        Ok(context) => context,
        Err(failure) => return failure,
    };
    if let Err(failure) = context.require(COMMAND, Privilege::ReportExport) {
        return failure;
    }
    let runtime = match runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let saved = runtime.block_on(async {
        let download = context.api.reports().export(report, format).await?;
        let path = download.save_to(&out).await?;
        Ok::<_, ipmes_client::error::ClientError>(SavedExport {
            path: path.display().to_string(),
            content_type: download.content_type.clone(),
            bytes: download.bytes.len(),
        })
    });

    match saved {
        Ok(saved) => {
            CommandResult::success_with_data(COMMAND, format!("saved {}", saved.path), saved)
        }
        Err(error) => CommandResult::from_client_error(COMMAND, &error),
    }
}
