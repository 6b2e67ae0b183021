use std::sync::Arc;

use anyhow::{Context as _, Result};
use chrono::Utc;
use ipmes_client::error::ApiError;
use ipmes_client::http::{ApiClient, HttpRequest, Method};
use ipmes_core::config::{AppConfig, LoadOptions};
use ipmes_core::session::{FileTokenStore, Session, TokenStore};
use serde::Serialize;

use crate::commands::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

/// Exits 0 when every check passes and 1 otherwise.
pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_session(&config));
            checks.push(check_api_reachability(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["session_token", "api_reachability"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_session(config: &AppConfig) -> DoctorCheck {
    let path = &config.session.token_path;
    let store = FileTokenStore::new(path);
    let had_token = matches!(store.load(), Ok(Some(_)));
    let session = Session::initialize(Arc::new(store), Utc::now());

    match (session.user(), session.expires_at()) {
        (Some(user), Some(expires_at)) => DoctorCheck {
            name: "session_token",
            status: CheckStatus::Pass,
            details: format!("signed in as `{}` until {}", user.username, expires_at.to_rfc3339()),
        },
        _ if had_token => DoctorCheck {
            name: "session_token",
            status: CheckStatus::Fail,
            details: format!(
                "stored token in `{}` was invalid or expired and has been cleared; run `ipmes login`",
                path.display()
            ),
        },
        _ => DoctorCheck {
            name: "session_token",
            status: CheckStatus::Fail,
            details: format!("no session token in `{}`; run `ipmes login`", path.display()),
        },
    }
}

fn check_api_reachability(config: &AppConfig) -> DoctorCheck {
    match check_api_reachable(config) {
        Ok(details) => DoctorCheck { name: "api_reachability", status: CheckStatus::Pass, details },
        Err(error) => DoctorCheck {
            name: "api_reachability",
            status: CheckStatus::Fail,
            details: format!("{error:#}"),
        },
    }
}

/// Any HTTP response, including an error status, proves the API is reachable.
fn check_api_reachable(config: &AppConfig) -> Result<String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to initialize async runtime")?;
    let store = Arc::new(FileTokenStore::new(&config.session.token_path));
    let api = ApiClient::from_config(&config.api, store).context("failed to build HTTP client")?;

    let response = runtime.block_on(api.execute(HttpRequest::new(Method::Get, "/approval/levels")));
    match response {
        Ok(response) => Ok(format!("`{}` responded with status {}", config.api.base_url, response.status)),
        Err(ApiError::Response { status, .. }) => {
            Ok(format!("`{}` responded with status {status}", config.api.base_url))
        }
        Err(error @ ApiError::NoResponse { .. }) => Err(anyhow::Error::new(error)
            .context(format!("`{}` did not respond", config.api.base_url))),
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
