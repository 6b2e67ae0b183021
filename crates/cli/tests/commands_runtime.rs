use std::env;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use ipmes_cli::commands::session::{self, LoginMethod};
use ipmes_cli::commands::{config, doctor, export, payments};
use ipmes_core::domain::approval::ApprovalAction;
use serde_json::{json, Value};
use tempfile::TempDir;

const API: &str = "https://ipmes.test/api";

#[test]
fn whoami_returns_config_failure_without_base_urls() {
    with_env(&[], || {
        let result = session::whoami();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "whoami");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
        assert!(payload["message"].as_str().unwrap_or_default().contains("IPMES_API_BASE_URL"));
    });
}

#[test]
fn token_login_persists_session_for_whoami() {
    let dir = TempDir::new().expect("tempdir");
    with_session_env(dir.path(), || {
        let result = session::login(LoginMethod::Token(token(&["payment_request.read"], 8)));
        assert_eq!(result.exit_code, 0, "login failed: {}", result.output);
        let payload = parse_payload(&result.output);
        assert_eq!(payload["message"], "signed in as Akinyi Otieno");

        let stored: Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("session.json")).expect("token file"),
        )
        .expect("json");
        assert!(stored["jwtToken"].as_str().is_some());

        let result = session::whoami();
        assert_eq!(result.exit_code, 0);
        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["username"], "akinyi");
        assert_eq!(payload["data"]["role_id"], 10);
        assert_eq!(payload["data"]["privileges"], json!(["payment_request.read"]));
    });
}

#[test]
fn expired_token_is_refused_and_not_stored() {
    let dir = TempDir::new().expect("tempdir");
    with_session_env(dir.path(), || {
        let result = session::login(LoginMethod::Token(token(&[], -1)));
        assert_eq!(result.exit_code, 4);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "session");
        assert!(!dir.path().join("session.json").exists());
    });
}

#[test]
fn malformed_token_is_a_session_failure() {
    let dir = TempDir::new().expect("tempdir");
    with_session_env(dir.path(), || {
        let result = session::login(LoginMethod::Token("not-a-jwt".to_string()));
        assert_eq!(result.exit_code, 4);
        assert_eq!(parse_payload(&result.output)["error_class"], "session");
    });
}

#[test]
fn logout_clears_the_stored_session() {
    let dir = TempDir::new().expect("tempdir");
    with_session_env(dir.path(), || {
        assert_eq!(session::login(LoginMethod::Token(token(&[], 8))).exit_code, 0);

        let result = session::logout();
        assert_eq!(result.exit_code, 0);
        assert_eq!(parse_payload(&result.output)["message"], "signed out");

        let result = session::whoami();
        assert_eq!(result.exit_code, 4);
        assert_eq!(parse_payload(&result.output)["error_class"], "session");
    });
}

#[test]
fn payments_need_a_session_before_any_request() {
    let dir = TempDir::new().expect("tempdir");
    with_session_env(dir.path(), || {
        let result = payments::list(Some(3));
        assert_eq!(result.exit_code, 4);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "payments.list");
        assert_eq!(payload["error_class"], "session");
    });
}

#[test]
fn approval_with_update_only_token_reaches_the_backend() {
    let dir = TempDir::new().expect("tempdir");
    let token_path = dir.path().join("session.json");
    with_env(
        &[
            ("IPMES_API_BASE_URL", "http://127.0.0.1:9"),
            ("IPMES_API_TIMEOUT_SECS", "2"),
            ("IPMES_FILE_SERVER_BASE_URL", "https://files.ipmes.test"),
            ("IPMES_SESSION_TOKEN_PATH", token_path.to_str().expect("utf-8 temp path")),
        ],
        || {
            let issued = token(&["payment_request.update"], 8);
            assert_eq!(session::login(LoginMethod::Token(issued)).exit_code, 0);

            let result = payments::act(5, ApprovalAction::Approve, None, None);
            let payload = parse_payload(&result.output);
            assert_eq!(result.exit_code, 5, "unexpected outcome: {}", result.output);
            assert_eq!(payload["command"], "payments.act");
            assert_eq!(payload["error_class"], "no_response");
        },
    );
}

#[test]
fn export_without_privilege_is_denied_locally() {
    let dir = TempDir::new().expect("tempdir");
    with_session_env(dir.path(), || {
        assert_eq!(session::login(LoginMethod::Token(token(&["project.read_all"], 8))).exit_code, 0);

        let result = export::run("projects", "pdf", dir.path().join("out"));
        assert_eq!(result.exit_code, 6);
        assert_eq!(parse_payload(&result.output)["error_class"], "permission_denied");
        assert!(!dir.path().join("out").exists());
    });
}

#[test]
fn export_rejects_unknown_format() {
    let dir = TempDir::new().expect("tempdir");
    with_session_env(dir.path(), || {
        let result = export::run("projects", "csv", dir.path().to_path_buf());
        assert_eq!(result.exit_code, 8);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "invalid_argument");
        assert!(payload["message"].as_str().unwrap_or_default().contains("xlsx|pdf"));
    });
}

#[test]
fn doctor_skips_dependent_checks_when_config_is_invalid() {
    with_env(&[], || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 1);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "fail");
        assert_eq!(payload["checks"][0]["name"], "config_validation");
        assert_eq!(payload["checks"][0]["status"], "fail");
        assert_eq!(payload["checks"][1]["status"], "skipped");
        assert_eq!(payload["checks"][2]["status"], "skipped");
    });
}

#[test]
fn config_reports_sources_and_never_prints_the_token() {
    let dir = TempDir::new().expect("tempdir");
    with_session_env(dir.path(), || {
        let issued = token(&[], 8);
        assert_eq!(session::login(LoginMethod::Token(issued.clone())).exit_code, 0);

        let output = config::run();
        assert!(output.contains(&format!("- api.base_url = {API} (source: env (IPMES_API_BASE_URL))")));
        assert!(output.contains("- api.timeout_secs = 10 (source: default)"));
        assert!(output.contains("- session.token = <redacted>"));
        assert!(!output.contains(&issued));
    });
}

/// A token for user 41 with role 10, expiring `hours` from now.
fn token(privileges: &[&str], hours: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        json!({
            "user": {
                "userId": 41,
                "username": "akinyi",
                "firstName": "Akinyi",
                "lastName": "Otieno",
                "roleId": 10,
                "privileges": privileges,
            },
            "exp": (Utc::now() + Duration::hours(hours)).timestamp(),
        })
        .to_string(),
    );
    format!("{header}.{payload}.sig")
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_session_env(dir: &Path, test_fn: impl FnOnce()) {
    let token_path = dir.join("session.json");
    let token_path = token_path.to_str().expect("utf-8 temp path");
    with_env(
        &[
            ("IPMES_API_BASE_URL", API),
            ("IPMES_FILE_SERVER_BASE_URL", "https://files.ipmes.test"),
            ("IPMES_SESSION_TOKEN_PATH", token_path),
        ],
        test_fn,
    );
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard = ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    let keys = [
        "IPMES_API_BASE_URL",
        "IPMES_API_TIMEOUT_SECS",
        "IPMES_FILE_SERVER_BASE_URL",
        "IPMES_SESSION_TOKEN_PATH",
        "IPMES_LOGGING_LEVEL",
        "IPMES_LOGGING_FORMAT",
        "IPMES_LOG_LEVEL",
        "IPMES_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
