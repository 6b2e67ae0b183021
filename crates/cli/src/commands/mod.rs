pub mod config;
pub mod doctor;
pub mod export;
pub mod payments;
pub mod photos;
pub mod session;

use std::sync::Arc;

use chrono::Utc;
use ipmes_client::error::{ApiError, ClientError};
use ipmes_client::http::ApiClient;
use ipmes_core::config::{AppConfig, LoadOptions};
use ipmes_core::errors::DomainError;
use ipmes_core::privilege::Privilege;
use ipmes_core::session::{FileTokenStore, Session, SessionError};
use serde::Serialize;
use serde_json::Value;
use tokio::runtime::Runtime;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with_data(command, message, Value::Null)
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: impl Serialize,
    ) -> Self {
        let data = match serde_json::to_value(data) {
            Ok(Value::Null) => None,
            Ok(value) => Some(value),
            Err(error) => {
                return Self::failure(command, "serialization", error.to_string(), 1);
            }
        };
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Maps a client failure to an error class and exit code.
    ///
    /// | class               | exit |
    /// |---------------------|------|
    /// | `session`           | 4    |
    /// | `unauthorized`      | 4    |
    /// | `api`, `no_response`, `decode` | 5 |
    /// | `permission_denied` | 6    |
    /// | `validation`        | 6    |
    /// | `io`                | 7    |
    pub fn from_client_error(command: &str, error: &ClientError) -> Self {
        let (error_class, exit_code) = match error {
            ClientError::Api(api_error) if api_error.is_unauthorized() => ("unauthorized", 4),
            ClientError::Api(ApiError::Response { .. }) => ("api", 5),
            ClientError::Api(ApiError::NoResponse { .. }) => ("no_response", 5),
            ClientError::Decode(_) => ("decode", 5),
            ClientError::PermissionDenied(_)
            | ClientError::Domain(DomainError::PermissionDenied(_))
            | ClientError::Domain(DomainError::Guard(_)) => ("permission_denied", 6),
            ClientError::Domain(DomainError::Session(_)) => ("session", 4),
            ClientError::Domain(_) => ("validation", 6),
            ClientError::Io(_) => ("io", 7),
        };
        Self::failure(command, error_class, error.user_message(), exit_code)
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Everything a command needs to talk to the backend as the stored user.
pub(crate) struct Context {
    pub config: AppConfig,
    pub session: Session,
    pub api: ApiClient,
}

impl Context {
    pub(crate) fn load(command: &str) -> Result<Self, CommandResult> {
        let config = AppConfig::load(LoadOptions::default()).map_err(|error| {
            CommandResult::failure(
                command,
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            )
        })?;

        let store = Arc::new(FileTokenStore::new(&config.session.token_path));
        let session = Session::initialize(store.clone(), Utc::now());
        let api = ApiClient::from_config(&config.api, store).map_err(|error| {
            CommandResult::failure(
                command,
                "runtime_init",
                format!("failed to build HTTP client: {error}"),
                3,
            )
        })?;

        Ok(Self { config, session, api })
    }

    pub(crate) fn require_signed_in(&self, command: &str) -> Result<(), CommandResult> {
        if self.session.is_authenticated() {
            return Ok(());
        }
        Err(CommandResult::failure(
            command,
            "session",
            "not signed in; run `ipmes login` first",
            4,
        ))
    }

    pub(crate) fn require(&self, command: &str, privilege: Privilege) -> Result<(), CommandResult> {
        self.require_signed_in(command)?;
        self.session
            .require(privilege)
            .map_err(|error| CommandResult::from_client_error(command, &ClientError::from(error)))
    }
}

pub(crate) fn runtime(command: &str) -> Result<Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            3,
        )
    })
}

pub(crate) fn session_failure(command: &str, error: SessionError) -> CommandResult {
    CommandResult::from_client_error(command, &ClientError::from(error))
}
