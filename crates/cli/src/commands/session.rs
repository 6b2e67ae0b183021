use chrono::{DateTime, Utc};
use ipmes_client::services::Credentials;
use ipmes_core::domain::user::User;
use ipmes_core::privilege::Privilege;
use secrecy::ExposeSecret;
use serde::Serialize;

use crate::commands::{runtime, session_failure, CommandResult, Context};

/// How `ipmes login` obtains its token.
#[derive(Debug, Clone)]
pub enum LoginMethod {
    /// Exchange a username and password at `/auth/login`.
    Credentials { username: String, password: String },
    /// Store a token issued elsewhere.
    Token(String),
}

#[derive(Debug, Serialize)]
struct SessionView {
    user_id: i64,
    username: String,
    display_name: String,
    role_id: i64,
    role_name: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    privileges: Vec<Privilege>,
    token_path: String,
}

impl SessionView {
    fn new(user: &User, expires_at: Option<DateTime<Utc>>, context: &Context) -> Self {
        Self {
            user_id: user.user_id.0,
            username: user.username.clone(),
            display_name: user.display_name(),
            role_id: user.role_id.0,
            role_name: user.role_name.clone(),
            expires_at,
            privileges: user.privileges.iter().collect(),
            token_path: context.config.session.token_path.display().to_string(),
        }
    }
}

pub fn login(method: LoginMethod) -> CommandResult {
    const COMMAND: &str = "login";
    let mut context = match Context::load(COMMAND) {
        Ok(context) => context,
        Err(failure) => return failure,
    };

    let token = match method {
        LoginMethod::Token(token) => token,
        LoginMethod::Credentials { username, password } => {
            let runtime = match runtime(COMMAND) {
                Ok(runtime) => runtime,
                Err(failure) => return failure,
            };
            let credentials = Credentials::new(username, password);
            match runtime.block_on(context.api.auth().login(&credentials)) {
                Ok(token) => token.expose_secret().to_string(),
                Err(error) => return CommandResult::from_client_error(COMMAND, &error),
            }
        }
    };

    let (user, expires_at) = match context.session.login(token, Utc::now()) {
        Ok(user) => (user.clone(), context.session.expires_at()),
        Err(error) => return session_failure(COMMAND, error),
    };
    let view = SessionView::new(&user, expires_at, &context);
    CommandResult::success_with_data(
        COMMAND,
        format!("signed in as {}", user.display_name()),
        view,
    )
}

pub fn logout() -> CommandResult {
    const COMMAND: &str = "logout";
    let mut context = match Context::load(COMMAND) {
        Ok(context) => context,
        Err(failure) => return failure,
    };

    let was_signed_in = context.session.is_authenticated();
    if let Err(error) = context.session.logout() {
        return session_failure(COMMAND, error);
    }
    let message = if was_signed_in { "signed out" } else { "no active session" };
    CommandResult::success(COMMAND, message)
}

pub fn whoami() -> CommandResult {
    const COMMAND: &str = "whoami";
    let context = match Context::load(COMMAND) {
        Ok(context) => context,
        Err(failure) => return failure,
    };
    if let Err(failure) = context.require_signed_in(COMMAND) {
        return failure;
    }

    match context.session.user() {
        Some(user) => {
            let view = SessionView::new(user, context.session.expires_at(), &context);
            CommandResult::success_with_data(COMMAND, format!("signed in as {}", user.display_name()), view)
        }
        None => CommandResult::failure(COMMAND, "session", "not signed in", 4),
    }
}
