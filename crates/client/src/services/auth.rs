use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::error::ClientError;
use crate::http::ApiClient;

pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: SecretString::from(password.into()) }
    }
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

pub struct AuthService<'a> {
    api: &'a ApiClient,
}

impl<'a> AuthService<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Exchanges credentials for a session token. The caller hands the token
    /// to the session, which decodes and persists it.
    pub async fn login(&self, credentials: &Credentials) -> Result<SecretString, ClientError> {
        let body = json!({
            "username": credentials.username,
            "password": credentials.password.expose_secret(),
        });
        let response: LoginResponse = self.api.post("/auth/login", &body).await?;
        info!(event_name = "auth.login.succeeded", username = %credentials.username, "login accepted");
        Ok(SecretString::from(response.token))
    }
}
