//! Transport seam and the request pipeline every service call goes through.

mod remote;
mod scripted;

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use ipmes_core::config::ApiConfig;
use ipmes_core::session::TokenStore;
use ipmes_core::upload::UploadPayload;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::{ApiError, ClientError};

pub use remote::ReqwestTransport;
pub use scripted::{ScriptedResponse, ScriptedTransport};

pub const AUTHORIZATION: &str = "Authorization";
pub const CORRELATION_ID: &str = "X-Correlation-Id";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(UploadPayload),
}

#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// Path relative to the API base URL, e.g. `/payment-requests/4`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn with_multipart(mut self, payload: UploadPayload) -> Self {
        self.body = RequestBody::Multipart(payload);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value));
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("could not connect: {0}")]
    Connect(String),
    #[error("transport failure: {0}")]
    Other(String),
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// The single request pipeline: bearer token in, normalized errors out.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<dyn TokenStore>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient").finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(transport: Arc<dyn HttpTransport>, tokens: Arc<dyn TokenStore>) -> Self {
        Self { transport, tokens }
    }

    pub fn from_config(
        config: &ApiConfig,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::new(&config.base_url, config.timeout())?;
        Ok(Self::new(Arc::new(transport), tokens))
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Sends `request` and returns the raw response if it succeeded.
    pub async fn execute(&self, mut request: HttpRequest) -> Result<HttpResponse, ApiError> {
        match self.tokens.load() {
            Ok(Some(token)) => {
                request.set_header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()));
            }
            Ok(None) => {}
            Err(error) => {
                warn!(
                    event_name = "http.request.token_unavailable",
                    error = %error,
                    "sending request without a bearer token"
                );
            }
        }
        let correlation_id = uuid::Uuid::new_v4().to_string();
        request.set_header(CORRELATION_ID, correlation_id.clone());

        let method = request.method;
        let path = request.path.clone();
        let started = Instant::now();

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(error) => {
                warn!(
                    event_name = "http.request.no_response",
                    method = %method,
                    path = %path,
                    correlation_id = %correlation_id,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %error,
                    "request failed without a response"
                );
                return Err(ApiError::NoResponse { reason: error.to_string() });
            }
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        if response.is_success() {
            debug!(
                event_name = "http.request.completed",
                method = %method,
                path = %path,
                correlation_id = %correlation_id,
                status = response.status,
                elapsed_ms,
                "request completed"
            );
            return Ok(response);
        }

        let error = ApiError::from_response(response.status, &response.body);
        warn!(
            event_name = "http.request.failed",
            method = %method,
            path = %path,
            correlation_id = %correlation_id,
            status = response.status,
            elapsed_ms,
            error = %error,
            "request returned an error status"
        );
        Err(error)
    }

    pub async fn request<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, ClientError> {
        let response = self.execute(request).await?;
        decode_json(&response)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.request(HttpRequest::new(Method::Get, path)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(HttpRequest::new(Method::Post, path).with_json(to_json(body)?)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(HttpRequest::new(Method::Put, path).with_json(to_json(body)?)).await
    }

    /// Deletes `path`. Whatever the server sends back on success is ignored.
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.execute(HttpRequest::new(Method::Delete, path)).await?;
        Ok(())
    }

    /// Sends a JSON mutation whose success body carries nothing the caller
    /// needs; the body is not decoded, so plain-text replies count as success.
    pub async fn send_ignoring_body<B>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<(), ClientError>
    where
        B: Serialize + ?Sized,
    {
        self.execute(HttpRequest::new(method, path).with_json(to_json(body)?)).await?;
        Ok(())
    }

    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: UploadPayload,
    ) -> Result<T, ClientError> {
        info!(
            event_name = "http.upload.started",
            path = %path,
            files = payload.files.len(),
            "uploading files"
        );
        self.request(HttpRequest::new(Method::Post, path).with_multipart(payload)).await
    }
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<Value, ClientError> {
    serde_json::to_value(body).map_err(|error| ClientError::Decode(error.to_string()))
}

/// Empty bodies decode as JSON `null`, so unit and `Option` targets accept them.
pub(crate) fn decode_json<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ClientError> {
    let value = if response.body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(&response.body)
            .map_err(|error| ClientError::Decode(error.to_string()))?
    };
    serde_json::from_value(value).map_err(|error| ClientError::Decode(error.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ipmes_core::session::{InMemoryTokenStore, TokenStore};
    use serde_json::{json, Value};

    use super::{ApiClient, HttpRequest, Method, ScriptedResponse, ScriptedTransport};
    use crate::error::{ApiError, ClientError};

    fn client(transport: &ScriptedTransport, tokens: InMemoryTokenStore) -> ApiClient {
        ApiClient::new(Arc::new(transport.clone()), Arc::new(tokens))
    }

    #[tokio::test]
    async fn stored_token_is_attached_as_bearer() {
        let transport = ScriptedTransport::default();
        transport.push(ScriptedResponse::json(200, json!({"ok": true})));
        let api = client(&transport, InMemoryTokenStore::with_token("abc.def.ghi"));

        let _: Value = api.get("/projects").await.expect("success");

        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].header("authorization"), Some("Bearer abc.def.ghi"));
        assert!(sent[0].header("x-correlation-id").is_some());
    }

    #[tokio::test]
    async fn token_is_read_fresh_for_every_request() {
        let transport = ScriptedTransport::default();
        transport.push(ScriptedResponse::empty(204));
        transport.push(ScriptedResponse::empty(204));
        let tokens = InMemoryTokenStore::default();
        let api = client(&transport, tokens.clone());

        api.delete("/documents/1").await.expect("first");
        tokens.save(&"later.token.value".to_string().into()).expect("save");
        api.delete("/documents/2").await.expect("second");

        let sent = transport.requests();
        assert_eq!(sent[0].header("Authorization"), None);
        assert_eq!(sent[1].header("Authorization"), Some("Bearer later.token.value"));
    }

    #[tokio::test]
    async fn error_without_body_is_generic_not_empty() {
        let transport = ScriptedTransport::default();
        transport.push(ScriptedResponse::empty(503));
        let api = client(&transport, InMemoryTokenStore::default());

        let error = api.get::<Value>("/payment-requests").await.expect_err("503");

        let ClientError::Api(ApiError::Response { status, message, .. }) = error else {
            panic!("expected response error");
        };
        assert_eq!(status, 503);
        assert_eq!(message, "Request failed with status 503");
    }

    #[tokio::test]
    async fn transport_failure_becomes_no_response() {
        let transport = ScriptedTransport::default();
        transport.push(ScriptedResponse::timeout());
        let api = client(&transport, InMemoryTokenStore::default());

        let error = api
            .request::<Value>(HttpRequest::new(Method::Get, "/users"))
            .await
            .expect_err("timeout");
        assert!(matches!(error, ClientError::Api(ApiError::NoResponse { .. })));
    }

    #[tokio::test]
    async fn plain_text_success_body_is_not_decoded() {
        let transport = ScriptedTransport::default();
        transport.push(ScriptedResponse::bytes(200, "text/plain", None, b"OK".to_vec()));
        let api = client(&transport, InMemoryTokenStore::default());

        api.send_ignoring_body(Method::Put, "/documents/reorder", &json!([]))
            .await
            .expect("2xx is success whatever the body");
        assert_eq!(transport.requests()[0].method, Method::Put);
    }

    #[tokio::test]
    async fn empty_success_body_decodes_as_null() {
        let transport = ScriptedTransport::default();
        transport.push(ScriptedResponse::empty(200));
        let api = client(&transport, InMemoryTokenStore::default());

        let value: Option<Value> = api.post("/documents/reorder", &json!([])).await.expect("ok");
        assert!(value.is_none());
    }
}
