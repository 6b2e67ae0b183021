use std::time::Duration;

use async_trait::async_trait;
use ipmes_core::upload::UploadPayload;
use reqwest::header::{HeaderName, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::Client;

use super::{HttpRequest, HttpResponse, HttpTransport, Method, RequestBody, TransportError};
use crate::error::ClientError;

/// Sends requests to the backend over HTTP.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| {
                ClientError::Io(std::io::Error::other(format!("could not build HTTP client: {error}")))
            })?;

        Ok(Self { client, base_url: base_url.into().trim_end_matches('/').to_string() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn multipart_form(payload: UploadPayload) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for (name, value) in payload.fields {
        form = form.text(name, value);
    }
    for file in payload.files {
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)
            .map_err(|error| TransportError::Other(format!("invalid content type: {error}")))?;
        form = form.part(UploadPayload::FILE_FIELD, part);
    }
    Ok(form)
}

fn classify(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(error.to_string())
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else {
        TransportError::Other(error.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = self.url(&request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::Multipart(payload) => builder.multipart(multipart_form(payload)?),
        };

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let header = |name: HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        let content_type = header(CONTENT_TYPE);
        let content_disposition = header(CONTENT_DISPOSITION);
        let body = response.bytes().await.map_err(classify)?.to_vec();

        Ok(HttpResponse { status, content_type, content_disposition, body })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::ReqwestTransport;

    #[test]
    fn paths_join_onto_base_url_without_double_slashes() {
        let transport = ReqwestTransport::new("https://ipmes.example/api/", Duration::from_secs(10))
            .expect("client builds");

        assert_eq!(transport.base_url(), "https://ipmes.example/api");
        assert_eq!(transport.url("/projects/4"), "https://ipmes.example/api/projects/4");
        assert_eq!(transport.url("documents"), "https://ipmes.example/api/documents");
    }
}
