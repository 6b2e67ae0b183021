use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde::Serialize;

use super::{HttpRequest, HttpResponse, HttpTransport, Method, TransportError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptedResponse(Result<HttpResponse, TransportError>);

impl ScriptedResponse {
    pub fn json<T: Serialize>(status: u16, body: T) -> Self {
        let body = serde_json::to_vec(&body).unwrap_or_default();
        Self(Ok(HttpResponse {
            status,
            content_type: Some("application/json".to_string()),
            content_disposition: None,
            body,
        }))
    }

    pub fn empty(status: u16) -> Self {
        Self(Ok(HttpResponse { status, ..HttpResponse::default() }))
    }

    pub fn bytes(
        status: u16,
        content_type: &str,
        content_disposition: Option<&str>,
        body: Vec<u8>,
    ) -> Self {
        Self(Ok(HttpResponse {
            status,
            content_type: Some(content_type.to_string()),
            content_disposition: content_disposition.map(str::to_string),
            body,
        }))
    }

    pub fn timeout() -> Self {
        Self(Err(TransportError::Timeout("scripted timeout".to_string())))
    }

    pub fn unreachable() -> Self {
        Self(Err(TransportError::Connect("scripted connection refused".to_string())))
    }
}

#[derive(Default)]
struct ScriptState {
    routes: HashMap<(Method, String), VecDeque<ScriptedResponse>>,
    queue: VecDeque<ScriptedResponse>,
    requests: Vec<HttpRequest>,
}

/// Replays scripted responses and records every request it receives.
///
/// Responses registered with [`ScriptedTransport::on`] answer a specific
/// method and path; anything else is answered from the [`push`] queue in
/// order. A request with nothing scripted fails as a transport error.
///
/// [`push`]: ScriptedTransport::push
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ScriptState> {
        match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn push(&self, response: ScriptedResponse) {
        self.state().queue.push_back(response);
    }

    pub fn on(&self, method: Method, path: impl Into<String>, response: ScriptedResponse) {
        self.state().routes.entry((method, path.into())).or_default().push_back(response);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state().requests.clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.state()
            .requests
            .iter()
            .filter(|request| request.method == method && request.path == path)
            .count()
    }

    pub fn clear_requests(&self) {
        self.state().requests.clear();
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut state = self.state();
        let key = (request.method, request.path.clone());
        let routed = state.routes.get_mut(&key).and_then(VecDeque::pop_front);
        let scripted = match routed {
            Some(response) => Some(response),
            None => state.queue.pop_front(),
        };
        let label = format!("{} {}", request.method, request.path);
        state.requests.push(request);

        match scripted {
            Some(ScriptedResponse(result)) => result,
            None => Err(TransportError::Other(format!("no scripted response for {label}"))),
        }
    }
}
