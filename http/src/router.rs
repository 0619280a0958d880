//! # Router: ordered layer stack
//!
//! Every registered raw handler becomes one layer. A request walks the stack
//! in registration order; each matching layer runs with a `Next` that resumes
//! the walk after it. `use` layers match by prefix and any method, verb layers
//! match the whole path and their method.
//!
//! When the walk ends without a finished response the request gets
//! `404 Cannot <METHOD> <path>`; a handler error ends it with `500`.

use crate::error::ServerError;
use crate::routing::match_path;
use crate::server::{self, Server};
use crate::service::RouterService;
use basics_core::{
    BoxError, BoxRawHandler, Dispatcher, HandlerFuture, HandlerResult, Next, PathArgs,
    PathPattern, RawHandler, Request, Response, Verb,
};
use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::Instrument;

/// One registered raw handler with its matching rule.
#[derive(Clone)]
pub(crate) struct Layer {
    verb: Verb,
    patterns: Vec<PathPattern>,
    handler: BoxRawHandler,
}

impl Layer {
    fn matches(&self, request: &Request) -> Option<HashMap<String, String>> {
        if !self.verb.accepts(request.method()) {
            return None;
        }

        if self.patterns.is_empty() {
            return Some(HashMap::new());
        }

        self.patterns
            .iter()
            .find_map(|pattern| match_path(pattern.as_str(), request.path(), self.verb.is_prefix()))
    }
}

/// Immutable snapshot of the layers, shared by every request of a server.
pub(crate) type Stack = Arc<[Layer]>;

#[derive(Clone, Default)]
pub struct Router {
    layers: Vec<Layer>,
    settings: HashMap<String, Value>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount raw middleware by prefix (all paths when `paths` is empty).
    pub fn layer(&mut self, paths: impl Into<PathArgs>, handler: impl RawHandler) -> &mut Self {
        self.register(Verb::Use, paths.into().into_patterns(), vec![Arc::new(handler)])
    }

    /// Register raw handlers under a verb.
    pub fn route(
        &mut self,
        verb: Verb,
        paths: impl Into<PathArgs>,
        handler: impl RawHandler,
    ) -> &mut Self {
        self.register(verb, paths.into().into_patterns(), vec![Arc::new(handler)])
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Store an application setting.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.settings.insert(name.into(), value.into());
        self
    }

    pub fn setting(&self, name: &str) -> Option<&Value> {
        self.settings.get(name)
    }

    pub fn enable(&mut self, name: impl Into<String>) -> &mut Self {
        self.set(name, true)
    }

    pub fn disable(&mut self, name: impl Into<String>) -> &mut Self {
        self.set(name, false)
    }

    pub fn enabled(&self, name: &str) -> bool {
        self.settings.get(name).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn disabled(&self, name: &str) -> bool {
        !self.enabled(name)
    }

    /// In-process `tower::Service` over the layers registered so far.
    pub fn service(&self) -> RouterService {
        RouterService::new(self.stack())
    }

    /// Dispatch one request through the layers registered so far.
    pub async fn handle<B>(&self, request: http::Request<B>) -> http::Response<Full<Bytes>>
    where
        B: http_body::Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        dispatch(self.stack(), request).await
    }

    fn stack(&self) -> Stack {
        Arc::from(self.layers.clone())
    }
}

impl Dispatcher for Router {
    type Server = Server;
    type Error = ServerError;

    fn register(
        &mut self,
        verb: Verb,
        paths: Vec<PathPattern>,
        handlers: Vec<BoxRawHandler>,
    ) -> &mut Self {
        for handler in handlers {
            self.layers.push(Layer {
                verb,
                patterns: paths.clone(),
                handler,
            });
        }
        self
    }

    /// Snapshots the current layers; later registrations do not reach the
    /// returned server.
    fn listen(&self, addr: SocketAddr) -> impl Future<Output = Result<Server, ServerError>> + Send {
        server::bind(addr, self.stack())
    }
}

/// Run the stack for one request and render the outcome.
pub(crate) async fn dispatch<B>(stack: Stack, request: http::Request<B>) -> http::Response<Full<Bytes>>
where
    B: http_body::Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    let request = Request::from_http(request);
    let response = Response::new();
    let method = request.method().clone();
    let path = request.path().to_string();

    let request_id = uuid::Uuid::new_v4().to_string();
    let span = tracing::info_span!(
        "HTTPRequest",
        http.method = %method,
        http.path = %path,
        http.request_id = %request_id
    );

    let result = run_from(stack, 0, request, response.clone())
        .instrument(span.clone())
        .await;

    span.in_scope(|| match result {
        Ok(()) if response.is_finished() => {
            tracing::debug!(status = %response.status_code(), "request handled");
            response.to_http()
        }
        Ok(()) => {
            tracing::debug!("no layer finished the response");
            plain(StatusCode::NOT_FOUND, format!("Cannot {method} {path}"))
        }
        Err(err) => {
            tracing::error!(error = %err, "handler failed");
            if response.is_finished() {
                response.to_http()
            } else {
                plain(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        }
    })
}

/// Run the first layer at or after `index` that matches, handing it a `Next`
/// that resumes right after it.
fn run_from(stack: Stack, index: usize, request: Request, response: Response) -> HandlerFuture {
    Box::pin(async move {
        let Some((position, params)) = stack
            .iter()
            .enumerate()
            .skip(index)
            .find_map(|(position, layer)| layer.matches(&request).map(|params| (position, params)))
        else {
            return HandlerResult::Ok(());
        };

        request.set_params(params);
        let handler = stack[position].handler.clone();
        let next = {
            let stack = stack.clone();
            let request = request.clone();
            let response = response.clone();
            Next::new(move || run_from(stack.clone(), position + 1, request.clone(), response.clone()))
        };

        handler.call(request, response, next).await
    })
}

fn plain(status: StatusCode, body: impl Into<Bytes>) -> http::Response<Full<Bytes>> {
    let mut response = http::Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
