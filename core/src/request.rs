//! Incoming request handle.
//!
//! A [`Request`] is a cheap clonable handle: every clone refers to the same
//! request of the current turn, so the dispatcher, the context helpers and
//! inline middleware all observe the same state.

use crate::error::BoxError;
use bytes::Bytes;
use http::header::CONTENT_LENGTH;
use http::{Extensions, HeaderMap, HeaderValue, Method, Uri, Version};
use http_body_util::BodyExt;
use http_body_util::combinators::UnsyncBoxBody;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

/// Type-erased request body stream.
pub type RequestBody = UnsyncBoxBody<Bytes, BoxError>;

#[derive(Clone)]
pub struct Request {
    inner: Arc<Inner>,
}

struct Inner {
    head: http::request::Parts,
    query: HashMap<String, String>,
    params: RwLock<HashMap<String, String>>,
    extensions: RwLock<Extensions>,
    body: Mutex<Option<RequestBody>>,
}

impl Request {
    /// Wrap an `http::Request`, taking ownership of its body stream.
    pub fn from_http<B>(request: http::Request<B>) -> Self
    where
        B: http_body::Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let (mut head, body) = request.into_parts();
        let extensions = std::mem::take(&mut head.extensions);
        let query = parse_query(head.uri.query());
        let body: RequestBody = body.map_err(Into::into).boxed_unsync();

        Self {
            inner: Arc::new(Inner {
                head,
                query,
                params: RwLock::new(HashMap::new()),
                extensions: RwLock::new(extensions),
                body: Mutex::new(Some(body)),
            }),
        }
    }

    pub fn method(&self) -> &Method {
        &self.inner.head.method
    }

    pub fn uri(&self) -> &Uri {
        &self.inner.head.uri
    }

    pub fn path(&self) -> &str {
        self.inner.head.uri.path()
    }

    pub fn version(&self) -> Version {
        self.inner.head.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.inner.head.headers
    }

    pub fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.inner.head.headers.get(name)
    }

    /// Declared `Content-Length`, if present and well formed.
    pub fn content_length(&self) -> Option<u64> {
        self.header(CONTENT_LENGTH.as_str())?
            .to_str()
            .ok()?
            .parse()
            .ok()
    }

    /// Decoded query string pairs. Repeated keys keep the last value.
    pub fn query(&self) -> &HashMap<String, String> {
        &self.inner.query
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.inner.query.get(name).map(String::as_str)
    }

    /// Route parameter captured by the layer currently handling the request.
    pub fn param(&self, name: &str) -> Option<String> {
        self.inner.params.read().get(name).cloned()
    }

    pub fn params(&self) -> HashMap<String, String> {
        self.inner.params.read().clone()
    }

    /// Replace the route parameters. Called by the dispatcher before each
    /// matched layer runs.
    pub fn set_params(&self, params: HashMap<String, String>) {
        *self.inner.params.write() = params;
    }

    pub fn extension<T>(&self) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.inner.extensions.read().get::<T>().cloned()
    }

    pub fn has_extension<T>(&self) -> bool
    where
        T: Send + Sync + 'static,
    {
        self.inner.extensions.read().get::<T>().is_some()
    }

    pub fn insert_extension<T>(&self, value: T) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.inner.extensions.write().insert(value)
    }

    /// Take the body stream. Returns `None` once it has been taken.
    pub fn take_body(&self) -> Option<RequestBody> {
        self.inner.body.lock().take()
    }

    pub fn body_consumed(&self) -> bool {
        self.inner.body.lock().is_none()
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("method", self.method())
            .field("uri", self.uri())
            .field("body_consumed", &self.body_consumed())
            .finish()
    }
}

fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    let Some(query) = query.filter(|q| !q.is_empty()) else {
        return HashMap::new();
    };

    match serde_urlencoded::from_str::<Vec<(String, String)>>(query) {
        Ok(pairs) => pairs.into_iter().collect(),
        Err(err) => {
            tracing::debug!(error = %err, "ignoring malformed query string");
            HashMap::new()
        }
    }
}
