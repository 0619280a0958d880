//! Deferred body parsing.
//!
//! `HttpBasics::body()` resolves through one of two paths:
//!
//! * **query fast path**: a `GET` request carrying a non-empty value under the
//!   reserved query key is parsed as JSON on the spot. The body stream is left
//!   untouched.
//! * **stream path**: everything else is handed to the [`BodyParser`], which
//!   consumes the request stream.
//!
//! The stream can be consumed once per request; a second stream-path call
//! rejects with [`BodyError::Consumed`].

use crate::error::{BodyError, BoxError};
use crate::handler::BoxFuture;
use crate::request::Request;
use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use http_body_util::{BodyExt, Collected, LengthLimitError, Limited};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// Default size limit of the stream path (1 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Default reserved query key of the fast path.
pub const DEFAULT_QUERY_BODY_KEY: &str = "body";

/// Collaborator turning a request stream into structured data.
#[async_trait]
pub trait BodyParser: Send + Sync + 'static {
    async fn parse(&self, request: &Request) -> Result<Value, BodyError>;
}

/// Reads the whole stream up to `limit` bytes and parses it as JSON.
///
/// The `Content-Type` header is not inspected.
#[derive(Debug, Clone)]
pub struct JsonBodyParser {
    limit: usize,
}

impl JsonBodyParser {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for JsonBodyParser {
    fn default() -> Self {
        Self::new(DEFAULT_BODY_LIMIT)
    }
}

#[async_trait]
impl BodyParser for JsonBodyParser {
    async fn parse(&self, request: &Request) -> Result<Value, BodyError> {
        let limit = self.limit;
        if request.content_length().is_some_and(|len| len > limit as u64) {
            return Err(BodyError::TooLarge { limit });
        }

        let body = request.take_body().ok_or(BodyError::Consumed)?;
        let collecting: BoxFuture<'static, Result<Collected<Bytes>, BoxError>> =
            Box::pin(Limited::new(body, limit).collect());
        let collected = collecting.await.map_err(|err| {
            if err.is::<LengthLimitError>() {
                BodyError::TooLarge { limit }
            } else {
                BodyError::Stream(err)
            }
        })?;

        Ok(serde_json::from_slice(&collected.to_bytes())?)
    }
}

/// Body resolution policy shared by every context built from one
/// `ContextBuilder`.
#[derive(Clone)]
pub(crate) struct BodySource {
    pub(crate) parser: Arc<dyn BodyParser>,
    pub(crate) query_key: String,
}

impl BodySource {
    pub(crate) fn new(parser: Arc<dyn BodyParser>, query_key: impl Into<String>) -> Self {
        Self {
            parser,
            query_key: query_key.into(),
        }
    }

    pub(crate) fn resolve(&self, request: &Request) -> BodyFuture {
        if request.method() == Method::GET {
            if let Some(raw) = request
                .query_param(&self.query_key)
                .filter(|raw| !raw.is_empty())
            {
                tracing::trace!(key = %self.query_key, "parsing body from query string");
                return BodyFuture::ready(serde_json::from_str(raw).map_err(BodyError::from));
            }
        }

        tracing::trace!("parsing body from request stream");
        let parser = self.parser.clone();
        let request = request.clone();
        BodyFuture::pending(async move { parser.parse(&request).await })
    }
}

impl Default for BodySource {
    fn default() -> Self {
        Self::new(Arc::new(JsonBodyParser::default()), DEFAULT_QUERY_BODY_KEY)
    }
}

/// Deferred parsed body.
///
/// Moves from `Ready` or `Pending` to `Done` exactly once; polling after
/// completion panics, as with any completed future.
#[must_use = "futures do nothing unless polled"]
pub struct BodyFuture {
    state: State,
}

enum State {
    Ready(Result<Value, BodyError>),
    Pending(BoxFuture<'static, Result<Value, BodyError>>),
    Done,
}

impl BodyFuture {
    pub fn ready(result: Result<Value, BodyError>) -> Self {
        Self {
            state: State::Ready(result),
        }
    }

    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = Result<Value, BodyError>> + Send + 'static,
    {
        Self {
            state: State::Pending(Box::pin(future)),
        }
    }

    /// Whether the value is available without touching the stream.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }
}

impl Future for BodyFuture {
    type Output = Result<Value, BodyError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match std::mem::replace(&mut this.state, State::Done) {
            State::Ready(result) => Poll::Ready(result),
            State::Pending(mut future) => match future.as_mut().poll(cx) {
                Poll::Ready(result) => Poll::Ready(result),
                Poll::Pending => {
                    this.state = State::Pending(future);
                    Poll::Pending
                }
            },
            State::Done => panic!("BodyFuture polled after completion"),
        }
    }
}

impl std::fmt::Debug for BodyFuture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.state {
            State::Ready(_) => "ready",
            State::Pending(_) => "pending",
            State::Done => "done",
        };
        f.debug_struct("BodyFuture").field("state", &state).finish()
    }
}
