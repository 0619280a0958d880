//! # HttpBasics: the aggregated request context
//!
//! Application handlers receive one [`HttpBasics`] instead of the
//! dispatcher's `(request, response, next)` triple. [`ContextBuilder`] turns
//! an application [`Handler`] into the raw handler the dispatcher expects.

use crate::body::{BodyFuture, BodyParser, BodySource, JsonBodyParser};
use crate::config::BasicsConfig;
use crate::error::BodyError;
use crate::handler::{BoxRawHandler, Handler, HandlerFuture, Next, RawHandler};
use crate::i18n::{I18n, Translation};
use crate::request::Request;
use crate::response::Response;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Per-request context handed to application handlers.
///
/// Built fresh for every invocation and never reused across requests.
pub struct HttpBasics {
    pub request: Request,
    pub response: Response,
    pub next: Next,
    i18n: Option<I18n>,
    body: Arc<BodySource>,
}

impl HttpBasics {
    pub(crate) fn new(
        request: Request,
        response: Response,
        next: Next,
        body: Arc<BodySource>,
    ) -> Self {
        let i18n = request.extension::<Translation>().map(I18n::new);
        Self {
            request,
            response,
            next,
            i18n,
            body,
        }
    }

    /// Run a raw handler inline with this turn's request, response and
    /// continuation, returning its result.
    #[doc(alias = "use")]
    pub fn use_<H: RawHandler>(&self, handler: H) -> HandlerFuture {
        handler.call(
            self.request.clone(),
            self.response.clone(),
            self.next.clone(),
        )
    }

    /// Parsed request body.
    ///
    /// Meant to be awaited once per request: the stream path consumes the
    /// request body, so a second call rejects with [`BodyError::Consumed`].
    pub fn body(&self) -> BodyFuture {
        self.body.resolve(&self.request)
    }

    /// Parsed request body deserialized into `T`.
    pub async fn body_as<T: DeserializeOwned>(&self) -> Result<T, BodyError> {
        let value = self.body().await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Translation helper, present only when translation middleware ran
    /// before this handler.
    pub fn i18n(&self) -> Option<&I18n> {
        self.i18n.as_ref()
    }
}

impl std::fmt::Debug for HttpBasics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBasics")
            .field("request", &self.request)
            .field("response", &self.response)
            .field("i18n", &self.i18n.is_some())
            .finish_non_exhaustive()
    }
}

/// Builds raw handlers that assemble an [`HttpBasics`] per request.
#[derive(Clone, Default)]
pub struct ContextBuilder {
    body: Arc<BodySource>,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &BasicsConfig) -> Self {
        Self {
            body: Arc::new(BodySource::new(
                Arc::new(JsonBodyParser::new(config.body_limit)),
                config.query_body_key.clone(),
            )),
        }
    }

    /// Replace the stream-path collaborator.
    pub fn with_body_parser(mut self, parser: impl BodyParser) -> Self {
        Arc::make_mut(&mut self.body).parser = Arc::new(parser);
        self
    }

    /// Replace the reserved query key of the `GET` fast path.
    pub fn with_query_body_key(mut self, key: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.body).query_key = key.into();
        self
    }

    pub fn query_body_key(&self) -> &str {
        &self.body.query_key
    }

    /// Wrap an application handler into the dispatcher's raw form.
    pub fn build_handler<H: Handler>(&self, handler: H) -> BoxRawHandler {
        Arc::new(ContextHandler {
            handler,
            body: self.body.clone(),
        })
    }
}

struct ContextHandler<H> {
    handler: H,
    body: Arc<BodySource>,
}

impl<H: Handler> RawHandler for ContextHandler<H> {
    fn call(&self, request: Request, response: Response, next: Next) -> HandlerFuture {
        let basics = HttpBasics::new(request, response, next, self.body.clone());
        self.handler.call(basics)
    }
}
