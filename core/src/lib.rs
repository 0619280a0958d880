//! # basics-core
//!
//! Turns a dispatcher's `(request, response, next)` handler arguments into
//! one [`HttpBasics`] context with deferred body parsing, translation and
//! inline middleware helpers, and intercepts route registration so
//! application handlers only ever see that context.

pub mod body;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod i18n;
pub mod interceptor;
pub mod request;
pub mod response;
pub mod telemetry;

pub use body::{BodyFuture, BodyParser, JsonBodyParser};
pub use config::BasicsConfig;
pub use context::{ContextBuilder, HttpBasics};
pub use dispatcher::{Dispatcher, PathArgs, PathPattern, Registration, Verb};
pub use error::{BodyError, BoxError, ConfigError, HandlerError, HandlerResult};
pub use handler::{BoxFuture, BoxRawHandler, Handler, HandlerFuture, Next, RawHandler};
pub use i18n::{I18n, Translated, TranslationKey, Translation, Translator};
pub use interceptor::Basics;
pub use request::Request;
pub use response::Response;

pub mod prelude {
    pub use crate::context::HttpBasics;
    pub use crate::dispatcher::{Registration, Verb};
    pub use crate::error::{BodyError, HandlerError, HandlerResult};
    pub use crate::handler::{Next, RawHandler};
    pub use crate::interceptor::Basics;
    pub use crate::request::Request;
    pub use crate::response::Response;
    pub use crate::tr;
}
