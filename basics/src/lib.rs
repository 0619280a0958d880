//! # basics
//!
//! Application-facing entry point: an Express-style [`Router`] wrapped in the
//! [`Basics`] interceptor, so every registered handler receives one
//! [`HttpBasics`] context.
//!
//! ```rust,no_run
//! use basics::prelude::*;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut app = basics::app();
//! app.get("/hello", |basics: HttpBasics| async move {
//!     basics.response.send("hello");
//!     Ok::<(), HandlerError>(())
//! });
//! let server = app.listen(([127, 0, 0, 1], 3000)).await?;
//! server.close().await;
//! # Ok(())
//! # }
//! ```

pub use basics_core as core;
pub use basics_http as http_adapter;

pub use basics_core::{
    BasicsConfig, BodyError, ConfigError, ContextBuilder, HandlerError, HandlerResult, HttpBasics,
    Next, Request, Response, Translated, tr,
};
pub use basics_core::telemetry::init_tracing;
pub use basics_http::{Catalog, I18nMiddleware, Router, RouterService, Server, ServerError};

/// The interceptor over the default router.
pub type App = basics_core::Basics<Router>;

/// A new application with default body parsing.
pub fn app() -> App {
    App::new(Router::new())
}

/// A new application whose body limit and query body key come from `config`.
pub fn app_with_config(config: &BasicsConfig) -> App {
    App::with_config(Router::new(), config)
}

pub mod prelude {
    pub use crate::{App, app, app_with_config};
    pub use basics_core::BasicsConfig;
    pub use basics_core::prelude::*;
    pub use basics_http::{Catalog, I18nMiddleware, Router};

    pub use bytes::Bytes;
    pub use http::{Method, StatusCode};
    pub use serde_json::{Value, json};
}
