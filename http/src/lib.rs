//! # basics-http
//!
//! Express-style dispatcher for Basics on Hyper 1.0: an ordered layer stack
//! with `use` prefix mounting and verb routes, `listen`/`close` on a Tokio
//! listener, an in-process `tower::Service`, and locale-negotiating i18n
//! middleware.

pub mod error;
pub mod i18n;
pub mod router;
pub mod routing;
pub mod server;
pub mod service;

pub use error::{CatalogError, ServerError};
pub use i18n::{Catalog, I18nMiddleware, LocaleTranslator};
pub use router::Router;
pub use routing::{match_path, next_segment};
pub use server::Server;
pub use service::RouterService;
