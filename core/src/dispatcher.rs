//! Dispatcher contract and typed registration arguments.
//!
//! A dispatcher owns the routing table and the listening loop. The adapter
//! only needs two capabilities from it: registering raw handlers under a verb
//! and starting to listen.

use crate::handler::{BoxRawHandler, Handler, RawHandler};
use http::Method;
use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

/// Registration verb: `Use` mounts middleware by prefix, the rest match one
/// method (or any method, for `All`) exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Use,
    All,
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl Verb {
    /// The HTTP method this verb is bound to, if any.
    pub fn method(self) -> Option<Method> {
        match self {
            Verb::Use | Verb::All => None,
            Verb::Get => Some(Method::GET),
            Verb::Post => Some(Method::POST),
            Verb::Put => Some(Method::PUT),
            Verb::Patch => Some(Method::PATCH),
            Verb::Delete => Some(Method::DELETE),
            Verb::Head => Some(Method::HEAD),
            Verb::Options => Some(Method::OPTIONS),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Use => "use",
            Verb::All => "all",
            Verb::Get => "get",
            Verb::Post => "post",
            Verb::Put => "put",
            Verb::Patch => "patch",
            Verb::Delete => "delete",
            Verb::Head => "head",
            Verb::Options => "options",
        }
    }

    /// Whether a request with `method` can reach a layer of this verb.
    /// `Get` layers also answer `HEAD`.
    pub fn accepts(self, method: &Method) -> bool {
        match self {
            Verb::Get => *method == Method::GET || *method == Method::HEAD,
            verb => verb.method().is_none_or(|own| own == *method),
        }
    }

    /// Whether patterns match as a prefix on segment boundaries.
    pub fn is_prefix(self) -> bool {
        matches!(self, Verb::Use)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A route path such as `/users/:id` or `/static/*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathPattern(String);

impl PathPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PathPattern {
    fn from(pattern: &str) -> Self {
        Self::new(pattern)
    }
}

impl From<String> for PathPattern {
    fn from(pattern: String) -> Self {
        Self(pattern)
    }
}

/// Leading path argument(s) of a registration.
///
/// `None` stands for an explicitly absent path and produces no patterns; the
/// dispatcher then applies the layer to every path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathArgs(Vec<PathPattern>);

impl PathArgs {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_patterns(self) -> Vec<PathPattern> {
        self.0
    }
}

impl From<&str> for PathArgs {
    fn from(pattern: &str) -> Self {
        Self(vec![pattern.into()])
    }
}

impl From<String> for PathArgs {
    fn from(pattern: String) -> Self {
        Self(vec![pattern.into()])
    }
}

impl From<PathPattern> for PathArgs {
    fn from(pattern: PathPattern) -> Self {
        Self(vec![pattern])
    }
}

impl<T: Into<PathArgs>> From<Option<T>> for PathArgs {
    fn from(pattern: Option<T>) -> Self {
        pattern.map(Into::into).unwrap_or_default()
    }
}

impl<const N: usize> From<[&str; N]> for PathArgs {
    fn from(patterns: [&str; N]) -> Self {
        Self(patterns.into_iter().map(PathPattern::from).collect())
    }
}

impl From<Vec<&str>> for PathArgs {
    fn from(patterns: Vec<&str>) -> Self {
        Self(patterns.into_iter().map(PathPattern::from).collect())
    }
}

impl From<Vec<String>> for PathArgs {
    fn from(patterns: Vec<String>) -> Self {
        Self(patterns.into_iter().map(PathPattern::from).collect())
    }
}

/// Typed argument list of one registration: path patterns, raw middleware
/// that runs first, and the application handler that always comes last.
pub struct Registration<H> {
    pub paths: Vec<PathPattern>,
    pub middleware: Vec<BoxRawHandler>,
    pub handler: H,
}

impl<H: Handler> Registration<H> {
    /// A registration without a path.
    pub fn new(handler: H) -> Self {
        Self {
            paths: Vec::new(),
            middleware: Vec::new(),
            handler,
        }
    }

    pub fn at(paths: impl Into<PathArgs>, handler: H) -> Self {
        Self {
            paths: paths.into().into_patterns(),
            middleware: Vec::new(),
            handler,
        }
    }

    /// Add raw middleware running before the handler, in call order.
    pub fn with(mut self, middleware: impl RawHandler) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }
}

/// The underlying HTTP dispatcher.
pub trait Dispatcher {
    /// Handle of a running listener.
    type Server;
    /// Error starting to listen.
    type Error;

    /// Register raw handlers under `verb` for `paths` (all paths when empty).
    /// Handlers run in order, each reaching the next through `Next`.
    fn register(
        &mut self,
        verb: Verb,
        paths: Vec<PathPattern>,
        handlers: Vec<BoxRawHandler>,
    ) -> &mut Self;

    /// Start serving the registered handlers on `addr`.
    fn listen(
        &self,
        addr: SocketAddr,
    ) -> impl Future<Output = Result<Self::Server, Self::Error>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_path_yields_no_patterns() {
        assert!(PathArgs::from(None::<&str>).is_empty());
        assert_eq!(
            PathArgs::from(Some("/a")).into_patterns(),
            vec![PathPattern::from("/a")]
        );
    }

    #[test]
    fn test_multiple_patterns() {
        let patterns = PathArgs::from(["/a", "/b"]).into_patterns();
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[1].as_str(), "/b");
    }

    #[test]
    fn test_verb_methods() {
        assert_eq!(Verb::Get.method(), Some(Method::GET));
        assert_eq!(Verb::Use.method(), None);
        assert!(Verb::Use.is_prefix());
        assert!(!Verb::All.is_prefix());
        assert_eq!(Verb::Delete.to_string(), "delete");
    }

    #[test]
    fn test_get_accepts_head() {
        assert!(Verb::Get.accepts(&Method::HEAD));
        assert!(Verb::Get.accepts(&Method::GET));
        assert!(!Verb::Post.accepts(&Method::HEAD));
        assert!(!Verb::Head.accepts(&Method::GET));
        assert!(Verb::All.accepts(&Method::OPTIONS));
    }
}
