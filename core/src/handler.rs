//! Handler shapes.
//!
//! * [`RawHandler`]: the dispatcher's native `(Request, Response, Next)` form.
//! * [`Handler`]: the application form, receiving one [`HttpBasics`].
//!
//! Both are implemented for plain async functions and closures.

use crate::context::HttpBasics;
use crate::error::HandlerResult;
use crate::request::Request;
use crate::response::Response;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Type alias for async boxed futures used by handlers.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Future returned by every handler invocation.
pub type HandlerFuture = BoxFuture<'static, HandlerResult>;

/// Shared raw handler as stored by dispatchers.
pub type BoxRawHandler = Arc<dyn RawHandler>;

/// Dispatcher-native handler.
pub trait RawHandler: Send + Sync + 'static {
    fn call(&self, request: Request, response: Response, next: Next) -> HandlerFuture;
}

impl<F, Fut> RawHandler for F
where
    F: Fn(Request, Response, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, request: Request, response: Response, next: Next) -> HandlerFuture {
        Box::pin(self(request, response, next))
    }
}

/// Application handler receiving the aggregated context.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, basics: HttpBasics) -> HandlerFuture;
}

impl<F, Fut> Handler for F
where
    F: Fn(HttpBasics) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, basics: HttpBasics) -> HandlerFuture {
        Box::pin(self(basics))
    }
}

/// Continuation handing control to the next matching layer.
///
/// Built by the dispatcher for every layer it runs. Holding a `Next` never
/// advances the chain; only [`Next::run`] does.
#[derive(Clone)]
pub struct Next {
    inner: Arc<dyn Fn() -> HandlerFuture + Send + Sync>,
}

impl Next {
    pub fn new<F>(continuation: F) -> Self
    where
        F: Fn() -> HandlerFuture + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(continuation),
        }
    }

    /// A continuation with nothing after it.
    pub fn terminal() -> Self {
        Self::new(|| Box::pin(std::future::ready(Ok(()))))
    }

    /// Run the rest of the chain.
    pub fn run(&self) -> HandlerFuture {
        (self.inner)()
    }
}

impl std::fmt::Debug for Next {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_next_runs_continuation_each_time() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let next = Next::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Ok(()) })
        });

        let cloned = next.clone();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        next.run().await.unwrap();
        cloned.run().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_terminal_next_resolves() {
        assert!(Next::terminal().run().await.is_ok());
    }
}
