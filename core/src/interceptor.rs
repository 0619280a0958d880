//! # Basics: the registration interceptor
//!
//! `Basics<D>` owns a dispatcher and overrides its registration methods: the
//! trailing application handler of each call is wrapped by the
//! [`ContextBuilder`] before being handed to the dispatcher. Everything the
//! adapter does not define itself is reached on the dispatcher through
//! `Deref`, with the dispatcher as receiver.
//!
//! ```rust,ignore
//! let mut app = Basics::new(Router::new());
//! app.get("/users/:id", show_user)
//!     .post("/users", create_user)
//!     .use_(None::<&str>, not_found);
//! app.set("title", "users");          // forwarded to the router
//! let server = app.listen(addr).await?;
//! ```

use crate::config::BasicsConfig;
use crate::context::ContextBuilder;
use crate::dispatcher::{Dispatcher, PathArgs, Registration, Verb};
use crate::handler::Handler;
use std::net::SocketAddr;
use std::ops::{Deref, DerefMut};

pub struct Basics<D> {
    dispatcher: D,
    context: ContextBuilder,
}

impl<D: Dispatcher> Basics<D> {
    pub fn new(dispatcher: D) -> Self {
        Self::with_context(dispatcher, ContextBuilder::new())
    }

    pub fn with_config(dispatcher: D, config: &BasicsConfig) -> Self {
        Self::with_context(dispatcher, ContextBuilder::from_config(config))
    }

    pub fn with_context(dispatcher: D, context: ContextBuilder) -> Self {
        Self {
            dispatcher,
            context,
        }
    }

    pub fn context(&self) -> &ContextBuilder {
        &self.context
    }

    pub fn into_inner(self) -> D {
        self.dispatcher
    }

    /// Register under any verb. The handler is wrapped and appended after
    /// the registration's raw middleware; paths pass through untouched.
    pub fn register<H: Handler>(&mut self, verb: Verb, registration: Registration<H>) -> &mut Self {
        let Registration {
            paths,
            mut middleware,
            handler,
        } = registration;

        tracing::debug!(
            %verb,
            paths = ?paths.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
            middleware = middleware.len(),
            "registering context handler"
        );

        middleware.push(self.context.build_handler(handler));
        self.dispatcher.register(verb, paths, middleware);
        self
    }

    #[doc(alias = "use")]
    pub fn use_<H: Handler>(&mut self, path: impl Into<PathArgs>, handler: H) -> &mut Self {
        self.register(Verb::Use, Registration::at(path, handler))
    }

    pub fn all<H: Handler>(&mut self, path: impl Into<PathArgs>, handler: H) -> &mut Self {
        self.register(Verb::All, Registration::at(path, handler))
    }

    pub fn get<H: Handler>(&mut self, path: impl Into<PathArgs>, handler: H) -> &mut Self {
        self.register(Verb::Get, Registration::at(path, handler))
    }

    pub fn post<H: Handler>(&mut self, path: impl Into<PathArgs>, handler: H) -> &mut Self {
        self.register(Verb::Post, Registration::at(path, handler))
    }

    pub fn put<H: Handler>(&mut self, path: impl Into<PathArgs>, handler: H) -> &mut Self {
        self.register(Verb::Put, Registration::at(path, handler))
    }

    pub fn patch<H: Handler>(&mut self, path: impl Into<PathArgs>, handler: H) -> &mut Self {
        self.register(Verb::Patch, Registration::at(path, handler))
    }

    pub fn delete<H: Handler>(&mut self, path: impl Into<PathArgs>, handler: H) -> &mut Self {
        self.register(Verb::Delete, Registration::at(path, handler))
    }

    /// Forwarded verbatim to the dispatcher.
    pub async fn listen(&self, addr: impl Into<SocketAddr>) -> Result<D::Server, D::Error> {
        self.dispatcher.listen(addr.into()).await
    }
}

impl<D> Deref for Basics<D> {
    type Target = D;

    fn deref(&self) -> &D {
        &self.dispatcher
    }
}

impl<D> DerefMut for Basics<D> {
    fn deref_mut(&mut self) -> &mut D {
        &mut self.dispatcher
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::HttpBasics;
    use crate::dispatcher::PathPattern;
    use crate::error::{HandlerError, HandlerResult};
    use crate::handler::{BoxRawHandler, Next, RawHandler};
    use crate::request::Request;
    use crate::response::Response;
    use bytes::Bytes;
    use http_body_util::Full;
    use std::sync::Arc;

    /// Records registrations instead of routing.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<(Verb, Vec<PathPattern>, Vec<BoxRawHandler>)>,
        title: Option<String>,
    }

    impl Recorder {
        fn set_title(&mut self, title: &str) -> &mut Self {
            self.title = Some(title.to_string());
            self
        }
    }

    impl Dispatcher for Recorder {
        type Server = SocketAddr;
        type Error = std::convert::Infallible;

        fn register(
            &mut self,
            verb: Verb,
            paths: Vec<PathPattern>,
            handlers: Vec<BoxRawHandler>,
        ) -> &mut Self {
            self.calls.push((verb, paths, handlers));
            self
        }

        async fn listen(&self, addr: SocketAddr) -> Result<SocketAddr, Self::Error> {
            Ok(addr)
        }
    }

    async fn hello(basics: HttpBasics) -> HandlerResult {
        basics.response.send("hello");
        Ok(())
    }

    fn request() -> Request {
        Request::from_http(http::Request::new(Full::new(Bytes::new())))
    }

    #[tokio::test]
    async fn test_every_verb_wraps_the_trailing_handler() {
        let mut app = Basics::new(Recorder::default());
        app.use_("/", hello)
            .get("/g", hello)
            .post("/p", hello)
            .delete("/d", hello);

        let verbs: Vec<Verb> = app.calls.iter().map(|(verb, _, _)| *verb).collect();
        assert_eq!(verbs, vec![Verb::Use, Verb::Get, Verb::Post, Verb::Delete]);

        for (_, paths, handlers) in &app.calls {
            assert_eq!(paths.len(), 1);
            assert_eq!(handlers.len(), 1);

            let res = Response::new();
            handlers[0]
                .call(request(), res.clone(), Next::terminal())
                .await
                .unwrap();
            assert_eq!(res.body(), Bytes::from("hello"));
        }
    }

    #[test]
    fn test_absent_leading_path_is_dropped() {
        let mut app = Basics::new(Recorder::default());
        app.use_(None::<&str>, hello);

        let (verb, paths, handlers) = &app.calls[0];
        assert_eq!(*verb, Verb::Use);
        assert!(paths.is_empty());
        assert_eq!(handlers.len(), 1);
    }

    #[tokio::test]
    async fn test_middleware_passes_through_before_handler() {
        let mut app = Basics::new(Recorder::default());
        app.register(
            Verb::Get,
            Registration::at(["/a", "/b"], hello).with(
                |_req: Request, res: Response, next: Next| async move {
                    res.status(http::StatusCode::ACCEPTED);
                    next.run().await
                },
            ),
        );

        let (_, paths, handlers) = &app.calls[0];
        assert_eq!(paths, &vec![PathPattern::from("/a"), PathPattern::from("/b")]);
        assert_eq!(handlers.len(), 2);

        // First handler is the raw middleware untouched: it only sets the status.
        let res = Response::new();
        handlers[0]
            .call(request(), res.clone(), Next::terminal())
            .await
            .unwrap();
        assert_eq!(res.status_code(), http::StatusCode::ACCEPTED);
        assert!(!res.is_finished());
    }

    #[test]
    fn test_unknown_members_are_forwarded() {
        let mut app = Basics::new(Recorder::default());
        app.set_title("shop").set_title("store");

        assert_eq!(app.title.as_deref(), Some("store"));
        assert!(app.calls.is_empty());
    }

    #[tokio::test]
    async fn test_listen_is_forwarded_verbatim() {
        let app = Basics::new(Recorder::default());
        let addr = app.listen(([127, 0, 0, 1], 4000)).await.unwrap();

        assert_eq!(addr, "127.0.0.1:4000".parse::<SocketAddr>().unwrap());
    }

    #[tokio::test]
    async fn test_handler_errors_propagate() {
        let mut app = Basics::new(Recorder::default());
        app.get("/", |_basics: HttpBasics| async move {
            Err::<(), _>(HandlerError::internal("nope"))
        });

        let handler: Arc<dyn RawHandler> = app.calls[0].2[0].clone();
        let result = handler
            .call(request(), Response::new(), Next::terminal())
            .await;
        assert!(result.is_err());
    }
}
