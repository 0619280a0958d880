//! # RouterService - Tower Service Adapter
//!
//! Exposes a layer snapshot as a `tower::Service`, so a router can be driven
//! in-process (`ServiceExt::oneshot`) or mounted in any Tower-compatible stack.

use crate::router::{Stack, dispatch};
use basics_core::BoxError;
use bytes::Bytes;
use http::{Request, Response};
use http_body_util::Full;
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::Service;

#[derive(Clone)]
pub struct RouterService {
    stack: Stack,
}

impl RouterService {
    pub(crate) fn new(stack: Stack) -> Self {
        Self { stack }
    }
}

impl<B> Service<Request<B>> for RouterService
where
    B: http_body::Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    type Response = Response<Full<Bytes>>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let stack = self.stack.clone();
        Box::pin(async move { Ok(dispatch(stack, req).await) })
    }
}
