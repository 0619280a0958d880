//! Listening loop.
//!
//! `listen` binds a `TcpListener`, then accepts connections on a background
//! task and serves each one with hyper's HTTP/1 connection driver over the
//! router snapshot taken at listen time.

use crate::error::ServerError;
use crate::router::{Stack, dispatch};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Handle of a running listener.
///
/// Dropping the handle leaves the listener running; call [`Server::close`]
/// to stop accepting connections.
#[derive(Debug)]
pub struct Server {
    local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl Server {
    /// The bound address (resolves port `0` to the assigned port).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and wait for the accept loop to exit.
    /// Connections already accepted run to completion.
    pub async fn close(self) {
        let _ = self.shutdown.send(());
        if let Err(err) = self.task.await {
            tracing::error!(error = %err, "accept loop ended abnormally");
        }
    }
}

pub(crate) async fn bind(addr: SocketAddr, stack: Stack) -> Result<Server, ServerError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let local_addr = listener.local_addr()?;
    tracing::info!("Basics HTTP listening on http://{}", local_addr);

    let (shutdown, shutdown_rx) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        let closed = async move {
            if shutdown_rx.await.is_err() {
                // handle dropped without close
                std::future::pending::<()>().await;
            }
        };
        tokio::pin!(closed);

        loop {
            tokio::select! {
                _ = &mut closed => {
                    tracing::info!(%local_addr, "listener closed");
                    break;
                }
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(connection) => connection,
                        Err(err) => {
                            tracing::error!(error = %err, "failed to accept connection");
                            continue;
                        }
                    };

                    let stack = stack.clone();
                    tokio::spawn(async move {
                        let service = service_fn(move |request: hyper::Request<Incoming>| {
                            let stack = stack.clone();
                            async move { Ok::<_, Infallible>(dispatch(stack, request).await) }
                        });

                        if let Err(err) = http1::Builder::new()
                            .serve_connection(TokioIo::new(stream), service)
                            .await
                        {
                            tracing::error!(%peer, error = ?err, "error serving connection");
                        }
                    });
                }
            }
        }
    });

    Ok(Server {
        local_addr,
        shutdown,
        task,
    })
}
