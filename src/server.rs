use std::{net::Ipv4Addr, sync::Arc, time::Duration};

use axum::{Extension, Router, routing::get};
use tokio::{
    net::TcpListener,
    sync::{Mutex, oneshot},
    task::JoinHandle,
};

use crate::{
    api,
    error::{Error, Result},
    types::RedirectParams,
};

/// How long a graceful shutdown may take before the server task is aborted.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// A single-use local HTTP endpoint for the OAuth redirect.
///
/// The socket is bound by [`RedirectListener::bind`], before anything opens
/// the authorization URL, so the provider can never redirect into nothing.
/// [`RedirectListener::wait`] resolves with the query parameters of the first
/// request on the configured path and then closes the socket. Dropping the
/// listener (e.g. when a timeout gives up on it) also closes the socket.
pub struct RedirectListener {
    port: u16,
    path: String,
    result_rx: oneshot::Receiver<RedirectParams>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    server: Option<JoinHandle<()>>,
}

impl RedirectListener {
    /// Binds `127.0.0.1:port` and starts serving `path`.
    ///
    /// There is no fallback port: the redirect URI registered with the
    /// provider is fixed, so a port in use is an error for the caller.
    pub async fn bind(path: &str, port: u16) -> Result<Self> {
        if !path.starts_with('/') {
            return Err(Error::Config(format!(
                "redirect path must start with '/': {path}"
            )));
        }

        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, port))
            .await
            .map_err(|source| Error::ListenerBind { port, source })?;
        let port = listener
            .local_addr()
            .map_err(|source| Error::ListenerBind { port, source })?
            .port();

        let (result_tx, result_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let slot: api::CallbackSlot = Arc::new(Mutex::new(Some(result_tx)));

        let app = Router::new()
            .route(path, get(api::callback))
            .fallback(api::not_found)
            .layer(Extension(slot));

        let server = tokio::spawn(async move {
            let shutdown = async {
                let _ = shutdown_rx.await;
            };
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
            {
                tracing::warn!(error = %e, "redirect listener failed");
            }
        });

        tracing::debug!(port, path, "redirect listener bound");

        Ok(Self {
            port,
            path: path.to_string(),
            result_rx,
            shutdown_tx: Some(shutdown_tx),
            server: Some(server),
        })
    }

    /// The port actually bound (differs from the requested one only for port 0).
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Waits for the redirect, then tears the listener down.
    ///
    /// No timeout is applied here; wrap the future in one.
    pub async fn wait(mut self) -> Result<RedirectParams> {
        let received = (&mut self.result_rx).await;
        self.shutdown().await;
        received.map_err(|_| {
            Error::Listener("the listener stopped before a redirect arrived".to_string())
        })
    }

    async fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(server) = self.server.take() {
            let abort = server.abort_handle();
            if tokio::time::timeout(SHUTDOWN_GRACE, server).await.is_err() {
                abort.abort();
            }
        }
        tracing::debug!(port = self.port, "redirect listener closed");
    }
}

impl Drop for RedirectListener {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(server) = self.server.take() {
            server.abort();
        }
    }
}
