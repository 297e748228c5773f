//! A one-shot HTTP listener on localhost that receives the OAuth redirect from the browser.

use crate::error::Res;
use anyhow::Context;
use hyper::body::Incoming;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const DONE_PAGE: &str =
    "<html><body><p>Sign-in complete. You can close this window.</p></body></html>";
const CANCELLED_PAGE: &str = "<html><body><p>Sign-in was cancelled.</p></body></html>";

/// What the provider sent back through the browser.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(super) enum Redirect {
    /// The user consented. `state` must match the CSRF token sent with the request.
    Code { code: String, state: String },
    /// The user declined, or the provider refused the request.
    Denied { error: String },
}

impl Redirect {
    /// Extracts the redirect parameters from a request query string. Requests without `code` or
    /// `error` (a browser asking for `/favicon.ico`, say) yield `None`.
    fn from_query(query: &str) -> Option<Self> {
        let params: HashMap<String, String> = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        if let Some(code) = params.get("code") {
            Some(Redirect::Code {
                code: code.clone(),
                state: params.get("state").cloned().unwrap_or_default(),
            })
        } else {
            params.get("error").map(|error| Redirect::Denied {
                error: error.clone(),
            })
        }
    }
}

/// Listens on `localhost` for the provider's redirect.
pub(super) struct RedirectListener {
    listener: TcpListener,
    port: u16,
}

impl RedirectListener {
    /// Binds the listener. A `port` of `0` picks any free port.
    pub(super) async fn bind(port: u16) -> Res<Self> {
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Unable to listen for the OAuth redirect on {addr}"))?;
        let port = listener
            .local_addr()
            .context("Unable to read the redirect listener address")?
            .port();
        Ok(Self { listener, port })
    }

    pub(super) fn redirect_uri(&self) -> String {
        format!("http://localhost:{}", self.port)
    }

    /// Waits for the first request that carries a redirect. Gives up with `None` after `timeout`.
    pub(super) async fn wait(self, timeout: Duration) -> Res<Option<Redirect>> {
        let (tx, mut rx) = mpsc::channel(1);
        tokio::select! {
            result = accept_loop(self.listener, tx) => {
                result?;
                Ok(None)
            }
            received = tokio::time::timeout(timeout, rx.recv()) => match received {
                Ok(redirect) => Ok(redirect),
                Err(_) => {
                    warn!("No OAuth redirect arrived within {} seconds", timeout.as_secs());
                    Ok(None)
                }
            }
        }
    }
}

async fn accept_loop(listener: TcpListener, tx: mpsc::Sender<Redirect>) -> Res<()> {
    loop {
        let (stream, peer) = listener
            .accept()
            .await
            .context("Failed to accept a connection on the redirect listener")?;
        debug!("Redirect listener connection from {peer}");
        let tx = tx.clone();
        tokio::spawn(async move {
            let service = service_fn(move |req: Request<Incoming>| {
                let tx = tx.clone();
                async move { Ok::<_, Infallible>(handle(req, tx).await) }
            });
            if let Err(e) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                debug!("Redirect listener connection error: {e}");
            }
        });
    }
}

async fn handle(req: Request<Incoming>, tx: mpsc::Sender<Redirect>) -> Response<String> {
    let query = req.uri().query().unwrap_or_default();
    match Redirect::from_query(query) {
        Some(redirect) => {
            let page = match redirect {
                Redirect::Code { .. } => DONE_PAGE,
                Redirect::Denied { .. } => CANCELLED_PAGE,
            };
            let _ = tx.send(redirect).await;
            html(StatusCode::OK, page)
        }
        None => html(StatusCode::NOT_FOUND, "Not found"),
    }
}

fn html(status: StatusCode, body: &str) -> Response<String> {
    let mut response = Response::new(body.to_string());
    *response.status_mut() = status;
    let _ = response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    response
}
