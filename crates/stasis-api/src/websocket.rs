//! ARI event WebSocket.
//!
//! Unlike a broadcast fan-out, ARI delivers one multiplexed stream per
//! connection and the client consumes it from a single loop. This module
//! therefore exposes a pull interface: [`MessageSource::next_message`]
//! yields the next text frame, or `None` once the connection is gone.
//! There is no reconnect here; end-of-stream is terminal.
//!
//! # Example
//!
//! ```rust,ignore
//! use stasis_api::transport::TlsMode;
//! use stasis_api::websocket::{EventStream, MessageSource};
//!
//! let mut stream = EventStream::connect(&ws_url, &TlsMode::System).await?;
//! while let Some(text) = stream.next_message().await {
//!     println!("{text}");
//! }
//! ```

use std::future::Future;

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use url::Url;

use crate::error::Error;
use crate::transport::TlsMode;

// ── MessageSource ────────────────────────────────────────────────────

/// Anything that yields raw event messages in arrival order.
///
/// `None` is the end-of-stream sentinel: once returned, the source is
/// considered closed.
pub trait MessageSource: Send {
    fn next_message(&mut self) -> impl Future<Output = Option<String>> + Send;
}

/// In-process sources: the stream ends when every sender is dropped.
impl MessageSource for mpsc::Receiver<String> {
    async fn next_message(&mut self) -> Option<String> {
        self.recv().await
    }
}

impl MessageSource for mpsc::UnboundedReceiver<String> {
    async fn next_message(&mut self) -> Option<String> {
        self.recv().await
    }
}

// ── EventStream ──────────────────────────────────────────────────────

/// A live connection to `/ari/events`.
pub struct EventStream {
    inner: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl EventStream {
    /// Open the WebSocket. The URL already carries `app` and `api_key`.
    /// `wss://` handshakes verify certificates per `tls`, matching the
    /// HTTP client.
    pub async fn connect(url: &Url, tls: &TlsMode) -> Result<Self, Error> {
        tracing::info!(url = %redacted(url), "Connecting to event WebSocket");

        let uri: tungstenite::http::Uri = url
            .as_str()
            .parse()
            .map_err(|e: tungstenite::http::uri::InvalidUri| Error::WebSocketConnect(e.to_string()))?;

        let connector = tls.websocket_connector()?;
        let request = ClientRequestBuilder::new(uri);
        let (inner, _response) =
            tokio_tungstenite::connect_async_tls_with_config(request, None, false, connector)
                .await
            .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

        tracing::info!("Event WebSocket connected");
        Ok(Self { inner })
    }
}

impl MessageSource for EventStream {
    async fn next_message(&mut self) -> Option<String> {
        loop {
            match self.inner.next().await {
                Some(Ok(tungstenite::Message::Text(text))) => {
                    return Some(text.as_str().to_owned());
                }
                Some(Ok(tungstenite::Message::Ping(_))) => {
                    // tungstenite queues the pong reply itself
                    tracing::trace!("WebSocket ping");
                }
                Some(Ok(tungstenite::Message::Close(frame))) => {
                    if let Some(ref cf) = frame {
                        tracing::info!(
                            code = %cf.code,
                            reason = %cf.reason,
                            "WebSocket close frame received"
                        );
                    } else {
                        tracing::info!("WebSocket close frame received (no payload)");
                    }
                    return None;
                }
                Some(Ok(other)) => {
                    tracing::debug!(kind = frame_kind(&other), "Ignoring non-text frame");
                }
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "WebSocket read failed, closing stream");
                    return None;
                }
                None => {
                    tracing::info!("WebSocket stream ended");
                    return None;
                }
            }
        }
    }
}

fn frame_kind(message: &tungstenite::Message) -> &'static str {
    match message {
        tungstenite::Message::Binary(_) => "binary",
        tungstenite::Message::Pong(_) => "pong",
        tungstenite::Message::Frame(_) => "frame",
        tungstenite::Message::Text(_) => "text",
        tungstenite::Message::Ping(_) => "ping",
        tungstenite::Message::Close(_) => "close",
    }
}

/// The URL with the `api_key` value masked, for logging.
fn redacted(url: &Url) -> Url {
    let mut masked = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let value = if k == "api_key" { "***".to_owned() } else { v.into_owned() };
            (k.into_owned(), value)
        })
        .collect();
    if !pairs.is_empty() {
        masked.query_pairs_mut().clear().extend_pairs(pairs);
    }
    masked
}

// ── Tests ────────────────────────────────────────────────────────────
