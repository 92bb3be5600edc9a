use std::net::SocketAddr;

use anyhow::{Context, Result};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use pokeduel_protocol::{ClientEvent, ServerEvent, parse_client_event};
use tokio::net::TcpStream;
use tokio_tungstenite::{WebSocketStream, accept_async, tungstenite::Message};

type WsStream = WebSocketStream<TcpStream>;

/// One decoded inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Event(ClientEvent),
    /// The frame could not be decoded; the reason is reported back
    Malformed(String),
}

/// Server side of one WebSocket connection
pub struct Connection {
    ws: WsStream,
    peer: SocketAddr,
}

impl Connection {
    /// Complete the WebSocket handshake on an accepted TCP stream
    pub async fn accept(stream: TcpStream) -> Result<Self> {
        let peer = stream.peer_addr().context("Failed to read peer address")?;
        let ws = accept_async(stream)
            .await
            .with_context(|| format!("WebSocket handshake with {} failed", peer))?;

        Ok(Self { ws, peer })
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Split into independently owned write and read halves
    pub fn split(self) -> (EventSink, EventStream) {
        let (sink, stream) = self.ws.split();
        (EventSink { sink }, EventStream { stream })
    }
}

/// Write half: serializes server events onto the socket
pub struct EventSink {
    sink: SplitSink<WsStream, Message>,
}

impl EventSink {
    pub async fn send(&mut self, event: &ServerEvent) -> Result<()> {
        self.sink
            .send(Message::Text(event.to_wire_format()))
            .await
            .context("Failed to send event")
    }

    pub async fn close(&mut self) -> Result<()> {
        self.sink.close().await.context("Failed to close connection")
    }
}

/// Read half: yields decoded client events
pub struct EventStream {
    stream: SplitStream<WsStream>,
}

impl EventStream {
    /// Receive the next client event.
    ///
    /// Returns `Ok(None)` once the peer closed the connection. Pings are
    /// answered by the WebSocket layer itself.
    pub async fn next_event(&mut self) -> Result<Option<Inbound>> {
        while let Some(message) = self.stream.next().await {
            let message = message.context("WebSocket error")?;

            match message {
                Message::Text(text) => {
                    let inbound = match parse_client_event(&text) {
                        Ok(event) => Inbound::Event(event),
                        Err(e) => Inbound::Malformed(e.to_string()),
                    };
                    return Ok(Some(inbound));
                }
                Message::Binary(_) => {
                    return Ok(Some(Inbound::Malformed(
                        "binary frames are not supported".to_string(),
                    )));
                }
                Message::Close(_) => return Ok(None),
                _ => {}
            }
        }

        Ok(None)
    }
}
