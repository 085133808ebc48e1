use crate::error::CallError;
use crate::transport::{SignalInbox, SignalingTransport, TransportConnector};
use anyhow::Context;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use std::sync::{Arc, Mutex};
use tandem_core::SignalEvent;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

/// Connects to the relay server over WebSocket.
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl TransportConnector for WsConnector {
    async fn connect(&self, inbox: SignalInbox) -> anyhow::Result<Arc<dyn SignalingTransport>> {
        let (stream, _) = tokio_tungstenite::connect_async(self.url.as_str())
            .await
            .with_context(|| format!("Failed to connect to signaling server {}", self.url))?;
        info!("WS Open: {}", self.url);

        let (mut sink, mut source) = stream.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

        tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                if let Err(e) = sink.send(msg).await {
                    warn!("WS write failed: {}", e);
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let reader = tokio::spawn(async move {
            while let Some(frame) = source.next().await {
                match frame {
                    Ok(Message::Text(text)) => match SignalEvent::from_json(&text) {
                        Ok(event) => {
                            debug!("WS IN: {}", event.name());
                            if !inbox.deliver(event) {
                                return;
                            }
                        }
                        Err(e) => warn!("Invalid signal frame: {}. Text: {}", e, text),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("WS read failed: {}", e);
                        break;
                    }
                }
            }
            inbox.transport_lost();
        });

        Ok(Arc::new(WsTransport {
            tx: Mutex::new(Some(tx)),
            reader: reader.abort_handle(),
        }))
    }
}

struct WsTransport {
    tx: Mutex<Option<mpsc::UnboundedSender<Message>>>,
    reader: AbortHandle,
}

#[async_trait]
impl SignalingTransport for WsTransport {
    async fn send(&self, event: SignalEvent) -> Result<(), CallError> {
        let json = event.to_json().map_err(|e| {
            error!("Failed to serialize {}: {}", event.name(), e);
            CallError::TransportClosed
        })?;

        let guard = self.tx.lock().map_err(|_| CallError::TransportClosed)?;
        let Some(tx) = guard.as_ref() else {
            return Err(CallError::TransportClosed);
        };
        tx.send(Message::Text(json))
            .map_err(|_| CallError::TransportClosed)
    }

    async fn close(&self) {
        // Dropping the sender lets the writer flush and send a close frame.
        if let Ok(mut guard) = self.tx.lock() {
            guard.take();
        }
        self.reader.abort();
    }
}
