//! Live-update socket: chat messages and agent status pushed by the backend.
use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use crate::sink::EventSink;
use crate::wire::decode_frame;
use crate::{EngineEvent, LiveEvent};

#[derive(Debug, Clone)]
pub struct LiveSettings {
    pub url: String,
    /// Fixed pause before reconnecting; `None` stops after the first disconnect.
    pub reconnect_delay: Option<Duration>,
}

impl Default for LiveSettings {
    fn default() -> Self {
        Self {
            url: "ws://localhost:8000/ws".to_string(),
            reconnect_delay: Some(Duration::from_secs(3)),
        }
    }
}

/// Keeps one socket subscription alive until `cancel` fires.
pub async fn run_live(settings: LiveSettings, sink: Arc<dyn EventSink>, cancel: CancellationToken) {
    loop {
        let connected = tokio::select! {
            _ = cancel.cancelled() => break,
            result = connect_async(settings.url.as_str()) => result,
        };

        let reason = match connected {
            Ok((stream, _response)) => {
                engine_info!("Live socket connected to {}", settings.url);
                sink.emit(EngineEvent::Live(LiveEvent::Connected));
                pump(stream, sink.as_ref(), &cancel).await
            }
            Err(err) => {
                engine_warn!("Live socket connect to {} failed: {}", settings.url, err);
                Some(err.to_string())
            }
        };
        sink.emit(EngineEvent::Live(LiveEvent::Disconnected { reason }));

        let Some(delay) = settings.reconnect_delay else {
            break;
        };
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }
    engine_debug!("Live socket task for {} stopped", settings.url);
}

async fn pump(
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    sink: &dyn EventSink,
    cancel: &CancellationToken,
) -> Option<String> {
    let (mut write, mut read) = stream.split();
    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => {
                let _ = write.send(Message::Close(None)).await;
                return Some("cancelled".to_string());
            }
            next = read.next() => next,
        };

        match next {
            Some(Ok(Message::Text(text))) => match decode_frame(text.as_str()) {
                Ok(frame) => sink.emit(EngineEvent::Live(LiveEvent::Frame(frame))),
                Err(err) => engine_warn!("Ignoring undecodable live frame: {}", err),
            },
            Some(Ok(Message::Close(frame))) => {
                engine_info!("Live socket closed by server");
                return frame.map(|frame| frame.reason.as_str().to_string());
            }
            // Pings are answered by tungstenite itself.
            Some(Ok(_)) => {}
            Some(Err(err)) => {
                engine_warn!("Live socket error: {}", err);
                return Some(err.to_string());
            }
            None => return None,
        }
    }
}
