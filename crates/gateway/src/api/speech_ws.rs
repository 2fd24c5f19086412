//! WebSocket channel for realtime speech.
//!
//! Flow:
//! 1. Client connects to `/ws`; the server answers with `status`.
//! 2. Client sends `{"event": "start_listening"}` or
//!    `{"event": "speak_text", "data": {"text": ...}}`.
//! 3. Progress comes back as `listening_status`, `speech_recognized` and
//!    `speech_status` frames from the connection's speech worker.
//!
//! Recognized text is only reported; the client posts it to `/api/chat`
//! itself if it wants a reply.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use vc_speech::{ClientEvent, ServerEvent, SpeechSession};

use crate::state::AppState;

/// Outbound frames buffered per connection before the worker waits.
const OUTBOUND_BUFFER: usize = 64;

/// GET /ws: upgrade to WebSocket.
pub async fn speech_ws(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Socket handler
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut ws_sink, mut ws_stream) = socket.split();
    let connection_id = uuid::Uuid::new_v4().to_string();

    let (events_tx, mut events_rx) = mpsc::channel::<ServerEvent>(OUTBOUND_BUFFER);
    let session = SpeechSession::new(connection_id.clone(), state.speech.clone(), events_tx);

    // Writer task: forwards speech events to the WS sink.
    let writer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            if send_event(&mut ws_sink, &event).await.is_err() {
                break;
            }
        }
    });

    tracing::info!(connection_id = %connection_id, "speech client connected");
    session.announce().await;

    // Reader loop: dispatch client events without waiting on the work.
    while let Some(Ok(msg)) = ws_stream.next().await {
        match msg {
            Message::Text(text) => match ClientEvent::parse(&text) {
                Ok(event) => session.handle(event).await,
                Err(e) => {
                    tracing::debug!(connection_id = %connection_id, error = %e, "ignoring client frame");
                }
            },
            Message::Close(_) => break,
            // axum answers pings itself.
            _ => {}
        }
    }

    // Cleanup: in-flight work finishes silently, queued work is dropped.
    session.close();
    drop(session);
    writer.abort();
    tracing::info!(connection_id = %connection_id, "speech client disconnected");
}

async fn send_event(
    sink: &mut (impl SinkExt<Message> + Unpin),
    event: &ServerEvent,
) -> Result<(), ()> {
    let json = serde_json::to_string(event).map_err(|_| ())?;
    sink.send(Message::Text(json)).await.map_err(|_| ())
}
