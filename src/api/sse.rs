//! Server-Sent Events support
//!
//! The stream opens with an `init` event carrying the current snapshot and
//! then pushes a `state` event with the full snapshot after every change.

use crate::controller::ChatSnapshot;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Convert broadcast stream to SSE stream
pub fn sse_stream(
    init: ChatSnapshot,
    broadcast_rx: tokio::sync::broadcast::Receiver<ChatSnapshot>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let init = futures::stream::once(async move { Ok(snapshot_event("init", &init)) });

    // Every event carries the full state, so a lagged receiver loses nothing
    let updates = BroadcastStream::new(broadcast_rx).filter_map(|result| match result {
        Ok(snapshot) => Some(Ok(snapshot_event("state", &snapshot))),
        Err(_) => None,
    });

    Sse::new(init.chain(updates)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn snapshot_event(event_type: &str, snapshot: &ChatSnapshot) -> Event {
    let data = serde_json::to_string(snapshot).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to serialize snapshot");
        "null".to_string()
    });
    Event::default().event(event_type).data(data)
}
