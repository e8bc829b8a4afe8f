//! Server-sent events endpoint.
//!
//! Each subscriber gets an immediate `connection` event, then every event
//! published on the [`EventHub`] after subscription, with a keep-alive
//! ping every 30 seconds so idle proxies do not drop the stream. A
//! subscriber that lags past the channel capacity skips the lost events
//! and keeps reading.

use super::AppState;
use crate::events::{EVENT_CONNECTION, ServerEvent};
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::Stream;
use futures_util::stream::{self, StreamExt};
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::info;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// `GET /api/events`
pub async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("SSE subscriber connected");
    let rx = state.events.subscribe();

    let initial = ServerEvent::new(EVENT_CONNECTION, "Connected to event stream");
    let initial = stream::once(std::future::ready(to_sse_event(&initial)));

    let broadcast = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => return Some((to_sse_event(&event), rx)),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "SSE subscriber lagged, skipping events");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(initial.chain(broadcast)).keep_alive(
        KeepAlive::new()
            .interval(KEEP_ALIVE_INTERVAL)
            .text("ping"),
    )
}

fn to_sse_event(event: &ServerEvent) -> Result<Event, Infallible> {
    let data = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
    Ok(Event::default().data(data))
}
