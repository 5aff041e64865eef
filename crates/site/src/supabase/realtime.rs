//! Realtime change-event subscription for the `listings` table.
//!
//! Connects to the project's Phoenix-channel WebSocket, joins the listings
//! topic, and triggers a full store refresh on every insert/update/delete
//! event - coarse invalidate-and-refetch rather than incremental patching.
//! The subscription is established once at startup and lives for the process;
//! the connection itself is re-established after a short delay if it drops.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::store::ListingStore;

use super::{SupabaseClient, SupabaseError};

/// Channel topic carrying postgres changes for the listings table.
const LISTINGS_TOPIC: &str = "realtime:public:listings";

/// Phoenix heartbeat cadence.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Delay before re-establishing a dropped connection.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// A change to the listings table observed over the realtime feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingChange {
    Insert,
    Update,
    Delete,
}

impl ListingChange {
    fn from_event(event: &str) -> Option<Self> {
        match event {
            "INSERT" => Some(Self::Insert),
            "UPDATE" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }
}

/// Incoming Phoenix frame.
#[derive(Debug, Deserialize)]
struct Frame {
    #[serde(default)]
    topic: String,
    #[serde(default)]
    event: String,
    #[serde(default)]
    payload: serde_json::Value,
}

/// Run the realtime subscription until the process exits.
///
/// Each connection attempt joins the listings channel and refreshes the
/// store on every change event; on any disconnect or error the connection is
/// retried after [`RECONNECT_DELAY`].
pub async fn realtime_task(client: SupabaseClient, store: ListingStore) {
    loop {
        match subscribe_and_listen(&client, &store).await {
            Ok(()) => info!("realtime connection closed, reconnecting"),
            Err(e) => warn!(error = %e, "realtime connection failed"),
        }
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

async fn subscribe_and_listen(
    client: &SupabaseClient,
    store: &ListingStore,
) -> Result<(), SupabaseError> {
    let url = websocket_url(client.base_url(), client.anon_key())?;

    let (ws, _) = connect_async(url.as_str())
        .await
        .map_err(|e| SupabaseError::WebSocket(e.to_string()))?;
    let (mut sink, mut stream) = ws.split();

    // Join the listings channel, subscribing to all postgres change events.
    let join = serde_json::json!({
        "topic": LISTINGS_TOPIC,
        "event": "phx_join",
        "payload": {
            "config": {
                "postgres_changes": [
                    { "event": "*", "schema": "public", "table": "listings" }
                ]
            }
        },
        "ref": "1",
    });
    sink.send(Message::text(join.to_string()))
        .await
        .map_err(|e| SupabaseError::WebSocket(e.to_string()))?;
    info!("subscribed to listing changes");

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    // The first tick completes immediately; skip it so heartbeats start one
    // interval after the join.
    heartbeat.tick().await;
    let mut heartbeat_ref: u64 = 1;

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                heartbeat_ref += 1;
                let frame = serde_json::json!({
                    "topic": "phoenix",
                    "event": "heartbeat",
                    "payload": {},
                    "ref": heartbeat_ref.to_string(),
                });
                sink.send(Message::text(frame.to_string()))
                    .await
                    .map_err(|e| SupabaseError::WebSocket(e.to_string()))?;
            }
            msg = stream.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    if let Some(change) = parse_change(text.as_str()) {
                        debug!(?change, "listing change event");
                        store.refresh(client).await;
                    }
                }
                Some(Ok(Message::Ping(payload))) => {
                    sink.send(Message::Pong(payload))
                        .await
                        .map_err(|e| SupabaseError::WebSocket(e.to_string()))?;
                }
                Some(Ok(Message::Close(_))) | None => return Ok(()),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(SupabaseError::WebSocket(e.to_string())),
            }
        }
    }
}

/// Build the realtime WebSocket URL from the project base URL.
fn websocket_url(base_url: &str, anon_key: &str) -> Result<url::Url, SupabaseError> {
    let mut url = url::Url::parse(base_url)
        .map_err(|e| SupabaseError::Endpoint(format!("invalid project url: {e}")))?;

    let scheme = match url.scheme() {
        "https" => "wss",
        "http" => "ws",
        other => {
            return Err(SupabaseError::Endpoint(format!(
                "unsupported project url scheme: {other}"
            )));
        }
    };
    url.set_scheme(scheme)
        .map_err(|()| SupabaseError::Endpoint("could not set websocket scheme".to_string()))?;
    url.set_path("/realtime/v1/websocket");
    url.query_pairs_mut()
        .clear()
        .append_pair("apikey", anon_key)
        .append_pair("vsn", "1.0.0");

    Ok(url)
}

/// Extract a listings change from an incoming frame, if it is one.
///
/// Handles both the channel-scoped event names (`INSERT`/`UPDATE`/`DELETE`)
/// and the `postgres_changes` envelope carrying the change type in its
/// payload.
fn parse_change(text: &str) -> Option<ListingChange> {
    let frame: Frame = serde_json::from_str(text).ok()?;
    if frame.topic != LISTINGS_TOPIC {
        return None;
    }

    match frame.event.as_str() {
        "postgres_changes" => frame
            .payload
            .get("data")
            .and_then(|data| data.get("type"))
            .and_then(serde_json::Value::as_str)
            .and_then(ListingChange::from_event),
        other => ListingChange::from_event(other),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_websocket_url() {
        let url = websocket_url("https://test-project.supabase.co", "anon-key").unwrap();
        assert_eq!(
            url.as_str(),
            "wss://test-project.supabase.co/realtime/v1/websocket?apikey=anon-key&vsn=1.0.0"
        );
    }

    #[test]
    fn test_websocket_url_plain_http() {
        let url = websocket_url("http://localhost:54321", "anon-key").unwrap();
        assert!(url.as_str().starts_with("ws://localhost:54321/"));
    }

    #[test]
    fn test_parse_channel_scoped_event() {
        let text = r#"{"topic":"realtime:public:listings","event":"INSERT","payload":{},"ref":null}"#;
        assert_eq!(parse_change(text), Some(ListingChange::Insert));
    }

    #[test]
    fn test_parse_postgres_changes_envelope() {
        let text = r#"{
            "topic": "realtime:public:listings",
            "event": "postgres_changes",
            "payload": { "data": { "type": "DELETE", "table": "listings" } },
            "ref": null
        }"#;
        assert_eq!(parse_change(text), Some(ListingChange::Delete));
    }

    #[test]
    fn test_ignores_other_topics_and_events() {
        let reply = r#"{"topic":"phoenix","event":"phx_reply","payload":{},"ref":"2"}"#;
        assert_eq!(parse_change(reply), None);

        let other_table =
            r#"{"topic":"realtime:public:profiles","event":"UPDATE","payload":{},"ref":null}"#;
        assert_eq!(parse_change(other_table), None);

        let join_ack =
            r#"{"topic":"realtime:public:listings","event":"phx_reply","payload":{},"ref":"1"}"#;
        assert_eq!(parse_change(join_ack), None);
    }
}
