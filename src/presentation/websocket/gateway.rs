//! WebSocket Gateway
//!
//! Tracks connected sessions and fans published notifications out to them.
//! Every connection task subscribes to one broadcast channel and forwards the
//! events whose audience includes its user; a user's sessions form that
//! user's private room.

use std::sync::atomic::{AtomicI64, Ordering};

use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::domain::{Audience, ChatEvent, Notification, NotificationSink};
use crate::infrastructure::metrics;

/// Internal event wrapper with routing information
#[derive(Debug, Clone)]
pub struct RoutedEvent {
    pub event: ChatEvent,
    pub audience: Audience,
}

impl RoutedEvent {
    pub fn is_for(&self, user_id: i64) -> bool {
        self.audience.includes(user_id)
    }
}

/// WebSocket gateway managing all connections
pub struct Gateway {
    /// Identified sessions: session_id -> user_id
    sessions: DashMap<String, i64>,
    /// Open sockets, identified or not
    connections: AtomicI64,
    /// Broadcast channel for events
    event_tx: broadcast::Sender<RoutedEvent>,
    /// Heartbeat interval in milliseconds
    heartbeat_interval_ms: u64,
}

impl Gateway {
    pub fn new(heartbeat_interval_ms: u64, event_buffer: usize) -> Self {
        let (event_tx, _) = broadcast::channel(event_buffer.max(1));
        Self {
            sessions: DashMap::new(),
            connections: AtomicI64::new(0),
            event_tx,
            heartbeat_interval_ms,
        }
    }

    /// Get the heartbeat interval
    pub fn heartbeat_interval(&self) -> u64 {
        self.heartbeat_interval_ms
    }

    /// Subscribe to gateway events
    pub fn subscribe(&self) -> broadcast::Receiver<RoutedEvent> {
        self.event_tx.subscribe()
    }

    pub fn connection_opened(&self) {
        self.connections.fetch_add(1, Ordering::Relaxed);
        self.update_metrics();
    }

    pub fn connection_closed(&self) {
        self.connections.fetch_sub(1, Ordering::Relaxed);
        self.update_metrics();
    }

    /// Register an identified session
    pub fn register_session(&self, session_id: String, user_id: i64) {
        self.sessions.insert(session_id.clone(), user_id);
        self.update_metrics();

        tracing::info!(user_id = user_id, session_id = %session_id, "Session registered");
    }

    /// Unregister a session
    pub fn unregister_session(&self, session_id: &str) {
        if let Some((_, user_id)) = self.sessions.remove(session_id) {
            self.update_metrics();

            tracing::info!(user_id = user_id, session_id = %session_id, "Session unregistered");
        }
    }

    /// Get session count
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn update_metrics(&self) {
        metrics::set_websocket_connections(
            self.connections.load(Ordering::Relaxed),
            self.sessions.len() as i64,
        );
    }
}

impl NotificationSink for Gateway {
    fn publish(&self, notification: Notification) {
        let audience = match notification.audience {
            Audience::Everyone => "everyone",
            Audience::User(_) => "user",
        };
        metrics::record_notification_published(notification.event.event_name(), audience);

        let routed = RoutedEvent {
            event: notification.event,
            audience: notification.audience,
        };
        // No subscribers means nobody is connected; the event is simply dropped
        if self.event_tx.send(routed).is_err() {
            tracing::trace!("Notification published with no connected sessions");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserJoinedEvent;

    fn joined() -> ChatEvent {
        ChatEvent::UserJoined(UserJoinedEvent { channel_id: 7 })
    }

    #[test]
    fn test_publish_without_subscribers_is_dropped() {
        let gateway = Gateway::new(1000, 16);
        gateway.publish(Notification::everyone(joined()));
    }

    #[tokio::test]
    async fn test_subscriber_receives_routed_event() {
        let gateway = Gateway::new(1000, 16);
        let mut rx = gateway.subscribe();

        gateway.publish(Notification::to_user(joined(), 5));

        let routed = rx.recv().await.unwrap();
        assert_eq!(routed.event, joined());
        assert!(routed.is_for(5));
        assert!(!routed.is_for(6));
    }

    #[test]
    fn test_register_and_unregister_sessions() {
        let gateway = Gateway::new(1000, 16);

        gateway.register_session("a".into(), 1);
        gateway.register_session("b".into(), 1);
        assert_eq!(gateway.session_count(), 2);

        gateway.unregister_session("a");
        gateway.unregister_session("a");
        assert_eq!(gateway.session_count(), 1);
        gateway.unregister_session("b");
        assert_eq!(gateway.session_count(), 0);
    }
}
