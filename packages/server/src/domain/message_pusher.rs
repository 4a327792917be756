//! Outbound delivery interface.
//!
//! Use cases decide who receives what; the pusher only knows how to reach a
//! connection. Per-connection delivery order is the order of calls.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{error::MessagePushError, notification::Notification, value_object::ConnectionId};

/// Channel feeding a single connection's writer task.
pub type PusherChannel = mpsc::UnboundedSender<Notification>;

#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Make a connection reachable.
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// Forget a connection. Unknown ids are ignored.
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// Deliver to exactly one connection.
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        notification: Notification,
    ) -> Result<(), MessagePushError>;

    /// Deliver to every target. A target that cannot be reached is skipped.
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        notification: Notification,
    ) -> Result<(), MessagePushError>;
}
