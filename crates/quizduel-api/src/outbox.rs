//! In-process `Messenger`: notices wait in a per-address inbox until a
//! client drains them over HTTP.
//!
//! Inboxes are bounded. When one is full the oldest message is dropped;
//! a later edit of that message fails and the engine sends the result as a
//! new message instead.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use quizduel_duel::application::ports::{DeliveryFailure, Messenger};
use quizduel_duel::domain::ids::{ChatAddress, MessageHandle};
use quizduel_duel::domain::notices::Notice;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::warn;

/// Messages kept per address before the oldest is dropped.
pub const DEFAULT_INBOX_CAPACITY: usize = 64;

/// A notice waiting in an inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboxMessage {
    /// Handle-assigned message id; edits target it.
    pub message_id: i64,
    /// The notice itself.
    pub notice: Notice,
}

#[derive(Debug, Default)]
struct Inboxes {
    next_id: i64,
    pending: HashMap<ChatAddress, VecDeque<OutboxMessage>>,
}

/// Messenger that queues notices per chat address.
#[derive(Debug)]
pub struct OutboxMessenger {
    inboxes: Mutex<Inboxes>,
    capacity: usize,
}

impl Default for OutboxMessenger {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_INBOX_CAPACITY)
    }
}

impl OutboxMessenger {
    /// Creates an empty outbox with the default per-address capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty outbox keeping at most `capacity` messages per
    /// address (at least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inboxes: Mutex::default(),
            capacity: capacity.max(1),
        }
    }

    /// Removes and returns every pending message for `address`, oldest
    /// first.
    pub async fn drain(&self, address: ChatAddress) -> Vec<OutboxMessage> {
        self.inboxes
            .lock()
            .await
            .pending
            .remove(&address)
            .map(Vec::from)
            .unwrap_or_default()
    }
}

#[async_trait]
impl Messenger for OutboxMessenger {
    async fn deliver(
        &self,
        address: ChatAddress,
        notice: &Notice,
    ) -> Result<MessageHandle, DeliveryFailure> {
        let mut inboxes = self.inboxes.lock().await;
        inboxes.next_id += 1;
        let message_id = inboxes.next_id;
        let inbox = inboxes.pending.entry(address).or_default();
        while inbox.len() >= self.capacity {
            if let Some(dropped) = inbox.pop_front() {
                warn!(
                    chat_id = address.0,
                    message_id = dropped.message_id,
                    "inbox full, dropping oldest message"
                );
            }
        }
        inbox.push_back(OutboxMessage {
            message_id,
            notice: notice.clone(),
        });
        Ok(MessageHandle {
            address,
            message_id,
        })
    }

    async fn edit(&self, handle: MessageHandle, notice: &Notice) -> Result<(), DeliveryFailure> {
        let mut inboxes = self.inboxes.lock().await;
        let message = inboxes
            .pending
            .get_mut(&handle.address)
            .and_then(|inbox| inbox.iter_mut().find(|m| m.message_id == handle.message_id))
            .ok_or_else(|| DeliveryFailure {
                address: handle.address,
                reason: format!("message {} is no longer pending", handle.message_id),
            })?;
        message.notice = notice.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use quizduel_duel::domain::ids::{MatchId, PlayerId};

    use super::*;

    fn stopped(match_id: MatchId) -> Notice {
        Notice::MatchStopped {
            match_id,
            stopped_by: PlayerId(1),
        }
    }

    #[tokio::test]
    async fn test_drain_returns_messages_in_order_and_empties_inbox() {
        // Arrange
        let outbox = OutboxMessenger::new();
        let address = ChatAddress(5);
        let match_id = MatchId::generate();
        outbox
            .deliver(address, &Notice::InviteCancelled { match_id })
            .await
            .unwrap();
        outbox.deliver(address, &stopped(match_id)).await.unwrap();

        // Act
        let drained = outbox.drain(address).await;

        // Assert
        assert_eq!(drained.len(), 2);
        assert!(drained[0].message_id < drained[1].message_id);
        assert_eq!(drained[1].notice, stopped(match_id));
        assert!(outbox.drain(address).await.is_empty());
    }

    #[tokio::test]
    async fn test_edit_replaces_pending_message() {
        // Arrange
        let outbox = OutboxMessenger::new();
        let match_id = MatchId::generate();
        let handle = outbox
            .deliver(ChatAddress(5), &Notice::InviteCancelled { match_id })
            .await
            .unwrap();

        // Act
        outbox.edit(handle, &stopped(match_id)).await.unwrap();

        // Assert
        let drained = outbox.drain(ChatAddress(5)).await;
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].notice, stopped(match_id));
    }

    #[tokio::test]
    async fn test_full_inbox_drops_oldest_message() {
        // Arrange
        let outbox = OutboxMessenger::with_capacity(2);
        let address = ChatAddress(5);
        let match_id = MatchId::generate();
        let oldest = outbox
            .deliver(address, &Notice::InviteCancelled { match_id })
            .await
            .unwrap();
        outbox.deliver(address, &stopped(match_id)).await.unwrap();

        // Act
        let newest = outbox.deliver(address, &stopped(match_id)).await.unwrap();

        // Assert
        assert!(outbox.edit(oldest, &stopped(match_id)).await.is_err());
        let drained = outbox.drain(address).await;
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[1].message_id, newest.message_id);
        assert!(drained.iter().all(|m| m.message_id != oldest.message_id));
    }

    #[tokio::test]
    async fn test_inbox_cap_is_per_address() {
        // Arrange
        let outbox = OutboxMessenger::with_capacity(1);
        let match_id = MatchId::generate();

        // Act
        outbox.deliver(ChatAddress(5), &stopped(match_id)).await.unwrap();
        outbox.deliver(ChatAddress(6), &stopped(match_id)).await.unwrap();

        // Assert
        assert_eq!(outbox.drain(ChatAddress(5)).await.len(), 1);
        assert_eq!(outbox.drain(ChatAddress(6)).await.len(), 1);
    }

    #[tokio::test]
    async fn test_edit_after_drain_fails() {
        // Arrange
        let outbox = OutboxMessenger::new();
        let match_id = MatchId::generate();
        let handle = outbox
            .deliver(ChatAddress(5), &Notice::InviteCancelled { match_id })
            .await
            .unwrap();
        outbox.drain(ChatAddress(5)).await;

        // Act
        let result = outbox.edit(handle, &stopped(match_id)).await;

        // Assert
        assert!(matches!(result, Err(DeliveryFailure { address, .. }) if address == ChatAddress(5)));
    }
}
