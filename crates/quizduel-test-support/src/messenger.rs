//! Test messenger: records every delivery and edit.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use quizduel_duel::application::ports::{DeliveryFailure, Messenger};
use quizduel_duel::domain::ids::{ChatAddress, MessageHandle};
use quizduel_duel::domain::notices::Notice;

/// A message the messenger was asked to send or edit.
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    /// Where it went.
    pub handle: MessageHandle,
    /// What it said.
    pub notice: Notice,
}

/// Whether a logged message was a fresh delivery or an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sent {
    Delivered,
    Edited,
}

#[derive(Debug, Default)]
struct Outbox {
    next_id: i64,
    log: Vec<(Sent, SentMessage)>,
    unreachable: HashSet<ChatAddress>,
    fail_edits: bool,
}

/// A messenger that keeps everything in memory. Addresses can be made
/// unreachable and edits can be made to fail, to exercise the fallback
/// paths.
#[derive(Debug, Default)]
pub struct RecordingMessenger {
    outbox: Mutex<Outbox>,
}

impl RecordingMessenger {
    /// Create a messenger where every delivery succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every delivery to `address` fail.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn make_unreachable(&self, address: ChatAddress) {
        self.outbox.lock().unwrap().unreachable.insert(address);
    }

    /// Makes every edit fail.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn fail_edits(&self) {
        self.outbox.lock().unwrap().fail_edits = true;
    }

    /// Every successful delivery, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn delivered(&self) -> Vec<SentMessage> {
        self.sent(Sent::Delivered)
    }

    /// Every successful edit, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn edited(&self) -> Vec<SentMessage> {
        self.sent(Sent::Edited)
    }

    fn sent(&self, kind: Sent) -> Vec<SentMessage> {
        self.outbox
            .lock()
            .unwrap()
            .log
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Notices that reached `address`, delivered or edited, in the order
    /// they were sent.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn notices_to(&self, address: ChatAddress) -> Vec<Notice> {
        let outbox = self.outbox.lock().unwrap();
        outbox
            .log
            .iter()
            .map(|(_, m)| m)
            .filter(|m| m.handle.address == address)
            .map(|m| m.notice.clone())
            .collect()
    }

    /// Number of round results that reached anyone.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn result_count(&self) -> usize {
        let outbox = self.outbox.lock().unwrap();
        outbox
            .log
            .iter()
            .filter(|(_, m)| matches!(m.notice, Notice::RoundResult { .. }))
            .count()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn deliver(
        &self,
        address: ChatAddress,
        notice: &Notice,
    ) -> Result<MessageHandle, DeliveryFailure> {
        let mut outbox = self.outbox.lock().unwrap();
        if outbox.unreachable.contains(&address) {
            return Err(DeliveryFailure {
                address,
                reason: "chat unreachable".into(),
            });
        }
        outbox.next_id += 1;
        let handle = MessageHandle {
            address,
            message_id: outbox.next_id,
        };
        outbox.log.push((
            Sent::Delivered,
            SentMessage {
                handle,
                notice: notice.clone(),
            },
        ));
        Ok(handle)
    }

    async fn edit(&self, handle: MessageHandle, notice: &Notice) -> Result<(), DeliveryFailure> {
        let mut outbox = self.outbox.lock().unwrap();
        if outbox.fail_edits || outbox.unreachable.contains(&handle.address) {
            return Err(DeliveryFailure {
                address: handle.address,
                reason: "message can no longer be edited".into(),
            });
        }
        outbox.log.push((
            Sent::Edited,
            SentMessage {
                handle,
                notice: notice.clone(),
            },
        ));
        Ok(())
    }
}
