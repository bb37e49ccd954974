//! Commit event source backed by the in-process event hub.

use crate::ports::CommitEventSource;
use async_trait::async_trait;
use shared_bus::{CommitCallback, InMemoryEventHub, SubscriptionError, SubscriptionHandle};
use shared_types::TxId;

#[async_trait]
impl CommitEventSource for InMemoryEventHub {
    async fn connect(&self) -> Result<(), SubscriptionError> {
        InMemoryEventHub::connect(self);
        Ok(())
    }

    async fn disconnect(&self) {
        InMemoryEventHub::disconnect(self);
    }

    fn is_connected(&self) -> bool {
        InMemoryEventHub::is_connected(self)
    }

    async fn register_commit_callback(
        &self,
        tx_id: TxId,
        callback: CommitCallback,
    ) -> Result<SubscriptionHandle, SubscriptionError> {
        self.register(tx_id, callback)
    }

    async fn unregister(&self, handle: &SubscriptionHandle) -> bool {
        InMemoryEventHub::unregister(self, handle)
    }
}
