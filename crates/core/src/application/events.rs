// Staging domain events into the transactional outbox

use crate::domain::{DomainEvent, OutboxEntry};
use crate::error::Result;
use crate::port::{IdProvider, StoreTransaction};
use tracing::debug;

/// Wrap `event` in its envelope and write it to the outbox of `tx`
pub async fn stage(
    tx: &mut dyn StoreTransaction,
    id_provider: &dyn IdProvider,
    now_millis: i64,
    event: DomainEvent,
) -> Result<()> {
    let message = event.into_message().to_json()?;
    let entry = OutboxEntry::from_message(id_provider.generate_id(), now_millis, message);

    debug!(outbox_id = %entry.id, topic = %entry.topic, "Event staged");

    tx.enqueue_event(&entry).await
}
