//! Background subscriber that logs every review event.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use crate::bus::ReviewEvent;

pub struct EventLogger;

impl EventLogger {
    /// Log events from `rx` until the bus closes or `cancel` fires.
    /// Returns the number of events logged.
    pub async fn run(mut rx: broadcast::Receiver<ReviewEvent>, cancel: CancellationToken) -> u64 {
        tracing::info!("Event logger started");
        let mut logged = 0u64;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(logged, "Event logger stopping");
                    break;
                }
                received = rx.recv() => match received {
                    Ok(event) => {
                        tracing::info!(
                            event_type = %event.event_type,
                            item_id = ?event.item_id,
                            payload = %event.payload,
                            "Review event",
                        );
                        logged += 1;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Event logger lagged behind the bus");
                    }
                    Err(RecvError::Closed) => {
                        tracing::info!(logged, "Event bus closed, event logger stopping");
                        break;
                    }
                },
            }
        }

        logged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{EventBus, ITEM_APPROVED};

    #[tokio::test]
    async fn stops_when_bus_is_dropped() {
        let bus = EventBus::default();
        let handle = tokio::spawn(EventLogger::run(bus.subscribe(), CancellationToken::new()));

        bus.publish(ReviewEvent::new(ITEM_APPROVED).for_item(1));
        bus.publish(ReviewEvent::new(ITEM_APPROVED).for_item(2));
        drop(bus);

        assert_eq!(handle.await.unwrap(), 2);
    }

    #[tokio::test]
    async fn stops_on_cancel() {
        let bus = EventBus::default();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(EventLogger::run(bus.subscribe(), cancel.clone()));

        cancel.cancel();
        assert_eq!(handle.await.unwrap(), 0);
    }
}
