//! Broadcast of [`CostmapEvent`]s to downstream consumers.
//!
//! Planners, visualisers and recorders subscribe to learn that layers were
//! cleared and need to be re-read. Built on [`tokio::sync::broadcast`], so a
//! slow subscriber only loses its own oldest events.

use costclear_types::CostmapEvent;
use tokio::sync::broadcast;
use tracing::trace;

const DEFAULT_CAPACITY: usize = 64;

/// Cheap to clone; all clones share one channel.
#[derive(Clone, Debug)]
pub struct CostmapEventBus {
    sender: broadcast::Sender<CostmapEvent>,
}

impl CostmapEventBus {
    /// # Panics
    ///
    /// If `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Hand `event` to every current subscriber and return how many there
    /// were. Nobody listening is normal and returns 0.
    pub fn publish(&self, event: CostmapEvent) -> usize {
        match self.sender.send(event) {
            Ok(n) => n,
            Err(broadcast::error::SendError(event)) => {
                trace!(id = %event.id, "no subscribers for costmap event");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CostmapEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for CostmapEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use costclear_types::{ClearOperation, ClearReport};

    fn event() -> CostmapEvent {
        CostmapEvent::new("local_costmap", ClearReport::new(ClearOperation::Entire))
    }

    #[tokio::test]
    async fn publish_and_receive() -> Result<(), Box<dyn std::error::Error>> {
        let bus = CostmapEventBus::default();
        let mut rx = bus.subscribe();

        let e = event();
        assert_eq!(bus.publish(e.clone()), 1);

        let received = rx.recv().await?;
        assert_eq!(received.id, e.id);
        assert_eq!(received.costmap, "local_costmap");
        Ok(())
    }

    #[tokio::test]
    async fn every_subscriber_gets_the_event() -> Result<(), Box<dyn std::error::Error>> {
        let bus = CostmapEventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.clone().subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        let e = event();
        assert_eq!(bus.publish(e.clone()), 2);
        assert_eq!(rx1.recv().await?.id, e.id);
        assert_eq!(rx2.recv().await?.id, e.id);
        Ok(())
    }

    #[test]
    fn publish_without_subscribers_is_not_an_error() {
        let bus = CostmapEventBus::default();
        assert_eq!(bus.publish(event()), 0);
    }
}
