//! In-process bus backed by a bounded tokio channel.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;
use futures_util::{StreamExt, stream};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::{BusError, BusEvent, EventPublisher, Result};

/// Stream of events delivered by the in-process bus.
pub type EventStream = Pin<Box<dyn Stream<Item = BusEvent> + Send>>;

/// Publisher half of the in-process bus.
///
/// Cloning yields another sender onto the same channel. The stream ends once
/// every sender has been dropped. Publishing never waits: when `capacity`
/// events are already queued the event is refused with [`BusError::Full`].
#[derive(Debug, Clone)]
pub struct ChannelEventBus {
    sender: mpsc::Sender<BusEvent>,
}

impl ChannelEventBus {
    /// Creates a bus holding at most `capacity` undelivered events, and the
    /// stream its consumer reads from.
    pub fn new(capacity: usize) -> (Self, EventStream) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let events = stream::unfold(receiver, |mut receiver| async move {
            receiver.recv().await.map(|event| (event, receiver))
        })
        .boxed();
        (Self { sender }, events)
    }
}

#[async_trait]
impl EventPublisher for ChannelEventBus {
    async fn publish(&self, event: &BusEvent) -> Result<()> {
        self.sender
            .try_send(event.clone())
            .map_err(|err| match err {
                TrySendError::Full(_) => BusError::Full,
                TrySendError::Closed(_) => BusError::Closed,
            })
    }
}
