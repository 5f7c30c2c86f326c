use tokio::sync::mpsc;
use tracing::warn;

/// Whether a selection change came from a step inside the engine or from the outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOrigin {
    /// A step, gesture or wheel notch handled by the engine
    Internal,
    /// An explicit selected-index assignment, settled by catch-up steps
    External,
}

/// Events emitted by the carousel to its listeners
#[derive(Debug, Clone, PartialEq)]
pub enum CarouselEvent {
    /// Every slot of the build was measured and positioned
    ItemsLoaded { generation: u64 },
    /// The build timed out or was cancelled
    ItemsLoadFailed { generation: u64 },
    /// The selected index changed
    SelectionChanged {
        index: usize,
        origin: SelectionOrigin,
    },
}

/// Subscribed listeners. Dropped receivers are pruned on the next send.
#[derive(Debug, Default)]
pub struct Listeners {
    senders: Vec<mpsc::UnboundedSender<CarouselEvent>>,
}

impl Listeners {
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<CarouselEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.push(tx);
        rx
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }

    pub fn send(&mut self, event: CarouselEvent) {
        let before = self.senders.len();
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
        if self.senders.len() < before {
            warn!(
                dropped = before - self.senders.len(),
                "Failed to send carousel event: receiver dropped"
            );
        }
    }
}
