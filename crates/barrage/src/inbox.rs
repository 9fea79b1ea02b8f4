//! # Cross-Thread Inbox
//!
//! Feed threads (network readers, chat bridges) hand descriptors to the
//! renderer without touching the engine:
//!
//! ```text
//! feed thread ──ReceiverHandle::receive──► bounded channel ──drain──► tick
//! feed thread ──ReceiverHandle::receive──┘        (owner thread)
//! ```
//!
//! Handles never block. While the renderer is not running, or when the
//! channel is full, the descriptor is dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use barrage_shared::Descriptor;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

/// Owner side of the ingestion channel.
#[derive(Debug)]
pub struct Inbox {
    sender: Sender<Descriptor>,
    receiver: Receiver<Descriptor>,
    running: Arc<AtomicBool>,
}

impl Inbox {
    /// Creates an inbox holding at most `capacity` undrained descriptors.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        Self {
            sender,
            receiver,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns a new handle for a feed thread.
    #[must_use]
    pub fn handle(&self) -> ReceiverHandle {
        ReceiverHandle {
            sender: self.sender.clone(),
            running: Arc::clone(&self.running),
        }
    }

    /// Opens or closes the inbox for handles.
    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Release);
    }

    /// Takes every descriptor received so far, in arrival order.
    pub fn drain(&self) -> Vec<Descriptor> {
        self.receiver.try_iter().collect()
    }

    /// Discards undrained descriptors and returns how many there were.
    pub fn clear(&self) -> usize {
        self.receiver.try_iter().count()
    }

    /// Number of undrained descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// True if nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

/// Feed side of the ingestion channel. Cheap to clone, safe to send.
#[derive(Clone, Debug)]
pub struct ReceiverHandle {
    sender: Sender<Descriptor>,
    running: Arc<AtomicBool>,
}

impl ReceiverHandle {
    /// Queues a descriptor for the next tick.
    ///
    /// Returns false if it was dropped: the renderer is not running, the
    /// inbox is full, or the renderer is gone.
    pub fn receive(&self, descriptor: Descriptor) -> bool {
        if !self.running.load(Ordering::Acquire) {
            return false;
        }
        match self.sender.try_send(descriptor) {
            Ok(()) => true,
            Err(TrySendError::Full(dropped)) => {
                tracing::debug!(sprite_name = %dropped.sprite_name, "inbox full, descriptor dropped");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// True while the renderer accepts descriptors.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}
