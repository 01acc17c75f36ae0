/// Bounded FIFO bridging the radio interrupt and the relay task.
///
/// Producer side (`try_enqueue`) never blocks and is safe from interrupt
/// context; consumer side (`dequeue`) waits until a record is available.
/// Overflow policy is drop-newest: a full queue hands the record back to the
/// producer and never evicts what is already queued.
///
/// The lock guarding the queue is the raw mutex `M`. Whatever the target uses
/// there must be safe to take from the radio interrupt; the default
/// [`CriticalSectionRawMutex`] is only that when the global critical-section
/// implementation masks interrupts.
use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embassy_sync::channel::{Channel, TrySendError};

use crate::record::PacketRecord;

/// Default number of queued records.
pub const QUEUE_CAPACITY: usize = 40;

pub struct CaptureQueue<const N: usize = QUEUE_CAPACITY, M = CriticalSectionRawMutex>
where
    M: RawMutex,
{
    channel: Channel<M, PacketRecord, N>,
}

impl<const N: usize, M: RawMutex> CaptureQueue<N, M> {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Offer a record without waiting. On a full queue the record is returned
    /// so the caller stays its sole owner.
    pub fn try_enqueue(&self, record: PacketRecord) -> Result<(), PacketRecord> {
        self.channel
            .try_send(record)
            .map_err(|TrySendError::Full(record)| record)
    }

    /// Wait for the oldest record and take ownership of it.
    pub async fn dequeue(&self) -> PacketRecord {
        self.channel.receive().await
    }

    /// Take the oldest record if there is one.
    pub fn try_dequeue(&self) -> Option<PacketRecord> {
        self.channel.try_receive().ok()
    }

    /// Current occupancy.
    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize, M: RawMutex> Default for CaptureQueue<N, M> {
    fn default() -> Self {
        Self::new()
    }
}
