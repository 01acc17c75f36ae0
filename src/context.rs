/// Process-wide sniffer state shared between interrupt and task contexts.
///
/// One [`SnifferContext`] is created at boot (usually as a `static`) and
/// passed by reference to every component. The interrupt side only touches
/// atomics and the queue's non-blocking producer, so nothing here can make
/// the radio interrupt wait on a task.
use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};

use crate::mode::{Mode, ModeCell};
use crate::queue::{CaptureQueue, QUEUE_CAPACITY};

/// Count of frames discarded for lack of memory or queue space.
///
/// Written only from the radio interrupt, so increments are a plain
/// load/store pair. Wraps at `u32::MAX`.
pub struct DropCounter(AtomicU32);

impl DropCounter {
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    pub(crate) fn increment(&self) {
        let n = self.0.load(Ordering::Relaxed);
        self.0.store(n.wrapping_add(1), Ordering::Relaxed);
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for DropCounter {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SnifferContext<const N: usize = QUEUE_CAPACITY, M = CriticalSectionRawMutex>
where
    M: RawMutex,
{
    mode: ModeCell,
    drops: DropCounter,
    queue: CaptureQueue<N, M>,
}

impl<const N: usize, M: RawMutex> SnifferContext<N, M> {
    /// Boot state: capture mode, empty queue, no drops.
    pub const fn new() -> Self {
        Self {
            mode: ModeCell::new(Mode::Capture),
            drops: DropCounter::new(),
            queue: CaptureQueue::new(),
        }
    }

    /// Current operating mode, read in a single load.
    pub fn mode(&self) -> Mode {
        self.mode.load()
    }

    pub(crate) fn mode_cell(&self) -> &ModeCell {
        &self.mode
    }

    pub fn drops(&self) -> &DropCounter {
        &self.drops
    }

    pub fn queue(&self) -> &CaptureQueue<N, M> {
        &self.queue
    }
}

impl<const N: usize, M: RawMutex> Default for SnifferContext<N, M> {
    fn default() -> Self {
        Self::new()
    }
}
