/// Radio receive-done handler.
///
/// Runs in interrupt context once per arrived frame. Copies the frame into a
/// [`PacketRecord`], offers it to the capture queue without waiting, and
/// always hands the driver buffer back and re-arms the receiver, whichever
/// branch was taken. No logging or unbounded work happens here, and the only
/// lock taken is the queue's raw mutex.
use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};

use crate::context::SnifferContext;
use crate::mode::Mode;
use crate::queue::QUEUE_CAPACITY;
use crate::radio::RxHandoff;
use crate::record::{FrameStorage, PacketRecord};

/// Which branch the handler took for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Not in capture mode; frame discarded without counting.
    Ignored,
    /// Record handed to the queue.
    Queued,
    /// No storage for a record.
    DroppedNoMemory,
    /// Queue at capacity; the new record was discarded.
    DroppedQueueFull,
}

pub struct CaptureHandler<'a, S, const N: usize = QUEUE_CAPACITY, M = CriticalSectionRawMutex>
where
    M: RawMutex,
{
    ctx: &'a SnifferContext<N, M>,
    storage: &'a S,
}

impl<'a, S: FrameStorage, const N: usize, M: RawMutex> CaptureHandler<'a, S, N, M> {
    pub fn new(ctx: &'a SnifferContext<N, M>, storage: &'a S) -> Self {
        Self { ctx, storage }
    }

    /// Handle one arrived frame. `raw` starts with the PHY length byte.
    pub fn on_frame(&self, rx: &mut impl RxHandoff, raw: &[u8], rssi: i8) -> CaptureOutcome {
        let outcome = self.capture(raw, rssi);
        rx.release();
        rx.rearm();
        outcome
    }

    fn capture(&self, raw: &[u8], rssi: i8) -> CaptureOutcome {
        if self.ctx.mode() != Mode::Capture {
            return CaptureOutcome::Ignored;
        }

        let Some(record) = PacketRecord::capture(self.storage, raw, rssi) else {
            self.ctx.drops().increment();
            return CaptureOutcome::DroppedNoMemory;
        };

        match self.ctx.queue().try_enqueue(record) {
            Ok(()) => CaptureOutcome::Queued,
            Err(rejected) => {
                drop(rejected);
                self.ctx.drops().increment();
                CaptureOutcome::DroppedQueueFull
            }
        }
    }
}
