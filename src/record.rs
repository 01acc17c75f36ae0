/// Captured frame records.
///
/// A [`PacketRecord`] is a copy of one over-the-air frame, PHY length byte
/// included, plus the RSSI measured at capture time. It is built in interrupt
/// context and owned by exactly one holder at a time: capture handler, then
/// queue, then relay worker, which drops it after writing the relay line.
use alloc::vec::Vec;

/// Largest PHY payload (aPhyMaxPacketSize).
pub const MAX_FRAME_SIZE: usize = 127;

/// Frame buffer capacity: PHY length byte + payload.
pub const FRAME_BUFFER_LEN: usize = MAX_FRAME_SIZE + 1;

/// Source of record storage.
///
/// Must be callable from interrupt context and must report exhaustion instead
/// of blocking or aborting.
pub trait FrameStorage {
    /// Returns an empty buffer able to hold `len` bytes, or `None` when no
    /// memory is available.
    fn reserve(&self, len: usize) -> Option<Vec<u8>>;
}

/// Global heap storage. Allocation failure is reported, not fatal.
#[derive(Debug, Default, Clone, Copy)]
pub struct Heap;

impl FrameStorage for Heap {
    fn reserve(&self, len: usize) -> Option<Vec<u8>> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(len).ok()?;
        Some(buf)
    }
}

/// One captured frame plus capture metadata.
#[derive(Debug, PartialEq, Eq)]
pub struct PacketRecord {
    /// PHY length byte followed by the frame bytes.
    frame: Vec<u8>,
    rssi: i8,
}

impl PacketRecord {
    /// Copy a raw frame out of a driver buffer.
    ///
    /// `raw[0]` is the PHY length byte; the record holds that byte plus the
    /// bytes it announces, bounded by [`MAX_FRAME_SIZE`] and by `raw` itself.
    /// Returns `None` when `storage` cannot supply a buffer.
    pub fn capture(storage: &impl FrameStorage, raw: &[u8], rssi: i8) -> Option<Self> {
        let len = frame_len(raw);
        let mut frame = storage.reserve(len)?;
        frame.extend_from_slice(&raw[..len]);
        Some(Self { frame, rssi })
    }

    /// Number of meaningful bytes, PHY length byte included.
    pub fn len(&self) -> usize {
        self.frame.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }

    /// Frame bytes after the PHY length byte.
    pub fn payload(&self) -> &[u8] {
        self.frame.get(1..).unwrap_or(&[])
    }

    /// The full buffer, PHY length byte first.
    pub fn as_bytes(&self) -> &[u8] {
        &self.frame
    }

    /// Receive signal strength in dBm.
    pub fn rssi(&self) -> i8 {
        self.rssi
    }
}

/// Length of the record built from `raw`, PHY length byte included.
fn frame_len(raw: &[u8]) -> usize {
    match raw.first() {
        Some(&phy_len) => (usize::from(phy_len).min(MAX_FRAME_SIZE) + 1).min(raw.len()),
        None => 0,
    }
}
