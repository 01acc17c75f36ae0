/// Relay line codec and the worker that drains the capture queue.
///
/// Each captured frame becomes one ASCII line on the serial link:
///
/// ```text
/// [NNNNNN|RSSI:SSSSdB|LLLB] HEXHEX...\r\n
/// ```
///
/// `NNNNNN` is a tick-derived sequence value (mod 1 000 000), `SSSS` the RSSI
/// in dBm, `LLL` the payload byte count excluding the PHY length byte, then two
/// uppercase hex digits per payload byte.
use core::fmt::{self, Write};

use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use heapless::{String, Vec};

use crate::comm::SerialSink;
use crate::context::SnifferContext;
use crate::queue::QUEUE_CAPACITY;
use crate::record::{PacketRecord, MAX_FRAME_SIZE};

/// Sequence values wrap at this modulus (6 digits).
pub const SEQUENCE_MODULUS: u32 = 1_000_000;

/// Header `[NNNNNN|RSSI:SSSSdB|LLLB] ` is 26 characters.
const HEADER_LEN: usize = 26;

/// Longest relay line: header, full hex payload, CRLF.
pub const MAX_LINE_LEN: usize = HEADER_LEN + 2 * MAX_FRAME_SIZE + 2;

pub type LineBuffer = String<MAX_LINE_LEN>;

/// Render `record` as one relay line into `out` (cleared first).
pub fn render_line(record: &PacketRecord, ticks: u32, out: &mut LineBuffer) -> fmt::Result {
    let payload = record.payload();
    out.clear();
    write!(
        out,
        "[{:>6}|RSSI:{:>4}dB|{:>3}B] ",
        ticks % SEQUENCE_MODULUS,
        record.rssi(),
        payload.len()
    )?;
    for byte in payload {
        write!(out, "{:02X}", byte)?;
    }
    out.push_str("\r\n").map_err(|_| fmt::Error)
}

/// A relay line decoded on the host side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayLine {
    pub sequence: u32,
    pub rssi: i8,
    /// Payload bytes, PHY length byte excluded.
    pub payload: Vec<u8, MAX_FRAME_SIZE>,
}

impl RelayLine {
    /// Parse one line. Padding whitespace is optional and hex may be either
    /// case. Returns `None` unless the hex section holds exactly the declared
    /// number of bytes.
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.trim().strip_prefix('[')?;
        let (sequence, rest) = rest.split_once('|')?;
        let rest = rest.strip_prefix("RSSI:")?;
        let (rssi, rest) = rest.split_once("dB|")?;
        let (len, hex) = rest.split_once("B]")?;

        let sequence = sequence.trim().parse().ok()?;
        let rssi = rssi.trim().parse().ok()?;
        let len: usize = len.trim().parse().ok()?;
        let hex = hex.trim().as_bytes();
        if len > MAX_FRAME_SIZE || hex.len() != 2 * len {
            return None;
        }

        let mut payload = Vec::new();
        for pair in hex.chunks_exact(2) {
            let byte = (hex_digit(pair[0])? << 4) | hex_digit(pair[1])?;
            payload.push(byte).ok()?;
        }
        Some(Self {
            sequence,
            rssi,
            payload,
        })
    }
}

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' => Some(c - b'A' + 10),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}

/// Drains the capture queue and writes one relay line per record.
pub struct FrameRelay<'a, W, C, const N: usize = QUEUE_CAPACITY, M = CriticalSectionRawMutex>
where
    M: RawMutex,
{
    ctx: &'a SnifferContext<N, M>,
    serial: &'a W,
    /// Monotonic tick source for sequence values.
    clock: C,
    line: LineBuffer,
}

impl<'a, W, C, const N: usize, M> FrameRelay<'a, W, C, N, M>
where
    W: SerialSink,
    C: Fn() -> u32,
    M: RawMutex,
{
    pub fn new(ctx: &'a SnifferContext<N, M>, serial: &'a W, clock: C) -> Self {
        Self {
            ctx,
            serial,
            clock,
            line: LineBuffer::new(),
        }
    }

    /// Relay records forever, waiting while the queue is empty.
    pub async fn run(&mut self) {
        log::info!("Frame relay started");
        loop {
            self.relay_next().await;
        }
    }

    /// Wait for one record and relay it.
    pub async fn relay_next(&mut self) {
        let record = self.ctx.queue().dequeue().await;
        self.relay(record);
    }

    /// Write one record and release it. A failed write is logged once and the
    /// record is dropped; nothing is retried.
    pub fn relay(&mut self, record: PacketRecord) {
        if render_line(&record, (self.clock)(), &mut self.line).is_err() {
            log::warn!("Relay line overflow ({} bytes)", record.len());
            return;
        }
        if let Err(e) = self.serial.write_all(self.line.as_bytes()) {
            log::warn!("Relay write failed: {:?}", e);
        }
    }
}
