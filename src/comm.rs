/// Serial link: transport traits and the host command worker.
///
/// The host talks to the device over one UART. Outbound traffic is relay
/// lines and status lines, written under mutual exclusion. Inbound traffic is
/// read in chunks with a bounded wait; each chunk is either a `#CMD#` command
/// or, in transmit mode, a raw frame to send.
use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;
use core::fmt;

use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};

use crate::context::SnifferContext;
use crate::mode::{Mode, ModeController, ModeError};
use crate::protocol::{self, Chunk, Command, StatusLine};
use crate::queue::QUEUE_CAPACITY;
use crate::radio::Radio;

/// Serial baud rate (8N1, no flow control)
pub const SERIAL_BAUD: u32 = 115200;

/// Bounded wait per serial poll.
pub const POLL_TIMEOUT_MS: u32 = 100;

/// Largest inbound chunk; longer input is truncated.
pub const RX_CHUNK_LEN: usize = 2047;

/// Shared serial output.
///
/// Implementations hold exclusive access to the port for the duration of one
/// call and release it before returning, even on failure.
pub trait SerialSink {
    type Error: fmt::Debug;

    /// Write `bytes` in full. A short write is an error; callers do not retry.
    fn write_all(&self, bytes: &[u8]) -> Result<(), Self::Error>;
}

/// Serial input.
pub trait SerialSource {
    type Error: fmt::Debug;

    /// Wait up to `timeout_ms` for input and copy what arrived into `buf`.
    /// Returns 0 on timeout.
    fn read(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, Self::Error>;
}

/// Polls serial input and acts on host commands and outbound frames.
pub struct HostCommandWorker<'a, R, W, const N: usize = QUEUE_CAPACITY, M = CriticalSectionRawMutex>
where
    M: RawMutex,
{
    controller: ModeController<'a, R, N, M>,
    serial: &'a W,
    buf: Vec<u8>,
}

impl<'a, R, W, const N: usize, M> HostCommandWorker<'a, R, W, N, M>
where
    R: Radio,
    W: SerialSink,
    M: RawMutex,
{
    pub fn new(controller: ModeController<'a, R, N, M>, serial: &'a W) -> Self {
        Self {
            controller,
            serial,
            buf: vec![0; RX_CHUNK_LEN],
        }
    }

    pub fn controller(&self) -> &ModeController<'a, R, N, M> {
        &self.controller
    }

    /// Poll forever. Returns only when a mode transition fails.
    pub fn run<S: SerialSource>(&mut self, input: &mut S) -> Result<Infallible, ModeError<R::Error>> {
        log::info!("Host command worker started");
        loop {
            self.poll(input)?;
        }
    }

    /// One iteration: wait up to [`POLL_TIMEOUT_MS`] for a chunk and handle it.
    pub fn poll<S: SerialSource>(&mut self, input: &mut S) -> Result<(), ModeError<R::Error>> {
        let len = match input.read(&mut self.buf, POLL_TIMEOUT_MS) {
            Ok(len) => len,
            Err(e) => {
                log::warn!("Serial read failed: {:?}", e);
                return Ok(());
            }
        };
        if len == 0 {
            return Ok(());
        }

        // Move the buffer out so the chunk can borrow it while `self` is used.
        let buf = core::mem::take(&mut self.buf);
        let result = self.handle_chunk(&buf[..len]);
        self.buf = buf;
        result
    }

    /// Act on one chunk of serial input.
    pub fn handle_chunk(&mut self, chunk: &[u8]) -> Result<(), ModeError<R::Error>> {
        match protocol::classify(chunk) {
            Chunk::Command(cmd, text) => {
                log::info!("Command received: {}", printable(text));
                self.execute(cmd)
            }
            Chunk::Frame(frame) => {
                if self.controller.mode() == Mode::Transmit {
                    if let Err(e) = self.controller.radio_mut().transmit(frame) {
                        log::warn!("Transmit of {} bytes failed: {:?}", frame.len(), e);
                    }
                }
                Ok(())
            }
        }
    }

    fn execute(&mut self, cmd: Command) -> Result<(), ModeError<R::Error>> {
        match cmd {
            Command::SetMode(mode) => {
                self.controller.set_mode(mode)?;
            }
            Command::ReportStatus => self.report_status(),
            Command::Unrecognized => log::warn!("Unrecognized command"),
        }
        Ok(())
    }

    fn report_status(&self) {
        let ctx: &SnifferContext<N, M> = self.controller.context();
        let mut line = StatusLine::new();
        if protocol::format_status(
            ctx.mode(),
            ctx.queue().len(),
            ctx.queue().capacity(),
            ctx.drops().get(),
            &mut line,
        )
        .is_err()
        {
            log::warn!("Status line overflow");
            return;
        }
        if let Err(e) = self.serial.write_all(line.as_bytes()) {
            log::warn!("Status write failed: {:?}", e);
        }
    }
}

/// Command text for logs; binary input is not printed.
fn printable(text: &[u8]) -> &str {
    match core::str::from_utf8(text) {
        Ok(s) => s.trim_end(),
        Err(_) => "<binary>",
    }
}
