//! UART0 transport for the host link.

use std::sync::Mutex;

use esp_idf_svc::hal::delay::TickType;
use esp_idf_svc::hal::uart::{UartRxDriver, UartTxDriver};
use esp_idf_svc::sys::EspError;

use zigsniff::comm::{SerialSink, SerialSource};

/// UART transmit side shared by the relay thread and status reports.
pub struct SharedUart {
    tx: Mutex<UartTxDriver<'static>>,
}

impl SharedUart {
    pub fn new(tx: UartTxDriver<'static>) -> Self {
        Self { tx: Mutex::new(tx) }
    }
}

impl SerialSink for SharedUart {
    type Error = anyhow::Error;

    fn write_all(&self, bytes: &[u8]) -> anyhow::Result<()> {
        let mut tx = self
            .tx
            .lock()
            .map_err(|_| anyhow::anyhow!("UART mutex poisoned"))?;
        let written = tx.write(bytes)?;
        if written < bytes.len() {
            anyhow::bail!("short UART write: {} of {} bytes", written, bytes.len());
        }
        Ok(())
    }
}

/// UART receive side, read only by the host command worker.
pub struct UartInput {
    rx: UartRxDriver<'static>,
}

impl UartInput {
    pub fn new(rx: UartRxDriver<'static>) -> Self {
        Self { rx }
    }
}

impl SerialSource for UartInput {
    type Error = EspError;

    fn read(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, EspError> {
        self.rx
            .read(buf, TickType::new_millis(u64::from(timeout_ms)).ticks())
    }
}
