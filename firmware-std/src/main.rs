//! zigsniff: ESP-IDF std firmware
//!
//! Thread-based firmware for the ESP32-H2 / ESP32-C6. Captures 802.15.4
//! frames in promiscuous mode and relays them over UART0, or injects raw
//! frames written by the host when switched to transmit mode.
//!
//! Two threads plus the radio interrupt:
//! - receive-done ISR → capture queue (see `radio.rs`, locked by `sync.rs`)
//! - relay thread: capture queue → relay lines on UART0
//! - command thread: UART0 input → mode changes / frame transmission

mod radio;
mod serial;
mod sync;

use std::convert::Infallible;
use std::sync::Arc;
use std::thread;

use esp_idf_svc::hal::gpio::AnyIOPin;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::task::block_on;
use esp_idf_svc::hal::uart::config::{Config as UartConfig, DataBits, FlowControl, StopBits};
use esp_idf_svc::hal::uart::UartDriver;
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::sys::xTaskGetTickCount;

use zigsniff::board;
use zigsniff::comm::{HostCommandWorker, SERIAL_BAUD};
use zigsniff::context::SnifferContext;
use zigsniff::mode::{ModeController, ModeError};
use zigsniff::queue::QUEUE_CAPACITY;
use zigsniff::relay::FrameRelay;

use radio::Ieee802154Radio;
use serial::{SharedUart, UartInput};
use sync::IsrRawMutex;

// ── Shared state ──────────────────────────────────────────────────────

/// Mode, drop counter and capture queue, shared with the receive ISR.
pub(crate) static CONTEXT: SnifferContext<QUEUE_CAPACITY, IsrRawMutex> = SnifferContext::new();

fn main() -> anyhow::Result<()> {
    esp_idf_svc::sys::link_patches();

    // Bind the ESP-IDF logger to the `log` facade
    esp_idf_svc::log::EspLogger::initialize_default();

    log::info!(
        "zigsniff v{} starting on {} (std)",
        env!("CARGO_PKG_VERSION"),
        board::BOARD_NAME
    );

    // ── Peripherals ──────────────────────────────────────────────────

    let peripherals = Peripherals::take()?;
    // PHY calibration data lives in NVS; keep the partition open.
    let _nvs = EspDefaultNvsPartition::take()?;

    // ── UART0 (host link) ────────────────────────────────────────────

    #[cfg(feature = "esp32c6")]
    let (tx_pin, rx_pin) = (peripherals.pins.gpio16, peripherals.pins.gpio17);
    #[cfg(not(feature = "esp32c6"))]
    let (tx_pin, rx_pin) = (peripherals.pins.gpio24, peripherals.pins.gpio23);

    let uart_config = UartConfig::default()
        .baudrate(Hertz(SERIAL_BAUD))
        .data_bits(DataBits::DataBits8)
        .parity_none()
        .stop_bits(StopBits::STOP1)
        .flow_control(FlowControl::None);
    let uart = UartDriver::new(
        peripherals.uart0,
        tx_pin,
        rx_pin,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &uart_config,
    )?;
    let (uart_tx, uart_rx) = uart.into_split();
    let uart_out = Arc::new(SharedUart::new(uart_tx));
    let mut uart_in = UartInput::new(uart_rx);

    // ── Radio ────────────────────────────────────────────────────────

    let radio = Ieee802154Radio::enable(board::RADIO_CHANNEL)?;
    let mut controller = ModeController::new(radio, &CONTEXT);
    controller
        .start()
        .map_err(|e| anyhow::anyhow!("initial radio configuration failed: {}", e))?;

    // ── Relay thread ─────────────────────────────────────────────────

    let relay_out = uart_out.clone();
    thread::Builder::new()
        .name("relay".into())
        .stack_size(4096)
        .spawn(move || {
            let mut relay = FrameRelay::new(&CONTEXT, &*relay_out, || unsafe { xTaskGetTickCount() });
            block_on(relay.run());
        })?;
    log::info!("Relay thread spawned");

    // ── Command thread ───────────────────────────────────────────────

    let command = thread::Builder::new()
        .name("command".into())
        .stack_size(4096)
        .spawn(move || -> Result<Infallible, ModeError<_>> {
            let mut worker = HostCommandWorker::new(controller, &*uart_out);
            worker.run(&mut uart_in)
        })?;
    log::info!("Command thread spawned");

    log::info!("System initialized");
    log::info!("- UART baud: {}", SERIAL_BAUD);
    log::info!("- Radio channel: {}", board::RADIO_CHANNEL);
    log::info!("- Queue size: {} frames", CONTEXT.queue().capacity());

    // The command thread only returns when a mode transition failed. The
    // radio is then in an unknown state, so halt.
    match command.join() {
        Ok(Err(e)) => log::error!("Radio reconfiguration failed, halting: {}", e),
        Ok(Ok(never)) => match never {},
        Err(_) => log::error!("Command thread panicked, halting"),
    }
    std::process::abort()
}
