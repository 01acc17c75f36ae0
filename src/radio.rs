/// Radio driver capabilities used by the core.
///
/// The core never talks to hardware directly. The firmware implements these
/// traits over the vendor 802.15.4 driver; tests implement them with
/// recording doubles.
use core::fmt;

/// Channel used when the board does not choose one (13 = 2415 MHz).
pub const DEFAULT_CHANNEL: u8 = 13;

/// PAN identifier accepting every network.
pub const BROADCAST_PAN_ID: u16 = 0xFFFF;

/// Short address accepting every destination.
pub const BROADCAST_SHORT_ADDR: u16 = 0xFFFF;

/// Task-side radio control: reconfiguration and transmission.
pub trait Radio {
    type Error: fmt::Debug;

    fn set_promiscuous(&mut self, enabled: bool) -> Result<(), Self::Error>;

    fn set_pan_id(&mut self, pan_id: u16) -> Result<(), Self::Error>;

    fn set_short_address(&mut self, addr: u16) -> Result<(), Self::Error>;

    /// Keep the receiver listening whenever the radio is otherwise idle.
    fn set_rx_when_idle(&mut self, enabled: bool) -> Result<(), Self::Error>;

    /// Start (or restart) reception.
    fn receive(&mut self) -> Result<(), Self::Error>;

    /// Submit a frame, PHY length byte first, without requesting an
    /// acknowledgement. Returns once the driver has accepted the frame.
    fn transmit(&mut self, frame: &[u8]) -> Result<(), Self::Error>;
}

/// Interrupt-side receive handoff for the frame currently being delivered.
///
/// Both calls are mandatory once per delivered frame: skipping either one
/// stalls reception permanently.
pub trait RxHandoff {
    /// Hand the driver's receive buffer back after the frame was copied out.
    fn release(&mut self);

    /// Restart reception for the next frame.
    fn rearm(&mut self);
}

/// Configuration step, reported when a reconfiguration call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioStep {
    Promiscuous,
    PanId,
    ShortAddress,
    RxWhenIdle,
    Receive,
}

impl RadioStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            RadioStep::Promiscuous => "set_promiscuous",
            RadioStep::PanId => "set_pan_id",
            RadioStep::ShortAddress => "set_short_address",
            RadioStep::RxWhenIdle => "set_rx_when_idle",
            RadioStep::Receive => "receive",
        }
    }
}

impl fmt::Display for RadioStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
