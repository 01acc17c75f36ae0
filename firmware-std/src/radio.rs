//! ESP-IDF 802.15.4 driver bindings.
//!
//! Implements the core's [`Radio`] and [`RxHandoff`] traits over the
//! `esp_ieee802154_*` system API and installs the receive-done callback the
//! driver invokes from its interrupt handler.

use esp_idf_svc::hal::{interrupt, task};
use esp_idf_svc::sys::{
    esp, esp_ieee802154_enable, esp_ieee802154_frame_info_t, esp_ieee802154_receive,
    esp_ieee802154_receive_handle_done, esp_ieee802154_set_channel, esp_ieee802154_set_panid,
    esp_ieee802154_set_promiscuous, esp_ieee802154_set_rx_when_idle,
    esp_ieee802154_set_short_address, esp_ieee802154_transmit, EspError,
};

use zigsniff::capture::CaptureHandler;
use zigsniff::radio::{Radio, RxHandoff};
use zigsniff::record::{Heap, FRAME_BUFFER_LEN, MAX_FRAME_SIZE};

use crate::CONTEXT;

/// The 802.15.4 radio, owned by the host command worker.
pub struct Ieee802154Radio {
    /// The driver transmits from this buffer after `transmit` returns, so it
    /// must outlive the call.
    tx_frame: [u8; FRAME_BUFFER_LEN],
}

impl Ieee802154Radio {
    /// Power up the radio and tune it to `channel`.
    pub fn enable(channel: u8) -> Result<Self, EspError> {
        esp!(unsafe { esp_ieee802154_enable() })?;
        esp!(unsafe { esp_ieee802154_set_channel(channel) })?;
        Ok(Self {
            tx_frame: [0; FRAME_BUFFER_LEN],
        })
    }
}

impl Radio for Ieee802154Radio {
    type Error = EspError;

    fn set_promiscuous(&mut self, enabled: bool) -> Result<(), EspError> {
        esp!(unsafe { esp_ieee802154_set_promiscuous(enabled) })
    }

    fn set_pan_id(&mut self, pan_id: u16) -> Result<(), EspError> {
        esp!(unsafe { esp_ieee802154_set_panid(pan_id) })
    }

    fn set_short_address(&mut self, addr: u16) -> Result<(), EspError> {
        esp!(unsafe { esp_ieee802154_set_short_address(addr) })
    }

    fn set_rx_when_idle(&mut self, enabled: bool) -> Result<(), EspError> {
        esp!(unsafe { esp_ieee802154_set_rx_when_idle(enabled) })
    }

    fn receive(&mut self) -> Result<(), EspError> {
        esp!(unsafe { esp_ieee802154_receive() })
    }

    fn transmit(&mut self, frame: &[u8]) -> Result<(), EspError> {
        let len = frame.len().min(FRAME_BUFFER_LEN);
        self.tx_frame.fill(0);
        self.tx_frame[..len].copy_from_slice(&frame[..len]);
        // No CCA; completion is reported by the driver's transmit-done
        // callback, which is left at its default.
        esp!(unsafe { esp_ieee802154_transmit(self.tx_frame.as_ptr(), false) })
    }
}

/// Receive buffer the driver is currently delivering.
struct RxDone {
    frame: *const u8,
}

impl RxHandoff for RxDone {
    fn release(&mut self) {
        unsafe {
            esp_ieee802154_receive_handle_done(self.frame);
        }
    }

    fn rearm(&mut self) {
        unsafe {
            esp_ieee802154_receive();
        }
    }
}

/// Receive-done callback, overriding the driver's weak default.
///
/// Called in interrupt context once per received frame. `frame[0]` is the
/// PHY length byte.
#[no_mangle]
pub unsafe extern "C" fn esp_ieee802154_receive_done(
    frame: *mut u8,
    frame_info: *mut esp_ieee802154_frame_info_t,
) {
    // Nothing to hand back without a buffer; keep listening.
    if frame.is_null() {
        unsafe { esp_ieee802154_receive() };
        return;
    }

    // Safety: the driver hands over a full receive buffer (length byte +
    // up to MAX_FRAME_SIZE bytes) and its frame info, both valid until
    // `esp_ieee802154_receive_handle_done`.
    let rssi = if frame_info.is_null() {
        0
    } else {
        unsafe { (*frame_info).rssi }
    };
    let len = usize::from(unsafe { *frame }).min(MAX_FRAME_SIZE) + 1;
    let raw = unsafe { core::slice::from_raw_parts(frame, len) };

    let handler = CaptureHandler::new(&CONTEXT, &Heap);
    let mut rx = RxDone { frame };

    // Waking the relay task from here may make it the highest-priority
    // ready task; switch to it as soon as the ISR returns.
    let yield_needed = interrupt::with_isr_yield_signal(|| {
        handler.on_frame(&mut rx, raw, rssi);
    });
    if yield_needed {
        task::do_yield();
    }
}
