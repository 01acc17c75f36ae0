/// Operating mode and the controller that reconfigures the radio.
///
/// `Capture` listens promiscuously and relays every frame to the host.
/// `Transmit` stops listening so the host can inject raw frames.
use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};

use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};

use crate::context::SnifferContext;
use crate::queue::QUEUE_CAPACITY;
use crate::radio::{Radio, RadioStep, BROADCAST_PAN_ID, BROADCAST_SHORT_ADDR};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Capture,
    Transmit,
}

impl Mode {
    /// Name used in status reports, matching the host command keywords.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Capture => "SNIFF",
            Mode::Transmit => "TX",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Atomic mode cell. Readers in interrupt context see either the old or the
/// new mode, never anything in between.
pub(crate) struct ModeCell(AtomicU8);

impl ModeCell {
    const CAPTURE: u8 = 0;
    const TRANSMIT: u8 = 1;

    pub(crate) const fn new(mode: Mode) -> Self {
        Self(AtomicU8::new(Self::encode(mode)))
    }

    const fn encode(mode: Mode) -> u8 {
        match mode {
            Mode::Capture => Self::CAPTURE,
            Mode::Transmit => Self::TRANSMIT,
        }
    }

    pub(crate) fn load(&self) -> Mode {
        match self.0.load(Ordering::Acquire) {
            Self::TRANSMIT => Mode::Transmit,
            _ => Mode::Capture,
        }
    }

    pub(crate) fn store(&self, mode: Mode) {
        self.0.store(Self::encode(mode), Ordering::Release);
    }
}

/// A radio reconfiguration call failed while entering `target`.
#[derive(Debug)]
pub struct ModeError<E> {
    pub target: Mode,
    pub step: RadioStep,
    pub source: E,
}

impl<E: fmt::Debug> fmt::Display for ModeError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "entering {} mode failed at {}: {:?}",
            self.target, self.step, self.source
        )
    }
}

impl<E: fmt::Debug> core::error::Error for ModeError<E> {}

/// Sole writer of the context's mode. Owns the radio.
pub struct ModeController<'a, R, const N: usize = QUEUE_CAPACITY, M = CriticalSectionRawMutex>
where
    M: RawMutex,
{
    radio: R,
    ctx: &'a SnifferContext<N, M>,
}

impl<'a, R: Radio, const N: usize, M: RawMutex> ModeController<'a, R, N, M> {
    pub fn new(radio: R, ctx: &'a SnifferContext<N, M>) -> Self {
        Self { radio, ctx }
    }

    pub fn mode(&self) -> Mode {
        self.ctx.mode()
    }

    pub fn context(&self) -> &'a SnifferContext<N, M> {
        self.ctx
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }

    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    /// Apply the configuration of the current (boot) mode unconditionally.
    /// Called once at startup; a failure leaves the radio in an unknown state.
    pub fn start(&mut self) -> Result<(), ModeError<R::Error>> {
        let mode = self.ctx.mode();
        self.apply(mode)?;
        log::info!("Radio configured for {} mode", mode);
        Ok(())
    }

    /// Switch to `target`. Returns `Ok(false)` without touching the radio if
    /// `target` is already active.
    pub fn set_mode(&mut self, target: Mode) -> Result<bool, ModeError<R::Error>> {
        if self.ctx.mode() == target {
            return Ok(false);
        }

        // Publish first so the capture interrupt stops queueing before the
        // receiver is torn down.
        self.ctx.mode_cell().store(target);
        self.apply(target)?;
        log::info!("{} mode enabled", target);
        Ok(true)
    }

    fn apply(&mut self, target: Mode) -> Result<(), ModeError<R::Error>> {
        let at = |step: RadioStep| move |source: R::Error| ModeError { target, step, source };

        match target {
            Mode::Capture => {
                self.radio.set_promiscuous(true).map_err(at(RadioStep::Promiscuous))?;
                self.radio.set_pan_id(BROADCAST_PAN_ID).map_err(at(RadioStep::PanId))?;
                self.radio
                    .set_short_address(BROADCAST_SHORT_ADDR)
                    .map_err(at(RadioStep::ShortAddress))?;
                self.radio.set_rx_when_idle(true).map_err(at(RadioStep::RxWhenIdle))?;
                self.radio.receive().map_err(at(RadioStep::Receive))?;
            }
            Mode::Transmit => {
                self.radio.set_promiscuous(false).map_err(at(RadioStep::Promiscuous))?;
                self.radio.set_rx_when_idle(false).map_err(at(RadioStep::RxWhenIdle))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{MockRadio, RadioCall};

    fn capture_sequence() -> Vec<RadioCall> {
        vec![
            RadioCall::Promiscuous(true),
            RadioCall::PanId(0xFFFF),
            RadioCall::ShortAddress(0xFFFF),
            RadioCall::RxWhenIdle(true),
            RadioCall::Receive,
        ]
    }

    #[test]
    fn start_configures_capture_mode() {
        let ctx: SnifferContext = SnifferContext::new();
        let mut controller = ModeController::new(MockRadio::default(), &ctx);
        controller.start().unwrap();
        assert_eq!(controller.radio().calls, capture_sequence());
        assert_eq!(ctx.mode(), Mode::Capture);
    }

    #[test]
    fn repeated_mode_issues_no_reconfiguration() {
        let ctx: SnifferContext = SnifferContext::new();
        let mut controller = ModeController::new(MockRadio::default(), &ctx);

        assert!(!controller.set_mode(Mode::Capture).unwrap());
        assert!(controller.radio().calls.is_empty());

        controller.set_mode(Mode::Transmit).unwrap();
        let after_first = controller.radio().calls.len();
        assert!(!controller.set_mode(Mode::Transmit).unwrap());
        assert_eq!(controller.radio().calls.len(), after_first);
    }

    #[test]
    fn switching_to_transmit_disables_listening_once() {
        let ctx: SnifferContext = SnifferContext::new();
        let mut controller = ModeController::new(MockRadio::default(), &ctx);

        assert!(controller.set_mode(Mode::Transmit).unwrap());
        assert_eq!(
            controller.radio().calls,
            vec![RadioCall::Promiscuous(false), RadioCall::RxWhenIdle(false)]
        );
        assert_eq!(ctx.mode(), Mode::Transmit);
    }

    #[test]
    fn switching_back_to_capture_runs_full_sequence_once() {
        let ctx: SnifferContext = SnifferContext::new();
        let mut controller = ModeController::new(MockRadio::default(), &ctx);
        controller.set_mode(Mode::Transmit).unwrap();
        controller.radio_mut().calls.clear();

        assert!(controller.set_mode(Mode::Capture).unwrap());
        assert_eq!(controller.radio().calls, capture_sequence());
        assert_eq!(ctx.mode(), Mode::Capture);
    }

    #[test]
    fn failing_step_is_reported() {
        let ctx: SnifferContext = SnifferContext::new();
        let radio = MockRadio {
            fail_on: Some(RadioStep::ShortAddress),
            ..MockRadio::default()
        };
        let mut controller = ModeController::new(radio, &ctx);

        let err = controller.start().unwrap_err();
        assert_eq!(err.target, Mode::Capture);
        assert_eq!(err.step, RadioStep::ShortAddress);
        // Later steps are never attempted
        assert!(!controller.radio().calls.contains(&RadioCall::Receive));

        let msg = format!("{}", err);
        assert!(msg.contains("SNIFF"));
        assert!(msg.contains("set_short_address"));
    }

    #[test]
    fn mode_cell_round_trips_both_modes() {
        let cell = ModeCell::new(Mode::Capture);
        cell.store(Mode::Transmit);
        assert_eq!(cell.load(), Mode::Transmit);
        cell.store(Mode::Capture);
        assert_eq!(cell.load(), Mode::Capture);
    }
}
