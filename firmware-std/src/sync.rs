//! Interrupt-safe raw mutex for the capture queue.
//!
//! The receive-done callback enqueues from interrupt context, so the queue
//! lock must never wait on a task. This one masks interrupts through
//! `vPortEnterCritical` for the duration of the closure instead of taking
//! the FreeRTOS mutex behind the default `critical-section` implementation.

use embassy_sync::blocking_mutex::raw::RawMutex;
use esp_idf_svc::hal::interrupt::IsrCriticalSection;

pub struct IsrRawMutex(IsrCriticalSection);

unsafe impl RawMutex for IsrRawMutex {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self = Self(IsrCriticalSection::new());

    fn lock<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.0.enter();
        f()
    }
}
