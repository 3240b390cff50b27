//! Periodic waitable timers.
//!
//! Both loops sleep on one of these: the supervisor's scan timer (once a second
//! by default) and the poller's frame timer (16 ms). Waiting blocks the thread
//! in the kernel, so an idle bridge costs no CPU.

use std::io;
use std::time::Duration;

use windows_sys::Win32::Foundation::{CloseHandle, FALSE, HANDLE, WAIT_FAILED};
use windows_sys::Win32::System::Threading::{
    CreateWaitableTimerW, SetWaitableTimer, WaitForSingleObject, INFINITE,
};

use crate::error::{Error, Result};
use crate::ticker::{Ticker, TickerFactory};

/// Auto-reset waitable timer firing every `period`, first after one period.
///
/// Signals that arrive while nobody waits are coalesced, so a slow iteration
/// never leads to a burst of back-to-back ticks. The handle is closed on drop.
#[derive(Debug)]
pub struct WaitableTimer {
    handle: HANDLE,
}

impl WaitableTimer {
    /// Create and start the timer.
    ///
    /// `period` is rounded down to whole milliseconds and clamped to at least
    /// 1 ms. Either Win32 call failing is reported as [`Error::Timer`].
    pub fn new(period: Duration) -> Result<Self> {
        let handle = unsafe { CreateWaitableTimerW(std::ptr::null(), FALSE, std::ptr::null()) };
        if handle.is_null() {
            return Err(Error::Timer(io::Error::last_os_error()));
        }
        // Own it now so every error path below closes it.
        let timer = Self { handle };

        let period_ms = period.as_millis().clamp(1, i32::MAX as u128) as i32;
        // Negative due time is relative, in 100 ns units.
        let due: i64 = -10_000 * period_ms as i64;
        let ok = unsafe {
            SetWaitableTimer(
                timer.handle,
                &due,
                period_ms,
                None,
                std::ptr::null(),
                FALSE,
            )
        };
        if ok == FALSE {
            return Err(Error::Timer(io::Error::last_os_error()));
        }
        Ok(timer)
    }
}

impl Drop for WaitableTimer {
    fn drop(&mut self) {
        unsafe {
            if !self.handle.is_null() {
                CloseHandle(self.handle);
                self.handle = std::ptr::null_mut();
            }
        }
    }
}

impl Ticker for WaitableTimer {
    /// Block until the timer is signaled. Only `WAIT_FAILED` is an error.
    fn wait(&mut self) -> Result<()> {
        if unsafe { WaitForSingleObject(self.handle, INFINITE) } == WAIT_FAILED {
            return Err(Error::Timer(io::Error::last_os_error()));
        }
        Ok(())
    }
}

/// [`TickerFactory`] handing out [`WaitableTimer`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct WaitableTimers;

impl TickerFactory for WaitableTimers {
    type Ticker = WaitableTimer;

    fn periodic(&self, period: Duration) -> Result<WaitableTimer> {
        WaitableTimer::new(period)
    }
}
