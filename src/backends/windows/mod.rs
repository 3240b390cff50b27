#![cfg(target_os = "windows")]

//! Windows backends.
//!
//! - **process**: psapi enumeration and `Read/WriteProcessMemory`
//! - **xinput**: XInput controller slots
//! - **timer**: waitable timers for the scan and frame loops
//!
//! Most users should not touch these directly. Hand them to
//! [`Supervisor`](crate::supervisor::Supervisor) and call `run()`.

pub mod process;
pub mod timer;
pub mod xinput;

pub use process::{Win32Process, Win32Processes};
pub use timer::{WaitableTimer, WaitableTimers};
pub use xinput::XInputGamepads;
