//! Pinput bridge.
//!
//! Finds a running PICO-8 process, locates the cartridge's 128-byte GPIO
//! region by its magic marker and keeps it filled with the state of up to four
//! local XInput controllers, relaying rumble requests back the other way.
//!
//! The pieces, in the order a session uses them:
//! - [`locator`] finds the target process and its main module
//! - [`scanner`] finds the shared region inside that module
//! - [`bridge`] reads and writes the region
//! - [`poller`] syncs controllers with the region once per frame
//! - [`supervisor`] ties them together and retries forever
//!
//! OS access goes through the [`process::ProcessApi`], [`gamepad::Gamepads`]
//! and [`ticker::TickerFactory`] traits. [`backends::windows`] implements them
//! for Windows.

pub mod backends;
pub mod bridge;
pub mod config;
pub mod error;
pub mod gamepad;
pub mod layout;
pub mod locator;
pub mod logger;
pub mod pattern;
pub mod poller;
pub mod process;
pub mod scanner;
pub mod supervisor;
pub mod ticker;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{DeviceError, Error, Result};
pub use supervisor::{Attempt, Supervisor};
