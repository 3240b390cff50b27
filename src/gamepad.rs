//! Local controller interface.
//!
//! [`Gamepads`] is what the poller needs from the host controller API, one call
//! per query, addressed by slot index `0..MAX_SLOTS`. The XInput implementation
//! lives in `backends::windows::xinput`.

use crate::error::DeviceError;
use crate::layout::{scale_rumble, GamepadButtons, GamepadFlags, PadInput, SlotRecord};

pub use crate::layout::{BatteryKind, BatteryLevel};

/// Instantaneous controller report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PadState {
    /// Changes whenever the device reports new input.
    pub packet_number: u32,
    pub input: PadInput,
}

/// What a controller supports.
///
/// `buttons` has a bit set for every button present. The motor fields are the
/// maximum supported speeds, zero when the motor is absent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PadCapabilities {
    pub buttons: GamepadButtons,
    pub left_motor: u16,
    pub right_motor: u16,
}

impl PadCapabilities {
    /// Capability flags as published in the slot record.
    pub fn flags(&self) -> GamepadFlags {
        let mut flags = GamepadFlags::empty();
        flags.set(
            GamepadFlags::HAS_GUIDE_BUTTON,
            self.buttons.contains(GamepadButtons::GUIDE),
        );
        flags.set(
            GamepadFlags::HAS_MISC_BUTTON,
            self.buttons.contains(GamepadButtons::MISC),
        );
        flags.set(
            GamepadFlags::HAS_RUMBLE,
            self.left_motor != 0 || self.right_motor != 0,
        );
        flags
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatteryInfo {
    pub kind: BatteryKind,
    pub level: BatteryLevel,
}

/// Motor speeds in the device's native 16-bit range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Vibration {
    /// Low-frequency (left) motor.
    pub left_motor: u16,
    /// High-frequency (right) motor.
    pub right_motor: u16,
}

impl Vibration {
    /// Rumble requested by the cartridge for this slot.
    pub fn from_slot(slot: &SlotRecord) -> Self {
        Self {
            left_motor: scale_rumble(slot.lo_freq_rumble),
            right_motor: scale_rumble(slot.hi_freq_rumble),
        }
    }
}

/// Host controller API, addressed by slot.
pub trait Gamepads {
    /// `Ok(None)` when nothing is plugged into the slot.
    fn state(&mut self, slot: usize) -> Result<Option<PadState>, DeviceError>;

    fn capabilities(&mut self, slot: usize) -> Result<PadCapabilities, DeviceError>;

    fn battery(&mut self, slot: usize) -> Result<BatteryInfo, DeviceError>;

    fn set_vibration(&mut self, slot: usize, vibration: Vibration) -> Result<(), DeviceError>;
}
