//! XInput controllers (slots 0–3).
//!
//! Thin wrapper over `XInputGetState`, `XInputGetCapabilities`,
//! `XInputGetBatteryInformation` and `XInputSetState`. Every call is made fresh;
//! nothing is cached here, the poller decides how often to ask.
//!
//! `ERROR_DEVICE_NOT_CONNECTED` maps to [`DeviceError::NotConnected`]. Any other
//! non-zero status becomes [`DeviceError::Os`] so it renders with the system
//! message text.

use std::io;

use windows_sys::Win32::Foundation::{ERROR_DEVICE_NOT_CONNECTED, ERROR_SUCCESS};
use windows_sys::Win32::UI::Input::XboxController::*;

use crate::error::DeviceError;
use crate::gamepad::{
    BatteryInfo, BatteryKind, BatteryLevel, Gamepads, PadCapabilities, PadState, Vibration,
};
use crate::layout::{GamepadButtons, PadInput, MAX_SLOTS};

/// The host's four XInput user slots, addressed `0..MAX_SLOTS`.
///
/// Stateless: XInput keeps the per-slot state itself, so this type only turns
/// the raw status codes and structs into [`Gamepads`] results. Slot `n` is what
/// Windows shows as player `n + 1`.
///
/// # Button bits
/// [`PadCapabilities::buttons`] keeps every bit of the raw `wButtons` mask.
/// `GUIDE` (`0x0400`) and `MISC` (`0x0800`) sit in bits XInput leaves
/// undocumented; most drivers never set them.
#[derive(Debug, Default)]
pub struct XInputGamepads;

impl XInputGamepads {
    /// No setup is needed; XInput loads with the process.
    pub fn new() -> Self {
        Self
    }
}

/// Map an XInput status code onto [`DeviceError`].
#[inline]
fn check(status: u32) -> Result<(), DeviceError> {
    match status {
        ERROR_SUCCESS => Ok(()),
        ERROR_DEVICE_NOT_CONNECTED => Err(DeviceError::NotConnected),
        code => Err(DeviceError::Os(io::Error::from_raw_os_error(code as i32))),
    }
}

#[inline]
fn user_index(slot: usize) -> u32 {
    debug_assert!(slot < MAX_SLOTS);
    slot as u32
}

/// Copy the raw report as-is. Sticks and triggers are not normalized; the
/// cartridge reads the same ranges XInput reports.
fn pad_input(gp: &XINPUT_GAMEPAD) -> PadInput {
    PadInput {
        buttons: gp.wButtons,
        left_trigger: gp.bLeftTrigger,
        right_trigger: gp.bRightTrigger,
        left_stick_x: gp.sThumbLX,
        left_stick_y: gp.sThumbLY,
        right_stick_x: gp.sThumbRX,
        right_stick_y: gp.sThumbRY,
    }
}

fn battery_kind(raw: u8) -> BatteryKind {
    match raw {
        BATTERY_TYPE_DISCONNECTED => BatteryKind::Disconnected,
        BATTERY_TYPE_WIRED => BatteryKind::Wired,
        BATTERY_TYPE_ALKALINE => BatteryKind::Alkaline,
        BATTERY_TYPE_NIMH => BatteryKind::Nimh,
        _ => BatteryKind::Unknown,
    }
}

fn battery_level(raw: u8) -> BatteryLevel {
    match raw {
        BATTERY_LEVEL_FULL => BatteryLevel::Full,
        BATTERY_LEVEL_MEDIUM => BatteryLevel::Medium,
        BATTERY_LEVEL_LOW => BatteryLevel::Low,
        _ => BatteryLevel::Empty,
    }
}

impl Gamepads for XInputGamepads {
    /// `XInputGetState`. An empty slot is `Ok(None)`.
    fn state(&mut self, slot: usize) -> Result<Option<PadState>, DeviceError> {
        // FFI struct: must be manually zeroed
        let mut state: XINPUT_STATE = unsafe { std::mem::zeroed() };
        let status = unsafe { XInputGetState(user_index(slot), &mut state) };
        match check(status) {
            Ok(()) => Ok(Some(PadState {
                packet_number: state.dwPacketNumber,
                input: pad_input(&state.Gamepad),
            })),
            Err(DeviceError::NotConnected) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// `XInputGetCapabilities`. Motor speeds are the maximum supported, zero
    /// when the motor is absent.
    fn capabilities(&mut self, slot: usize) -> Result<PadCapabilities, DeviceError> {
        let mut caps: XINPUT_CAPABILITIES = unsafe { std::mem::zeroed() };
        // Flags 0: report every device type, not only gamepads.
        check(unsafe { XInputGetCapabilities(user_index(slot), 0, &mut caps) })?;
        Ok(PadCapabilities {
            buttons: GamepadButtons::from_bits_retain(caps.Gamepad.wButtons),
            left_motor: caps.Vibration.wLeftMotorSpeed,
            right_motor: caps.Vibration.wRightMotorSpeed,
        })
    }

    /// `XInputGetBatteryInformation` for the gamepad itself, not a headset.
    fn battery(&mut self, slot: usize) -> Result<BatteryInfo, DeviceError> {
        let mut info: XINPUT_BATTERY_INFORMATION = unsafe { std::mem::zeroed() };
        check(unsafe {
            XInputGetBatteryInformation(user_index(slot), BATTERY_DEVTYPE_GAMEPAD, &mut info)
        })?;
        Ok(BatteryInfo {
            kind: battery_kind(info.BatteryType),
            level: battery_level(info.BatteryLevel),
        })
    }

    /// `XInputSetState`. Both motors take the full 16-bit range.
    fn set_vibration(&mut self, slot: usize, vibration: Vibration) -> Result<(), DeviceError> {
        let raw = XINPUT_VIBRATION {
            wLeftMotorSpeed: vibration.left_motor,
            wRightMotorSpeed: vibration.right_motor,
        };
        check(unsafe { XInputSetState(user_index(slot), &raw) })
    }
}
