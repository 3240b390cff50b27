//! GPIO region layout shared with Pinput-enabled cartridges.
//!
//! The 0x80-byte region is owned by PICO-8: the cartridge writes [`MAGIC`] into it
//! when it wants Pinput, and reads controller state back from it every frame.
//! Everything here is a byte-exact external contract. Nothing in this module knows
//! about processes or XInput; it only converts between bytes and typed records.
//!
//! ## Region (0x80 bytes)
//! - `0x00..0x10`: magic marker (only present until the bridge zeroes the region)
//! - `0x00..0x40`: four [`SlotRecord`]s of 16 bytes each (slot 0 overlaps the magic)
//! - `0x40..0x80`: unused by the bridge, preserved verbatim
//!
//! ## Slot record (16 bytes, little-endian)
//! | Offset | Field |
//! |---|---|
//! | 0 | flags ([`GamepadFlags`]) |
//! | 1 | battery (0 empty/wired, 255 full) |
//! | 2..4 | buttons ([`GamepadButtons`]) |
//! | 4, 5 | left, right trigger |
//! | 6..14 | left stick x/y, right stick x/y (`i16`) |
//! | 14, 15 | low/high frequency rumble (written by the cartridge) |

use bitflags::bitflags;

/// Magic bytes a Pinput-enabled cartridge writes at the start of its GPIO area.
pub const MAGIC: [u8; 16] = [
    0x02, 0x20, 0xc7, 0x46, 0x77, 0xab, 0x44, 0x6e, 0xbe, 0xdc, 0x7f, 0xd6, 0xd2, 0x77, 0x98, 0x4d,
];

/// Size of the PICO-8 GPIO area.
pub const REGION_SIZE: usize = 0x80;

/// Offset of the GPIO area from the base of PICO-8 cartridge RAM.
pub const GPIO_OFFSET: usize = 0x5f80;

/// Offset of the magic bytes from the start of the region.
pub const MAGIC_OFFSET: usize = 0;

/// Offset of the first slot record from the start of the region.
pub const SLOTS_OFFSET: usize = 0;

/// Size of one packed slot record.
pub const SLOT_SIZE: usize = 16;

/// Number of controller slots bridged (XInput user indices 0..4).
pub const MAX_SLOTS: usize = 4;

const TAIL_OFFSET: usize = SLOTS_OFFSET + SLOT_SIZE * MAX_SLOTS;
const TAIL_SIZE: usize = REGION_SIZE - TAIL_OFFSET;

const _: () = assert!(TAIL_OFFSET <= REGION_SIZE);
const _: () = assert!(MAGIC_OFFSET + MAGIC.len() <= REGION_SIZE);

bitflags! {
    /// Per-slot informational flags. Only meaningful while `CONNECTED` is set.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct GamepadFlags: u8 {
        const CONNECTED = 1 << 0;
        /// The `battery` byte and the `CHARGING` flag are meaningful.
        const HAS_BATTERY = 1 << 1;
        const CHARGING = 1 << 2;
        const HAS_GUIDE_BUTTON = 1 << 3;
        const HAS_MISC_BUTTON = 1 << 4;
        const HAS_RUMBLE = 1 << 5;

        const _ = !0;
    }
}

impl GamepadFlags {
    /// Flags derived from a capability query.
    pub const CAPABILITIES: Self = Self::HAS_GUIDE_BUTTON
        .union(Self::HAS_MISC_BUTTON)
        .union(Self::HAS_RUMBLE);

    /// Flags derived from a battery query.
    pub const POWER: Self = Self::HAS_BATTERY.union(Self::CHARGING);
}

bitflags! {
    /// Button bitmask, identical to `XINPUT_GAMEPAD::wButtons` plus the guide and misc
    /// buttons in the two bits XInput leaves undocumented.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct GamepadButtons: u16 {
        const DPAD_UP = 1 << 0;
        const DPAD_DOWN = 1 << 1;
        const DPAD_LEFT = 1 << 2;
        const DPAD_RIGHT = 1 << 3;
        const START = 1 << 4;
        const BACK = 1 << 5;
        const LEFT_STICK = 1 << 6;
        const RIGHT_STICK = 1 << 7;
        const LEFT_BUMPER = 1 << 8;
        const RIGHT_BUMPER = 1 << 9;
        const GUIDE = 1 << 10;
        const MISC = 1 << 11;
        const A = 1 << 12;
        const B = 1 << 13;
        const X = 1 << 14;
        const Y = 1 << 15;
    }
}

/// Raw controller input, copied as-is from the local device report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PadInput {
    pub buttons: u16,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub left_stick_x: i16,
    pub left_stick_y: i16,
    pub right_stick_x: i16,
    pub right_stick_y: i16,
}

/// One controller slot as seen by the cartridge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlotRecord {
    pub flags: GamepadFlags,
    pub battery: u8,
    pub input: PadInput,
    /// Written by the cartridge.
    pub lo_freq_rumble: u8,
    /// Written by the cartridge.
    pub hi_freq_rumble: u8,
}

impl SlotRecord {
    pub fn decode(bytes: &[u8; SLOT_SIZE]) -> Self {
        let word = |at: usize| [bytes[at], bytes[at + 1]];
        Self {
            flags: GamepadFlags::from_bits_retain(bytes[0]),
            battery: bytes[1],
            input: PadInput {
                buttons: u16::from_le_bytes(word(2)),
                left_trigger: bytes[4],
                right_trigger: bytes[5],
                left_stick_x: i16::from_le_bytes(word(6)),
                left_stick_y: i16::from_le_bytes(word(8)),
                right_stick_x: i16::from_le_bytes(word(10)),
                right_stick_y: i16::from_le_bytes(word(12)),
            },
            lo_freq_rumble: bytes[14],
            hi_freq_rumble: bytes[15],
        }
    }

    pub fn encode(&self) -> [u8; SLOT_SIZE] {
        let mut out = [0u8; SLOT_SIZE];
        out[0] = self.flags.bits();
        out[1] = self.battery;
        out[2..4].copy_from_slice(&self.input.buttons.to_le_bytes());
        out[4] = self.input.left_trigger;
        out[5] = self.input.right_trigger;
        out[6..8].copy_from_slice(&self.input.left_stick_x.to_le_bytes());
        out[8..10].copy_from_slice(&self.input.left_stick_y.to_le_bytes());
        out[10..12].copy_from_slice(&self.input.right_stick_x.to_le_bytes());
        out[12..14].copy_from_slice(&self.input.right_stick_y.to_le_bytes());
        out[14] = self.lo_freq_rumble;
        out[15] = self.hi_freq_rumble;
        out
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.flags.contains(GamepadFlags::CONNECTED)
    }
}

/// Typed view of the whole region.
///
/// `decode` followed by `encode` reproduces the input bytes exactly, including
/// unknown flag bits and the unused tail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionRecord {
    pub slots: [SlotRecord; MAX_SLOTS],
    tail: [u8; TAIL_SIZE],
}

impl Default for RegionRecord {
    fn default() -> Self {
        Self {
            slots: [SlotRecord::default(); MAX_SLOTS],
            tail: [0; TAIL_SIZE],
        }
    }
}

impl RegionRecord {
    /// `true` if the region starts with [`MAGIC`], i.e. the cartridge asks for a reset.
    pub fn has_magic(bytes: &[u8; REGION_SIZE]) -> bool {
        bytes[MAGIC_OFFSET..MAGIC_OFFSET + MAGIC.len()] == MAGIC
    }

    pub fn decode(bytes: &[u8; REGION_SIZE]) -> Self {
        let mut slots = [SlotRecord::default(); MAX_SLOTS];
        for (i, slot) in slots.iter_mut().enumerate() {
            let start = SLOTS_OFFSET + i * SLOT_SIZE;
            let mut raw = [0u8; SLOT_SIZE];
            raw.copy_from_slice(&bytes[start..start + SLOT_SIZE]);
            *slot = SlotRecord::decode(&raw);
        }
        let mut tail = [0u8; TAIL_SIZE];
        tail.copy_from_slice(&bytes[TAIL_OFFSET..]);
        Self { slots, tail }
    }

    pub fn encode(&self) -> [u8; REGION_SIZE] {
        let mut out = [0u8; REGION_SIZE];
        for (i, slot) in self.slots.iter().enumerate() {
            let start = SLOTS_OFFSET + i * SLOT_SIZE;
            out[start..start + SLOT_SIZE].copy_from_slice(&slot.encode());
        }
        out[TAIL_OFFSET..].copy_from_slice(&self.tail);
        out
    }
}

/// Coarse battery charge as reported by the local controller API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatteryLevel {
    Empty,
    Low,
    Medium,
    Full,
}

/// Power source of a controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatteryKind {
    Wired,
    Alkaline,
    Nimh,
    Disconnected,
    Unknown,
}

/// Map a battery report onto the slot's battery byte and power flags.
///
/// Only real battery packs get `HAS_BATTERY`; wired, disconnected and unknown
/// power sources report 0.
pub fn quantize_battery(kind: BatteryKind, level: BatteryLevel) -> (GamepadFlags, u8) {
    match kind {
        BatteryKind::Alkaline | BatteryKind::Nimh => {
            let byte = match level {
                BatteryLevel::Full => u8::MAX,
                BatteryLevel::Medium => (u8::MAX as u16 * 2 / 3) as u8,
                BatteryLevel::Low => (u8::MAX as u16 / 3) as u8,
                BatteryLevel::Empty => 0,
            };
            (GamepadFlags::HAS_BATTERY, byte)
        }
        BatteryKind::Wired | BatteryKind::Disconnected | BatteryKind::Unknown => {
            (GamepadFlags::empty(), 0)
        }
    }
}

/// Expand an 8-bit rumble byte to the 16-bit motor range by bit replication.
#[inline]
pub fn scale_rumble(value: u8) -> u16 {
    value as u16 * 0x101
}
