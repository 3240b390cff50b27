//! The real-time loop that keeps the shared region in sync with local controllers.
//!
//! Each tick reads the whole region, reacts to the reset marker, refreshes up to
//! [`MAX_SLOTS`] slots from the local controllers and writes the region back.
//! Cheap state queries run every tick for slots already known to be connected;
//! looking for new controllers and asking for capabilities and battery level
//! only happens on recheck ticks, once every `recheck_interval` ticks.
//!
//! The cartridge writes the same bytes concurrently without any lock. A torn
//! snapshot is harmless: rumble bytes are re-read every tick and everything we
//! own is rewritten every tick.

use tracing::{debug, info, warn};

use crate::bridge::SharedRegion;
use crate::error::{DeviceError, Error, Result};
use crate::gamepad::{Gamepads, PadCapabilities, Vibration};
use crate::layout::{quantize_battery, GamepadFlags, RegionRecord, SlotRecord, MAX_SLOTS};
use crate::process::RemoteMemory;
use crate::ticker::Ticker;

/// What the poller remembers about one slot between ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlotTracking {
    pub connected: bool,
    /// `None` until the first report after a (re)start or reconnect.
    pub last_packet: Option<u32>,
}

/// Per-slot tracking state. Rebuilt from scratch whenever the cartridge asks
/// for a reset.
#[derive(Clone, Debug, Default)]
pub struct Tracking {
    pub slots: [SlotTracking; MAX_SLOTS],
    #[cfg(feature = "debug-log")]
    caps_logged: [bool; MAX_SLOTS],
}

/// Syncs one target's shared region with the local controllers.
pub struct Poller<'a, M: RemoteMemory, G: Gamepads> {
    region: SharedRegion<'a, M>,
    gamepads: &'a mut G,
    tracking: Tracking,
    frame: u32,
    recheck_interval: u32,
}

impl<'a, M: RemoteMemory, G: Gamepads> Poller<'a, M, G> {
    /// `recheck_interval` of 0 is treated as 1 (recheck every tick).
    pub fn new(region: SharedRegion<'a, M>, gamepads: &'a mut G, recheck_interval: u32) -> Self {
        Self {
            region,
            gamepads,
            tracking: Tracking::default(),
            frame: 0,
            recheck_interval: recheck_interval.max(1),
        }
    }

    pub fn tracking(&self) -> &Tracking {
        &self.tracking
    }

    /// Tick until the region becomes unreadable or unwritable.
    ///
    /// Returns the error that ended the session; the target has most likely exited.
    pub fn run<T: Ticker>(&mut self, ticker: &mut T) -> Error {
        loop {
            if let Err(e) = self.tick() {
                return e;
            }
            if let Err(e) = ticker.wait() {
                warn!("frame timer wait failed: {e}");
            }
        }
    }

    /// One read, update, write cycle. Fails only on remote memory errors.
    pub fn tick(&mut self) -> Result<()> {
        let bytes = self.region.read()?;

        // The cartridge may ask for a reset at any time, not only at startup.
        let mut record = if RegionRecord::has_magic(&bytes) {
            info!(
                address = format_args!("{:#x}", self.region.address()),
                "Pinput magic present, initializing"
            );
            self.region.init()?;
            self.reset();
            RegionRecord::default()
        } else {
            RegionRecord::decode(&bytes)
        };

        let recheck = self.frame == 0;
        for (slot, record) in record.slots.iter_mut().enumerate() {
            self.sync_slot(slot, recheck, record);
        }
        self.frame = (self.frame + 1) % self.recheck_interval;

        self.region.write_record(&record)
    }

    fn reset(&mut self) {
        self.frame = 0;
        self.tracking = Tracking::default();
    }

    fn sync_slot(&mut self, slot: usize, recheck: bool, record: &mut SlotRecord) {
        let player = slot + 1;
        let tracked = &mut self.tracking.slots[slot];
        if !tracked.connected && !recheck {
            return;
        }

        let state = match self.gamepads.state(slot) {
            Ok(state) => state,
            Err(DeviceError::NotConnected) => None,
            Err(e) => {
                warn!(player, "couldn't get state: {e}");
                None
            }
        };

        let Some(state) = state else {
            if tracked.connected {
                info!(player, "controller disconnected");
            }
            *tracked = SlotTracking::default();
            record.flags.remove(GamepadFlags::CONNECTED);
            return;
        };

        if !tracked.connected {
            info!(player, "controller connected");
            tracked.connected = true;
        }

        // Rumble flows out of the target, so push it before the packet check.
        match self
            .gamepads
            .set_vibration(slot, Vibration::from_slot(record))
        {
            Ok(()) | Err(DeviceError::NotConnected) => {}
            Err(e) => warn!(player, "couldn't set vibration: {e}"),
        }

        if tracked.last_packet == Some(state.packet_number) {
            return;
        }
        tracked.last_packet = Some(state.packet_number);
        record.input = state.input;

        if recheck {
            self.refresh_flags(slot, record);
        }
    }

    /// Rebuild flags and battery from capability and battery queries. A failed
    /// query keeps the bits it would have produced from the previous record.
    fn refresh_flags(&mut self, slot: usize, record: &mut SlotRecord) {
        let player = slot + 1;
        let mut flags = GamepadFlags::CONNECTED;

        match self.gamepads.capabilities(slot) {
            Ok(caps) => {
                flags |= caps.flags();
                self.log_capabilities(slot, &caps);
            }
            Err(e) => {
                warn!(player, "couldn't get capabilities: {e}");
                flags |= record.flags & GamepadFlags::CAPABILITIES;
            }
        }

        match self.gamepads.battery(slot) {
            Ok(info) => {
                let (power, level) = quantize_battery(info.kind, info.level);
                flags |= power;
                record.battery = level;
            }
            Err(e) => {
                warn!(player, "couldn't get battery info: {e}");
                flags |= record.flags & GamepadFlags::POWER;
            }
        }

        record.flags = flags;
    }

    #[cfg(feature = "debug-log")]
    fn log_capabilities(&mut self, slot: usize, caps: &PadCapabilities) {
        if std::mem::replace(&mut self.tracking.caps_logged[slot], true) {
            return;
        }
        let buttons: Vec<&str> = caps.buttons.iter_names().map(|(name, _)| name).collect();
        debug!(
            player = slot + 1,
            ?buttons,
            left_motor = format_args!("{:#06x}", caps.left_motor),
            right_motor = format_args!("{:#06x}", caps.right_motor),
            "[XINPUT/CAPS]"
        );
    }

    #[cfg(not(feature = "debug-log"))]
    fn log_capabilities(&mut self, slot: usize, caps: &PadCapabilities) {
        debug!(player = slot + 1, flags = ?caps.flags(), "capabilities");
    }
}
