//! In-memory stand-ins for the OS collaborators, used by unit tests.

use std::cell::{Cell, RefCell};
use std::io;
use std::rc::Rc;
use std::time::Duration;

use crate::error::{DeviceError, Error, Result};
use crate::gamepad::{BatteryInfo, Gamepads, PadCapabilities, PadState, Vibration};
use crate::layout::{PadInput, MAX_SLOTS};
use crate::process::{ModuleId, ModuleInfo, ProcessApi, RemoteMemory};
use crate::ticker::{Ticker, TickerFactory};

/// A flat chunk of foreign memory starting at `base`.
#[derive(Debug)]
pub(crate) struct FakeMemory {
    pid: u32,
    base: usize,
    bytes: RefCell<Vec<u8>>,
    reads: Cell<usize>,
    writes: Cell<usize>,
    fail_after: Cell<Option<usize>>,
    fail_writes_after: Cell<Option<usize>>,
    written: RefCell<Vec<Vec<u8>>>,
}

impl FakeMemory {
    pub fn new(pid: u32, base: usize, size: usize) -> Self {
        Self {
            pid,
            base,
            bytes: RefCell::new(vec![0; size]),
            reads: Cell::new(0),
            writes: Cell::new(0),
            fail_after: Cell::new(None),
            fail_writes_after: Cell::new(None),
            written: RefCell::new(Vec::new()),
        }
    }

    pub fn poke(&self, address: usize, data: &[u8]) {
        let start = address - self.base;
        self.bytes.borrow_mut()[start..start + data.len()].copy_from_slice(data);
    }

    pub fn peek(&self, address: usize, len: usize) -> Vec<u8> {
        let start = address - self.base;
        self.bytes.borrow()[start..start + len].to_vec()
    }

    /// Reads attempted so far.
    pub fn reads(&self) -> usize {
        self.reads.get()
    }

    /// Writes attempted so far.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    /// Every buffer successfully written, in order.
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.written.borrow().clone()
    }

    /// Fail every operation once `n` operations have been attempted.
    pub fn fail_after(&self, n: usize) {
        self.fail_after.set(Some(n));
    }

    /// Fail every write once `n` writes have been attempted.
    pub fn fail_writes_after(&self, n: usize) {
        self.fail_writes_after.set(Some(n));
    }

    fn gone(&self) -> bool {
        self.fail_after
            .get()
            .is_some_and(|n| self.reads.get() + self.writes.get() > n)
    }

    fn range(&self, address: usize, len: usize) -> io::Result<(usize, usize)> {
        let size = self.bytes.borrow().len();
        let start = address
            .checked_sub(self.base)
            .filter(|&s| s < size)
            .ok_or_else(|| io::Error::from_raw_os_error(299))?;
        Ok((start, len.min(size - start)))
    }
}

impl RemoteMemory for FakeMemory {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn read(&self, address: usize, buf: &mut [u8]) -> io::Result<usize> {
        self.reads.set(self.reads.get() + 1);
        if self.gone() {
            return Err(io::Error::from_raw_os_error(299));
        }
        let (start, len) = self.range(address, buf.len())?;
        buf[..len].copy_from_slice(&self.bytes.borrow()[start..start + len]);
        Ok(len)
    }

    fn write(&self, address: usize, data: &[u8]) -> io::Result<usize> {
        self.writes.set(self.writes.get() + 1);
        let writes_failing = self
            .fail_writes_after
            .get()
            .is_some_and(|n| self.writes.get() > n);
        if self.gone() || writes_failing {
            return Err(io::Error::from_raw_os_error(6));
        }
        let (start, len) = self.range(address, data.len())?;
        self.bytes.borrow_mut()[start..start + len].copy_from_slice(&data[..len]);
        self.written.borrow_mut().push(data[..len].to_vec());
        Ok(len)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct FakeModule {
    pub id: ModuleId,
    pub name: Option<String>,
    pub info: ModuleInfo,
}

#[derive(Debug)]
pub(crate) struct FakeProcess {
    pub pid: u32,
    pub image: Option<String>,
    pub modules: Vec<FakeModule>,
    pub memory: Rc<FakeMemory>,
}

impl FakeProcess {
    /// A process whose single module `name` is mapped at `base` with `image` as contents.
    pub fn with_image(pid: u32, name: &str, base: usize, image: &[u8]) -> Self {
        let memory = FakeMemory::new(pid, base, image.len());
        memory.poke(base, image);
        Self {
            pid,
            image: Some(format!(r"\Device\HarddiskVolume3\Games\{name}")),
            modules: vec![
                FakeModule {
                    id: 0x7ff0_0000,
                    name: Some("ntdll.dll".into()),
                    info: ModuleInfo {
                        base: 0x7ff0_0000,
                        size: 0x1000,
                    },
                },
                FakeModule {
                    id: base,
                    name: Some(name.into()),
                    info: ModuleInfo {
                        base,
                        size: image.len(),
                    },
                },
            ],
            memory: Rc::new(memory),
        }
    }
}

/// An open fake process. Counts closes so tests can check handle hygiene.
#[derive(Debug)]
pub(crate) struct FakeHandle {
    memory: Rc<FakeMemory>,
    closed: Rc<Cell<usize>>,
}

impl Drop for FakeHandle {
    fn drop(&mut self) {
        self.closed.set(self.closed.get() + 1);
    }
}

impl RemoteMemory for FakeHandle {
    fn pid(&self) -> u32 {
        self.memory.pid()
    }

    fn read(&self, address: usize, buf: &mut [u8]) -> io::Result<usize> {
        self.memory.read(address, buf)
    }

    fn write(&self, address: usize, data: &[u8]) -> io::Result<usize> {
        self.memory.write(address, data)
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeApi {
    pub processes: Vec<FakeProcess>,
    /// PIDs that show up in enumeration but can't be opened.
    pub denied: Vec<u32>,
    pub enum_fails: bool,
    pub enum_calls: Cell<usize>,
    pub module_enum_calls: Cell<usize>,
    pub opened: Cell<usize>,
    pub closed: Rc<Cell<usize>>,
}

impl FakeApi {
    fn process(&self, handle: &FakeHandle) -> io::Result<&FakeProcess> {
        self.processes
            .iter()
            .find(|p| p.pid == handle.pid())
            .ok_or_else(|| io::Error::from_raw_os_error(87))
    }
}

impl ProcessApi for FakeApi {
    type Handle = FakeHandle;

    fn enum_pids(&self, pids: &mut [u32]) -> io::Result<usize> {
        self.enum_calls.set(self.enum_calls.get() + 1);
        if self.enum_fails {
            return Err(io::Error::from_raw_os_error(5));
        }
        let all = self
            .denied
            .iter()
            .copied()
            .chain(self.processes.iter().map(|p| p.pid));
        let mut n = 0;
        for (slot, pid) in pids.iter_mut().zip(all) {
            *slot = pid;
            n += 1;
        }
        Ok(n)
    }

    fn open(&self, pid: u32) -> Option<FakeHandle> {
        let process = self.processes.iter().find(|p| p.pid == pid)?;
        self.opened.set(self.opened.get() + 1);
        Some(FakeHandle {
            memory: process.memory.clone(),
            closed: self.closed.clone(),
        })
    }

    fn image_file_name(&self, process: &FakeHandle) -> io::Result<String> {
        self.process(process)?
            .image
            .clone()
            .ok_or_else(|| io::Error::from_raw_os_error(31))
    }

    fn enum_modules(&self, process: &FakeHandle, modules: &mut [ModuleId]) -> io::Result<usize> {
        self.module_enum_calls.set(self.module_enum_calls.get() + 1);
        let all = &self.process(process)?.modules;
        for (slot, module) in modules.iter_mut().zip(all) {
            *slot = module.id;
        }
        Ok(all.len())
    }

    fn module_base_name(&self, process: &FakeHandle, module: ModuleId) -> io::Result<String> {
        self.process(process)?
            .modules
            .iter()
            .find(|m| m.id == module)
            .and_then(|m| m.name.clone())
            .ok_or_else(|| io::Error::from_raw_os_error(126))
    }

    fn module_info(&self, process: &FakeHandle, module: ModuleId) -> io::Result<ModuleInfo> {
        self.process(process)?
            .modules
            .iter()
            .find(|m| m.id == module)
            .map(|m| m.info)
            .ok_or_else(|| io::Error::from_raw_os_error(126))
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct FakePad {
    pub state: PadState,
    /// `None` makes the capability query fail.
    pub caps: Option<PadCapabilities>,
    /// `None` makes the battery query fail.
    pub battery: Option<BatteryInfo>,
    /// Makes the state query fail with an OS error.
    pub state_error: bool,
    /// Makes `set_vibration` fail with an OS error.
    pub vibration_error: bool,
}

impl FakePad {
    pub fn new(caps: PadCapabilities, battery: BatteryInfo) -> Self {
        Self {
            state: PadState {
                packet_number: 1,
                input: PadInput::default(),
            },
            caps: Some(caps),
            battery: Some(battery),
            state_error: false,
            vibration_error: false,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeGamepads {
    pub pads: [Option<FakePad>; MAX_SLOTS],
    pub state_queries: [usize; MAX_SLOTS],
    pub caps_queries: [usize; MAX_SLOTS],
    pub battery_queries: [usize; MAX_SLOTS],
    pub vibrations: Vec<(usize, Vibration)>,
}

impl FakeGamepads {
    /// Report new input on `slot`, bumping its packet number.
    pub fn press(&mut self, slot: usize, input: PadInput) {
        if let Some(pad) = self.pads[slot].as_mut() {
            pad.state.packet_number += 1;
            pad.state.input = input;
        }
    }
}

impl Gamepads for FakeGamepads {
    fn state(&mut self, slot: usize) -> Result<Option<PadState>, DeviceError> {
        self.state_queries[slot] += 1;
        match self.pads[slot] {
            Some(pad) if pad.state_error => Err(DeviceError::Os(io::Error::from_raw_os_error(5))),
            pad => Ok(pad.map(|p| p.state)),
        }
    }

    fn capabilities(&mut self, slot: usize) -> Result<PadCapabilities, DeviceError> {
        self.caps_queries[slot] += 1;
        let pad = self.pads[slot].ok_or(DeviceError::NotConnected)?;
        pad.caps
            .ok_or_else(|| DeviceError::Os(io::Error::from_raw_os_error(1167)))
    }

    fn battery(&mut self, slot: usize) -> Result<BatteryInfo, DeviceError> {
        self.battery_queries[slot] += 1;
        let pad = self.pads[slot].ok_or(DeviceError::NotConnected)?;
        pad.battery
            .ok_or_else(|| DeviceError::Os(io::Error::from_raw_os_error(1167)))
    }

    fn set_vibration(&mut self, slot: usize, vibration: Vibration) -> Result<(), DeviceError> {
        let pad = self.pads[slot].ok_or(DeviceError::NotConnected)?;
        if pad.vibration_error {
            return Err(DeviceError::Os(io::Error::from_raw_os_error(5)));
        }
        self.vibrations.push((slot, vibration));
        Ok(())
    }
}

/// Ticker that never sleeps. Counts waits.
#[derive(Debug, Default)]
pub(crate) struct FakeTicker {
    pub waits: Rc<Cell<usize>>,
    /// Panic once the shared wait count goes past this, to break out of loops
    /// that never return.
    pub stop_after: Option<usize>,
}

/// Panic payload used by [`FakeTicker::stop_after`].
pub(crate) const STOP: &str = "fake ticker stopped the loop";

impl Ticker for FakeTicker {
    fn wait(&mut self) -> Result<()> {
        self.waits.set(self.waits.get() + 1);
        if self.stop_after.is_some_and(|n| self.waits.get() > n) {
            std::panic::panic_any(STOP);
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeTickers {
    /// Periods of every timer successfully created, in order.
    pub periods: RefCell<Vec<Duration>>,
    pub waits: Rc<Cell<usize>>,
    /// Every `periodic` call fails.
    pub fail: bool,
    /// Zero-based indices of `periodic` calls that fail.
    pub fail_calls: Vec<usize>,
    pub calls: Cell<usize>,
    pub stop_after: Option<usize>,
}

impl TickerFactory for FakeTickers {
    type Ticker = FakeTicker;

    fn periodic(&self, period: Duration) -> Result<FakeTicker> {
        let call = self.calls.get();
        self.calls.set(call + 1);
        if self.fail || self.fail_calls.contains(&call) {
            return Err(Error::Timer(io::Error::from_raw_os_error(8)));
        }
        self.periods.borrow_mut().push(period);
        Ok(FakeTicker {
            waits: self.waits.clone(),
            stop_after: self.stop_after,
        })
    }
}
