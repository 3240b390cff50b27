//! Bounded reads and writes of the shared region in the target process.
//!
//! Every call is exactly one bulk remote transfer of [`REGION_SIZE`] bytes. A
//! short transfer is treated like an outright failure: both mean the target is
//! no longer readable or writable, usually because it exited. There are no
//! retries here.

use crate::error::{Error, Result};
use crate::layout::{RegionRecord, REGION_SIZE};
use crate::process::RemoteMemory;

/// The region at a fixed address inside one target process.
#[derive(Debug)]
pub struct SharedRegion<'a, M: RemoteMemory> {
    memory: &'a M,
    address: usize,
}

impl<'a, M: RemoteMemory> SharedRegion<'a, M> {
    pub fn new(memory: &'a M, address: usize) -> Self {
        Self { memory, address }
    }

    #[inline]
    pub fn address(&self) -> usize {
        self.address
    }

    pub fn read(&self) -> Result<[u8; REGION_SIZE]> {
        let mut buf = [0u8; REGION_SIZE];
        let actual = self
            .memory
            .read(self.address, &mut buf)
            .map_err(|e| Error::os("ReadProcessMemory", e))?;
        if actual < REGION_SIZE {
            return Err(Error::ShortRead {
                address: self.address,
                expected: REGION_SIZE,
                actual,
            });
        }
        Ok(buf)
    }

    pub fn write(&self, bytes: &[u8; REGION_SIZE]) -> Result<()> {
        let actual = self
            .memory
            .write(self.address, bytes)
            .map_err(|e| Error::os("WriteProcessMemory", e))?;
        if actual < REGION_SIZE {
            return Err(Error::ShortWrite {
                address: self.address,
                expected: REGION_SIZE,
                actual,
            });
        }
        Ok(())
    }

    /// Zero the whole region.
    pub fn init(&self) -> Result<()> {
        self.write(&[0u8; REGION_SIZE])
    }

    pub fn read_record(&self) -> Result<RegionRecord> {
        self.read().map(|bytes| RegionRecord::decode(&bytes))
    }

    pub fn write_record(&self, record: &RegionRecord) -> Result<()> {
        self.write(&record.encode())
    }
}
