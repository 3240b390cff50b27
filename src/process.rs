//! Process and module enumeration interface.
//!
//! The core never calls the OS directly. [`ProcessApi`] is the thin seam the
//! locator and scanner need; the Win32 implementation lives in
//! `backends::windows::process`. Handles close themselves on `Drop`.

use std::io;

/// Base address and image size of a loaded module in a foreign process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModuleInfo {
    pub base: usize,
    pub size: usize,
}

/// Opaque module identifier (an `HMODULE` on Windows).
pub type ModuleId = usize;

/// Bulk access to another process's address space.
///
/// Both calls report how many bytes were actually transferred; callers decide
/// whether a short transfer is acceptable.
pub trait RemoteMemory {
    fn pid(&self) -> u32;

    fn read(&self, address: usize, buf: &mut [u8]) -> io::Result<usize>;

    fn write(&self, address: usize, data: &[u8]) -> io::Result<usize>;
}

/// Process/module enumeration primitives.
pub trait ProcessApi {
    /// An open process handle with query and VM read/write rights.
    type Handle: RemoteMemory;

    /// Fill `pids` with visible process IDs and return how many were written.
    /// A return equal to `pids.len()` means the list may have been truncated.
    fn enum_pids(&self, pids: &mut [u32]) -> io::Result<usize>;

    /// Open a process. `None` means access was refused, which is normal for
    /// system processes and is not reported.
    fn open(&self, pid: u32) -> Option<Self::Handle>;

    /// Full image path of the process executable.
    fn image_file_name(&self, process: &Self::Handle) -> io::Result<String>;

    /// Fill `modules` and return the number of modules the process has, which
    /// may exceed `modules.len()`. An empty slice just asks for the count.
    fn enum_modules(&self, process: &Self::Handle, modules: &mut [ModuleId]) -> io::Result<usize>;

    fn module_base_name(&self, process: &Self::Handle, module: ModuleId) -> io::Result<String>;

    fn module_info(&self, process: &Self::Handle, module: ModuleId) -> io::Result<ModuleInfo>;
}
