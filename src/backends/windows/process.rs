//! Process enumeration and foreign memory access via psapi.
//!
//! Uses the `K32*` exports from kernel32 so no separate psapi.dll import is
//! needed. Process handles are opened with query rights plus VM read, write
//! and operation, and closed on `Drop`.

use std::ffi::c_void;
use std::io;
use std::mem::size_of;

use windows_sys::Win32::Foundation::{CloseHandle, FALSE, HANDLE, HMODULE};
use windows_sys::Win32::System::Diagnostics::Debug::{ReadProcessMemory, WriteProcessMemory};
use windows_sys::Win32::System::ProcessStatus::{
    K32EnumProcessModulesEx, K32EnumProcesses, K32GetModuleBaseNameW, K32GetModuleInformation,
    K32GetProcessImageFileNameW, LIST_MODULES_ALL, MODULEINFO,
};
use windows_sys::Win32::System::Threading::{
    OpenProcess, PROCESS_QUERY_INFORMATION, PROCESS_VM_OPERATION, PROCESS_VM_READ,
    PROCESS_VM_WRITE,
};

use crate::process::{ModuleId, ModuleInfo, ProcessApi, RemoteMemory};

/// Long enough for NT device paths, which can exceed `MAX_PATH`.
const NAME_CAPACITY: usize = 1024;

/// Owned process handle, opened with query and VM read/write/operation rights.
///
/// Reads and writes go straight through `ReadProcessMemory` and
/// `WriteProcessMemory`. When the OS copies part of a range before failing
/// (`ERROR_PARTIAL_COPY`), the partial count is returned so callers see a
/// short transfer rather than a bare error. `CloseHandle` runs on drop.
#[derive(Debug)]
pub struct Win32Process {
    handle: HANDLE,
    pid: u32,
}

impl Drop for Win32Process {
    fn drop(&mut self) {
        unsafe {
            if !self.handle.is_null() {
                CloseHandle(self.handle);
                self.handle = std::ptr::null_mut();
            }
        }
    }
}

impl RemoteMemory for Win32Process {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn read(&self, address: usize, buf: &mut [u8]) -> io::Result<usize> {
        let mut read = 0usize;
        let ok = unsafe {
            ReadProcessMemory(
                self.handle,
                address as *const c_void,
                buf.as_mut_ptr().cast(),
                buf.len(),
                &mut read,
            )
        };
        // A partial copy fails the call but still reports what was copied.
        if ok == FALSE && read == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(read)
    }

    fn write(&self, address: usize, data: &[u8]) -> io::Result<usize> {
        let mut written = 0usize;
        let ok = unsafe {
            WriteProcessMemory(
                self.handle,
                address as *const c_void,
                data.as_ptr().cast(),
                data.len(),
                &mut written,
            )
        };
        if ok == FALSE && written == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(written)
    }
}

/// Decode a UTF-16 name of `len` units; a length of 0 means the call failed.
fn utf16_name(buf: &[u16], len: u32) -> io::Result<String> {
    if len == 0 {
        return Err(io::Error::last_os_error());
    }
    let len = (len as usize).min(buf.len());
    Ok(String::from_utf16_lossy(&buf[..len]))
}

/// The live process table, as seen by the calling user.
///
/// Processes owned by other users or protected by the system fail to open;
/// [`ProcessApi::open`] reports those as `None` and the locator skips them.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Processes;

impl Win32Processes {
    /// Stateless; every call goes to the OS.
    pub fn new() -> Self {
        Self
    }
}

impl ProcessApi for Win32Processes {
    type Handle = Win32Process;

    /// `K32EnumProcesses`. Returns how many PIDs were written into `pids`.
    fn enum_pids(&self, pids: &mut [u32]) -> io::Result<usize> {
        let mut needed = 0u32;
        let ok = unsafe {
            K32EnumProcesses(
                pids.as_mut_ptr(),
                (pids.len() * size_of::<u32>()) as u32,
                &mut needed,
            )
        };
        if ok == FALSE {
            return Err(io::Error::last_os_error());
        }
        Ok(needed as usize / size_of::<u32>())
    }

    fn open(&self, pid: u32) -> Option<Win32Process> {
        let access =
            PROCESS_QUERY_INFORMATION | PROCESS_VM_READ | PROCESS_VM_WRITE | PROCESS_VM_OPERATION;
        let handle = unsafe { OpenProcess(access, FALSE, pid) };
        if handle.is_null() {
            return None;
        }
        Some(Win32Process { handle, pid })
    }

    /// NT device path of the executable, e.g.
    /// `\\Device\\HarddiskVolume3\\PICO-8\\pico8.exe`.
    fn image_file_name(&self, process: &Win32Process) -> io::Result<String> {
        let mut buf = [0u16; NAME_CAPACITY];
        let len = unsafe {
            K32GetProcessImageFileNameW(process.handle, buf.as_mut_ptr(), buf.len() as u32)
        };
        utf16_name(&buf, len)
    }

    /// `K32EnumProcessModulesEx` over 32- and 64-bit modules alike. Returns
    /// the number of modules the process has, which may exceed `modules.len()`.
    fn enum_modules(&self, process: &Win32Process, modules: &mut [ModuleId]) -> io::Result<usize> {
        let mut needed = 0u32;
        let ok = unsafe {
            K32EnumProcessModulesEx(
                process.handle,
                modules.as_mut_ptr().cast::<HMODULE>(),
                (modules.len() * size_of::<HMODULE>()) as u32,
                &mut needed,
                LIST_MODULES_ALL,
            )
        };
        if ok == FALSE {
            return Err(io::Error::last_os_error());
        }
        Ok(needed as usize / size_of::<HMODULE>())
    }

    fn module_base_name(&self, process: &Win32Process, module: ModuleId) -> io::Result<String> {
        let mut buf = [0u16; NAME_CAPACITY];
        let len = unsafe {
            K32GetModuleBaseNameW(
                process.handle,
                module as HMODULE,
                buf.as_mut_ptr(),
                buf.len() as u32,
            )
        };
        utf16_name(&buf, len)
    }

    fn module_info(&self, process: &Win32Process, module: ModuleId) -> io::Result<ModuleInfo> {
        let mut info: MODULEINFO = unsafe { std::mem::zeroed() };
        let ok = unsafe {
            K32GetModuleInformation(
                process.handle,
                module as HMODULE,
                &mut info,
                size_of::<MODULEINFO>() as u32,
            )
        };
        if ok == FALSE {
            return Err(io::Error::last_os_error());
        }
        Ok(ModuleInfo {
            base: info.lpBaseOfDll as usize,
            size: info.SizeOfImage as usize,
        })
    }
}
