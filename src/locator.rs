//! Finding the target process and its main module.
//!
//! Both lookups match names against the same [`NamePattern`]. Opening unrelated
//! processes routinely fails for lack of privilege; those PIDs are skipped
//! without a word. Retrying is the supervisor's job, not ours.

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::pattern::NamePattern;
use crate::process::{ModuleId, ModuleInfo, ProcessApi, RemoteMemory};

/// Initial PID buffer capacity. Doubles until the OS returns fewer entries.
const INITIAL_PID_CAPACITY: usize = 1024;

/// List every process ID visible to the caller.
///
/// The OS fills at most the buffer it is given and gives no hint about the real
/// count, so a completely full buffer means "maybe truncated": grow and ask again.
pub fn list_pids<P: ProcessApi>(api: &P) -> Result<Vec<u32>> {
    let mut pids = vec![0u32; INITIAL_PID_CAPACITY];
    loop {
        let returned = api
            .enum_pids(&mut pids)
            .map_err(|e| Error::os("EnumProcesses", e))?;
        if returned < pids.len() {
            pids.truncate(returned);
            return Ok(pids);
        }
        let grown = pids.len() * 2;
        debug!(capacity = grown, "process list filled the buffer, growing");
        pids.clear();
        pids.resize(grown, 0);
    }
}

/// Open the first process whose executable name matches `pattern`.
///
/// Every other handle opened along the way is closed before returning.
pub fn find_target<P: ProcessApi>(api: &P, pattern: &NamePattern) -> Result<P::Handle> {
    let pids = list_pids(api)?;
    if pids.is_empty() {
        // Only plausible inside a sandbox.
        return Err(Error::NoProcesses);
    }

    for pid in pids {
        let Some(handle) = api.open(pid) else {
            continue;
        };
        match api.image_file_name(&handle) {
            Ok(path) if pattern.matches_path(&path) => {
                debug!(pid, path = %path, "matched target process");
                return Ok(handle);
            }
            Ok(_) => {}
            Err(e) => warn!(pid, "GetProcessImageFileName failed: {e}"),
        }
    }

    Err(Error::ProcessNotFound {
        pattern: pattern.to_string(),
    })
}

/// List the modules loaded in `process`.
///
/// The first call only sizes the list. Modules can load or unload between the
/// two calls, so only entries the second call actually filled are kept.
pub fn list_modules<P: ProcessApi>(api: &P, process: &P::Handle) -> Result<Vec<ModuleId>> {
    let needed = api
        .enum_modules(process, &mut [])
        .map_err(|e| Error::os("EnumProcessModulesEx (no module array)", e))?;

    let mut modules = vec![0 as ModuleId; needed];
    let filled = api
        .enum_modules(process, &mut modules)
        .map_err(|e| Error::os("EnumProcessModulesEx (with module array)", e))?;
    modules.truncate(filled.min(needed));
    Ok(modules)
}

/// Base address and image size of the module in `process` matching `pattern`.
pub fn find_module<P: ProcessApi>(
    api: &P,
    process: &P::Handle,
    pattern: &NamePattern,
) -> Result<ModuleInfo> {
    for module in list_modules(api, process)? {
        // Unnamed modules can't be the one we want.
        let Ok(name) = api.module_base_name(process, module) else {
            continue;
        };
        if pattern.matches(&name) {
            return api
                .module_info(process, module)
                .map_err(|e| Error::os("GetModuleInformation", e));
        }
    }

    Err(Error::ModuleNotFound {
        pid: process.pid(),
        pattern: pattern.to_string(),
    })
}
