//! Locating the shared region by its magic signature.

use memchr::memmem;
use tracing::debug;

use crate::error::{Error, Result};
use crate::layout::{MAGIC, MAGIC_OFFSET};
use crate::process::{ModuleInfo, RemoteMemory};

/// Offset of the first occurrence of [`MAGIC`] in `image`.
pub fn find_magic(image: &[u8]) -> Option<usize> {
    memmem::find(image, &MAGIC)
}

/// Copy `module`'s whole image out of the target and find the shared region.
///
/// Returns the region's address in the target's address space. A short copy
/// fails the whole scan rather than searching a partial image.
pub fn find_shared_region<M: RemoteMemory>(memory: &M, module: ModuleInfo) -> Result<usize> {
    let mut image = vec![0u8; module.size];
    let actual = memory
        .read(module.base, &mut image)
        .map_err(|e| Error::os("ReadProcessMemory (module image)", e))?;
    if actual < module.size {
        return Err(Error::ShortRead {
            address: module.base,
            expected: module.size,
            actual,
        });
    }

    let offset = find_magic(&image).ok_or(Error::MagicNotFound { pid: memory.pid() })?;
    debug!("found Pinput magic at image offset {offset:#x}");

    module
        .base
        .checked_add(offset)
        .and_then(|magic| magic.checked_sub(MAGIC_OFFSET))
        .ok_or(Error::MagicNotFound { pid: memory.pid() })
}
