//! Error types.
//!
//! [`Error`] covers acquisition and remote-memory failures; every variant is
//! handled by the layer that observes it and nothing escapes the supervisor
//! except timer creation failure. [`DeviceError`] is the local controller
//! family, which is never fatal.

use std::io;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An OS call failed. `op` names the call for diagnostics.
    #[error("{op} failed: {source}")]
    Os {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("couldn't list any processes")]
    NoProcesses,

    #[error("no running process matches `{pattern}`")]
    ProcessNotFound { pattern: String },

    #[error("no module matching `{pattern}` in process (PID {pid})")]
    ModuleNotFound { pid: u32, pattern: String },

    #[error("Pinput magic bytes not found in process (PID {pid})")]
    MagicNotFound { pid: u32 },

    #[error("short read at {address:#x}: expected {expected} bytes, read {actual}")]
    ShortRead {
        address: usize,
        expected: usize,
        actual: usize,
    },

    #[error("short write at {address:#x}: expected {expected} bytes, wrote {actual}")]
    ShortWrite {
        address: usize,
        expected: usize,
        actual: usize,
    },

    #[error("periodic timer error: {0}")]
    Timer(#[source] io::Error),

    #[error("couldn't read config file {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("this platform has no process backend")]
    Unsupported,
}

impl Error {
    pub(crate) fn os(op: &'static str, source: io::Error) -> Self {
        Error::Os { op, source }
    }

    /// `true` for the expected "nothing to attach to yet" family.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::ProcessNotFound { .. }
                | Error::ModuleNotFound { .. }
                | Error::MagicNotFound { .. }
        )
    }
}

/// Failure of a local controller query. Never fatal to a tick.
#[derive(thiserror::Error, Debug)]
pub enum DeviceError {
    #[error("controller not connected")]
    NotConnected,

    #[error("controller query failed: {0}")]
    Os(#[from] io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
