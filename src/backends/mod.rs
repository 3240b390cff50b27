//! Platform backends for the core traits.
//!
//! Only Windows has a live backend. Elsewhere the crate still builds and the
//! core logic runs against in-memory fakes in tests.

#[cfg(target_os = "windows")]
#[cfg_attr(docsrs, doc(cfg(target_os = "windows")))]
pub mod windows;
