//! # vlcrt loader
//!
//! Locates, loads and version-checks the native LibVLC runtime before any
//! binding call is made:
//! - Platform detection (OS family, process bitness)
//! - Library naming and path resolution
//! - Dynamic-loading backends (`LoadLibraryExW`, `dlopen`)
//! - Load sequencing (`libvlccore` then `libvlc`)
//! - Major version check between LibVLC and this binding
//!
//! Collaborators call [`ensure_loaded`] once during initialization:
//!
//! ```no_run
//! vlcrt_loader::ensure_loaded()?;
//! vlcrt_loader::ensure_versions_match()?;
//! # Ok::<(), vlcrt_loader::Error>(())
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod library;
pub mod loader;
pub mod platform;
pub mod version;

pub use error::{Error, Result};
pub use library::{LibraryKind, LibrarySearch};
pub use loader::{
    ensure_loaded, ensure_versions_match, global, install_global, is_loaded, LoadPhase, Loader,
};
pub use platform::{is_linux, is_linux_desktop, is_mac, is_windows, is_x64_bit_process};
pub use version::{VersionCheck, VersionCheckMode};
