//! LibVLC / binding major version check
//!
//! The binding's data layouts and function signatures are generated against
//! one LibVLC major version, so the loaded library must report the same
//! major version as this crate's own package version.

use serde::{Deserialize, Serialize};
use std::ffi::{c_char, CStr};
use tracing::{debug, info};

use crate::backend::NativeLibrary;
use crate::error::{Error, Result};
use crate::platform::{Platform, PlatformInfo};

/// Export returning the LibVLC version string, e.g. `"4.0.5 Otto"`
pub const VERSION_SYMBOL: &str = "libvlc_get_version";

type GetVersionFn = unsafe extern "C" fn() -> *const c_char;

/// Whether the native version can be queried on this target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionCheckMode {
    Enabled,
    /// Restricted environment: `ensure_versions_match` reports `Skipped`
    Disabled,
}

impl VersionCheckMode {
    /// Capability of a platform without any configuration applied
    pub fn default_for(info: &PlatformInfo) -> Self {
        match info.platform {
            Platform::Windows | Platform::Linux | Platform::MacOs => VersionCheckMode::Enabled,
            Platform::Unknown => VersionCheckMode::Disabled,
        }
    }

    pub fn from_bool(enabled: bool) -> Self {
        if enabled {
            VersionCheckMode::Enabled
        } else {
            VersionCheckMode::Disabled
        }
    }

    pub fn is_enabled(self) -> bool {
        self == VersionCheckMode::Enabled
    }
}

/// Result of a successful version check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum VersionCheck {
    /// Native and binding major versions agree
    Matched { native_version: String, major: u32 },
    /// The check is unavailable on this target and was not performed
    Skipped,
}

/// Major version of this binding crate, from its package metadata
pub fn binding_major_version() -> u32 {
    env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap_or(0)
}

/// Leading component of a dotted version string
///
/// `"4.0.6 Otto"` gives 4. Empty or non-numeric input gives 0.
pub fn parse_major_version(version: &str) -> u32 {
    version
        .split('.')
        .next()
        .map(str::trim)
        .and_then(|major| major.parse().ok())
        .unwrap_or(0)
}

/// Compare a native version string against the binding's major version
///
/// Returns the shared major version on success.
pub fn check_major_versions(native_version: &str, binding_major: u32) -> Result<u32> {
    let native = parse_major_version(native_version);
    if native != binding_major {
        return Err(Error::VersionMismatch {
            native,
            binding: binding_major,
        });
    }
    debug!(
        "LibVLC {} matches binding major version {}",
        native_version, binding_major
    );
    Ok(native)
}

/// Read the version string exported by a loaded `libvlc`
pub fn query_native_version(library: &dyn NativeLibrary) -> Result<String> {
    let address = library.symbol(VERSION_SYMBOL)?;
    if address.is_null() {
        return Err(Error::SymbolNotFound {
            symbol: VERSION_SYMBOL.to_string(),
            reason: "null address".to_string(),
        });
    }

    // SAFETY: `libvlc_get_version` is declared `const char *(void)` in
    // libvlc.h and returns a pointer to a static, null-terminated string.
    // `address` is non-null and the library stays mapped for this call.
    let version = unsafe {
        let get_version: GetVersionFn = std::mem::transmute(address);
        let raw = get_version();
        if raw.is_null() {
            String::new()
        } else {
            CStr::from_ptr(raw).to_string_lossy().into_owned()
        }
    };

    info!("LibVLC reports version {:?}", version);
    Ok(version)
}
