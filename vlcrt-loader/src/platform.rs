//! Host platform detection
//!
//! Pure queries answered from the compile target. Nothing here performs I/O
//! or can fail: an OS family we do not recognize is reported as
//! [`Platform::Unknown`] and every `is_*` flag is `false` for it.

use serde::Serialize;

/// Operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
    Unknown,
}

impl Platform {
    /// Platform of the running process
    pub const fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Unknown
        }
    }

    /// Shared library file extension, without the dot
    pub const fn library_extension(self) -> Option<&'static str> {
        match self {
            Platform::Windows => Some("dll"),
            Platform::Linux => Some("so"),
            Platform::MacOs => Some("dylib"),
            Platform::Unknown => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::MacOs => "macos",
            Platform::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the host identifiers the loader cares about
///
/// Derived on demand, never stored globally. Constructible for any
/// combination so naming rules can be exercised off-platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlatformInfo {
    pub platform: Platform,
    pub is_64_bit: bool,
}

impl PlatformInfo {
    pub const fn new(platform: Platform, is_64_bit: bool) -> Self {
        Self {
            platform,
            is_64_bit,
        }
    }

    /// Identifiers of the running process
    pub const fn current() -> Self {
        Self::new(Platform::current(), cfg!(target_pointer_width = "64"))
    }

    pub fn is_windows(&self) -> bool {
        self.platform == Platform::Windows
    }

    pub fn is_linux(&self) -> bool {
        self.platform == Platform::Linux
    }

    pub fn is_mac(&self) -> bool {
        self.platform == Platform::MacOs
    }

    /// Windows runtime identifier used by the LibVLC package layout
    /// (`libvlc/win-x64`, `libvlc/win-x86`)
    pub fn windows_rid(&self) -> &'static str {
        if self.is_64_bit {
            "win-x64"
        } else {
            "win-x86"
        }
    }
}

/// Returns true if running on Windows, false otherwise
pub fn is_windows() -> bool {
    PlatformInfo::current().is_windows()
}

/// Returns true if running on Linux, false otherwise
pub fn is_linux() -> bool {
    PlatformInfo::current().is_linux()
}

/// Returns true if running on Linux desktop, false otherwise
///
/// Android reports its own target OS, so every Linux target counts.
pub fn is_linux_desktop() -> bool {
    is_linux()
}

/// Returns true if running on macOS, false otherwise
pub fn is_mac() -> bool {
    PlatformInfo::current().is_mac()
}

/// Returns true if running in a 64-bit process, false otherwise
pub fn is_x64_bit_process() -> bool {
    PlatformInfo::current().is_64_bit
}
