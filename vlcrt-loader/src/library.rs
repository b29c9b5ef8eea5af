//! Library identities and path resolution
//!
//! Each library resolves to exactly one path. There is no fallback search:
//! a library that is not where the chosen [`LibrarySearch`] strategy says it
//! is fails the load.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::platform::{Platform, PlatformInfo};

/// The two native libraries making up the LibVLC runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryKind {
    /// `libvlccore`, exports the symbols `libvlc` links against
    Core,
    /// `libvlc`, the public runtime API
    Main,
}

impl LibraryKind {
    /// Dependency first: `libvlc` cannot resolve its imports otherwise
    pub const LOAD_ORDER: [LibraryKind; 2] = [LibraryKind::Core, LibraryKind::Main];

    /// File name without extension
    pub const fn stem(self) -> &'static str {
        match self {
            LibraryKind::Core => "libvlccore",
            LibraryKind::Main => "libvlc",
        }
    }

    /// Platform file name, e.g. `libvlc.dll` or `libvlccore.dylib`
    pub fn file_name(self, platform: Platform) -> String {
        match platform.library_extension() {
            Some(ext) => format!("{}.{}", self.stem(), ext),
            None => self.stem().to_string(),
        }
    }
}

impl std::fmt::Display for LibraryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.stem())
    }
}

/// Where the native libraries are expected to live
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum LibrarySearch {
    /// Explicit directory holding both libraries
    Directory(PathBuf),
    /// Package layout next to the running executable
    /// (`libvlc/win-x64` on Windows, `lib` elsewhere)
    ApplicationRelative,
    /// Bare file name handed to the OS loader, which walks its own search path
    SystemDefault,
}

impl LibrarySearch {
    /// Compiled default for a platform
    ///
    /// Windows and macOS applications ship LibVLC inside their package;
    /// Linux distributions install it system-wide.
    pub fn default_for(info: &PlatformInfo) -> Self {
        match info.platform {
            Platform::Windows | Platform::MacOs => LibrarySearch::ApplicationRelative,
            Platform::Linux | Platform::Unknown => LibrarySearch::SystemDefault,
        }
    }

    /// Resolve the single path `kind` will be loaded from
    pub fn resolve(&self, kind: LibraryKind, info: &PlatformInfo) -> Result<ResolvedLibrary> {
        let file_name = kind.file_name(info.platform);
        let resolved = match self {
            LibrarySearch::Directory(dir) => ResolvedLibrary {
                kind,
                path: dir.join(file_name),
                check_exists: true,
            },
            LibrarySearch::ApplicationRelative => ResolvedLibrary {
                kind,
                path: application_directory(info)?.join(file_name),
                check_exists: true,
            },
            LibrarySearch::SystemDefault => ResolvedLibrary {
                kind,
                path: PathBuf::from(file_name),
                check_exists: false,
            },
        };
        Ok(resolved)
    }

    /// Resolve both libraries in load order
    pub fn resolve_all(&self, info: &PlatformInfo) -> Result<Vec<ResolvedLibrary>> {
        LibraryKind::LOAD_ORDER
            .iter()
            .map(|kind| self.resolve(*kind, info))
            .collect()
    }
}

impl std::fmt::Display for LibrarySearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LibrarySearch::Directory(dir) => write!(f, "directory {}", dir.display()),
            LibrarySearch::ApplicationRelative => f.write_str("application-relative"),
            LibrarySearch::SystemDefault => f.write_str("system default search path"),
        }
    }
}

/// Outcome of path resolution for one library
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLibrary {
    pub kind: LibraryKind,
    pub path: PathBuf,
    /// False for bare names, where only the OS loader knows where to look
    pub check_exists: bool,
}

/// Package subdirectory, relative to the executable, holding bundled LibVLC
pub fn bundle_subdirectory(info: &PlatformInfo) -> PathBuf {
    match info.platform {
        Platform::Windows => Path::new("libvlc").join(info.windows_rid()),
        Platform::Linux | Platform::MacOs => PathBuf::from("lib"),
        Platform::Unknown => PathBuf::new(),
    }
}

/// Directory of bundled LibVLC for the running executable
pub fn application_directory(info: &PlatformInfo) -> Result<PathBuf> {
    let exe = std::env::current_exe()
        .map_err(|e| Error::Config(format!("Cannot determine application directory: {}", e)))?;
    let exe_dir = exe.parent().ok_or_else(|| {
        Error::Config(format!("Executable path has no parent: {}", exe.display()))
    })?;
    Ok(exe_dir.join(bundle_subdirectory(info)))
}
