//! Dynamic-loading backends
//!
//! The loader only needs two capabilities from the OS: open a library by
//! path and look up an exported symbol. [`Backend`] and [`NativeLibrary`]
//! capture exactly that, with one implementation per loader family:
//! - [`WindowsBackend`]: `LoadLibraryExW`
//! - [`PosixBackend`]: `dlopen` with `RTLD_NOW | RTLD_GLOBAL`

use std::ffi::c_void;
use std::path::Path;

use crate::error::{Error, Result};
use crate::platform::{Platform, PlatformInfo};

/// A library the OS has mapped into the process
///
/// Dropping the value releases the OS handle.
pub trait NativeLibrary: Send + Sync {
    /// Path the library was opened from
    fn path(&self) -> &Path;

    /// Address of an exported symbol
    ///
    /// Obtaining the address is safe; interpreting it is up to the caller.
    fn symbol(&self, name: &str) -> Result<*const c_void>;
}

/// One way of asking the OS to load a library
pub trait Backend: Send + Sync {
    /// Short name for diagnostics
    fn name(&self) -> &'static str;

    /// Load the library at `path`
    fn open(&self, path: &Path) -> anyhow::Result<Box<dyn NativeLibrary>>;
}

/// Backend for the running process, chosen from the platform detector
pub fn system_backend(info: &PlatformInfo) -> Result<Box<dyn Backend>> {
    match info.platform {
        #[cfg(windows)]
        Platform::Windows => Ok(Box::new(WindowsBackend)),
        #[cfg(unix)]
        Platform::Linux | Platform::MacOs | Platform::Unknown => Ok(Box::new(PosixBackend)),
        #[allow(unreachable_patterns)]
        other => Err(Error::UnsupportedPlatform(format!(
            "no dynamic library loader for {} in this build",
            other
        ))),
    }
}

/// Library opened through `libloading`
struct LoadedLibrary {
    path: std::path::PathBuf,
    library: libloading::Library,
}

impl NativeLibrary for LoadedLibrary {
    fn path(&self) -> &Path {
        &self.path
    }

    fn symbol(&self, name: &str) -> Result<*const c_void> {
        // SAFETY: the symbol is read as an untyped address and never called
        // here. The `Symbol` borrow ends before returning; the address stays
        // valid for as long as `self.library` is mapped.
        let address = unsafe {
            self.library
                .get::<*const c_void>(name.as_bytes())
                .map(|symbol| *symbol)
        };
        address.map_err(|e| Error::SymbolNotFound {
            symbol: name.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(windows)]
pub use self::windows::WindowsBackend;

#[cfg(unix)]
pub use self::posix::PosixBackend;

#[cfg(windows)]
mod windows {
    use super::{Backend, LoadedLibrary, NativeLibrary};
    use anyhow::Context;
    use libloading::os::windows::{Library, LOAD_WITH_ALTERED_SEARCH_PATH};
    use std::path::Path;

    /// `LoadLibraryExW`-based loader
    ///
    /// Absolute paths use `LOAD_WITH_ALTERED_SEARCH_PATH` so `libvlc.dll`
    /// finds `libvlccore.dll` and its plugins beside it. Bare names keep the
    /// standard search order, where that flag is undefined.
    pub struct WindowsBackend;

    impl Backend for WindowsBackend {
        fn name(&self) -> &'static str {
            "LoadLibraryExW"
        }

        fn open(&self, path: &Path) -> anyhow::Result<Box<dyn NativeLibrary>> {
            // SAFETY: loading runs the library's DllMain. LibVLC's
            // initializers have no preconditions on the host process.
            let library = unsafe {
                if path.is_absolute() {
                    Library::load_with_flags(path, LOAD_WITH_ALTERED_SEARCH_PATH)
                } else {
                    Library::new(path)
                }
            }
            .with_context(|| format!("LoadLibraryExW({}) failed", path.display()))?;

            Ok(Box::new(LoadedLibrary {
                path: path.to_path_buf(),
                library: library.into(),
            }))
        }
    }
}

#[cfg(unix)]
mod posix {
    use super::{Backend, LoadedLibrary, NativeLibrary};
    use anyhow::Context;
    use libloading::os::unix::{Library, RTLD_GLOBAL, RTLD_NOW};
    use std::path::Path;

    /// `dlopen`-based loader
    ///
    /// `RTLD_GLOBAL` publishes `libvlccore`'s symbols so `libvlc` can bind
    /// them when it is opened next.
    pub struct PosixBackend;

    impl Backend for PosixBackend {
        fn name(&self) -> &'static str {
            "dlopen"
        }

        fn open(&self, path: &Path) -> anyhow::Result<Box<dyn NativeLibrary>> {
            // SAFETY: dlopen runs the library's static constructors. LibVLC's
            // initializers have no preconditions on the host process.
            let library = unsafe { Library::open(Some(path), RTLD_NOW | RTLD_GLOBAL) }
                .with_context(|| format!("dlopen({}) failed", path.display()))?;

            Ok(Box::new(LoadedLibrary {
                path: path.to_path_buf(),
                library: library.into(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_backend_for_host() {
        let backend = system_backend(&PlatformInfo::current());

        #[cfg(unix)]
        assert_eq!(backend.unwrap().name(), "dlopen");

        #[cfg(windows)]
        assert_eq!(backend.unwrap().name(), "LoadLibraryExW");
    }

    #[cfg(unix)]
    #[test]
    fn test_no_windows_backend_on_unix() {
        let result = system_backend(&PlatformInfo::new(Platform::Windows, true));
        assert!(matches!(result, Err(Error::UnsupportedPlatform(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_open_missing_library_fails() {
        let result = PosixBackend.open(Path::new("/nonexistent/vlcrt/libvlc.so"));
        let err = result.err().expect("opening a missing file must fail");
        assert!(format!("{:#}", err).contains("dlopen"));
    }
}
