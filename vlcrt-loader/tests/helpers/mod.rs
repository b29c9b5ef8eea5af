//! Test helpers for loader integration tests
//!
//! Provides:
//! - RecordingBackend: in-memory backend that records every open attempt
//! - LibraryDir: temporary directory populated with placeholder library files

#![allow(dead_code)]

use std::ffi::{c_char, c_void};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use vlcrt_loader::backend::{Backend, NativeLibrary};
use vlcrt_loader::config::LoaderConfig;
use vlcrt_loader::library::LibrarySearch;
use vlcrt_loader::platform::{Platform, PlatformInfo};
use vlcrt_loader::version::{VersionCheckMode, VERSION_SYMBOL};
use vlcrt_loader::{Error, LibraryKind, Loader};

/// Platform every fake loader pretends to run on
pub const TEST_PLATFORM: PlatformInfo = PlatformInfo::new(Platform::Linux, true);

/// Version string the fake `libvlc` reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeVersion {
    Otto4,
    Vetinari3,
    Empty,
    Null,
}

extern "C" fn version_otto() -> *const c_char {
    b"4.0.5 Otto\0".as_ptr().cast()
}

extern "C" fn version_vetinari() -> *const c_char {
    b"3.0.20 Vetinari\0".as_ptr().cast()
}

extern "C" fn version_empty() -> *const c_char {
    b"\0".as_ptr().cast()
}

extern "C" fn version_null() -> *const c_char {
    std::ptr::null()
}

impl NativeVersion {
    fn export(self) -> *const c_void {
        let f: extern "C" fn() -> *const c_char = match self {
            NativeVersion::Otto4 => version_otto,
            NativeVersion::Vetinari3 => version_vetinari,
            NativeVersion::Empty => version_empty,
            NativeVersion::Null => version_null,
        };
        f as *const c_void
    }
}

/// Shared record of paths handed to the backend
#[derive(Debug, Clone, Default)]
pub struct AttemptLog(Arc<Mutex<Vec<PathBuf>>>);

impl AttemptLog {
    pub fn paths(&self) -> Vec<PathBuf> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    /// File names of attempted paths, in order
    pub fn file_names(&self) -> Vec<String> {
        self.paths()
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect()
    }

    fn record(&self, path: &Path) {
        self.0.lock().unwrap().push(path.to_path_buf());
    }
}

/// Backend that "loads" anything except the file names it was told to fail
pub struct RecordingBackend {
    log: AttemptLog,
    failing: Vec<String>,
    version: NativeVersion,
}

impl RecordingBackend {
    pub fn new() -> (Self, AttemptLog) {
        let log = AttemptLog::default();
        let backend = Self {
            log: log.clone(),
            failing: Vec::new(),
            version: NativeVersion::Otto4,
        };
        (backend, log)
    }

    /// Make opening `kind` fail as if the OS rejected the file
    pub fn failing(mut self, kind: LibraryKind) -> Self {
        self.failing.push(kind.file_name(TEST_PLATFORM.platform));
        self
    }

    pub fn with_version(mut self, version: NativeVersion) -> Self {
        self.version = version;
        self
    }
}

impl Backend for RecordingBackend {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn open(&self, path: &Path) -> anyhow::Result<Box<dyn NativeLibrary>> {
        self.log.record(path);
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.failing.contains(&file_name) {
            anyhow::bail!("{}: invalid ELF header", path.display());
        }
        Ok(Box::new(FakeLibrary {
            path: path.to_path_buf(),
            version: self.version,
        }))
    }
}

struct FakeLibrary {
    path: PathBuf,
    version: NativeVersion,
}

impl NativeLibrary for FakeLibrary {
    fn path(&self) -> &Path {
        &self.path
    }

    fn symbol(&self, name: &str) -> vlcrt_loader::Result<*const c_void> {
        if name == VERSION_SYMBOL {
            Ok(self.version.export())
        } else {
            Err(Error::SymbolNotFound {
                symbol: name.to_string(),
                reason: "undefined symbol".to_string(),
            })
        }
    }
}

/// Temporary directory holding placeholder library files
pub struct LibraryDir {
    dir: TempDir,
}

impl LibraryDir {
    /// Directory containing both libraries
    pub fn complete() -> Self {
        Self::with(&[LibraryKind::Core, LibraryKind::Main])
    }

    /// Directory containing only the given libraries
    pub fn with(kinds: &[LibraryKind]) -> Self {
        let dir = TempDir::new().unwrap();
        for kind in kinds {
            let path = dir.path().join(kind.file_name(TEST_PLATFORM.platform));
            std::fs::write(path, b"placeholder").unwrap();
        }
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn library_path(&self, kind: LibraryKind) -> PathBuf {
        self.dir.path().join(kind.file_name(TEST_PLATFORM.platform))
    }

    pub fn config(&self) -> LoaderConfig {
        LoaderConfig {
            search: LibrarySearch::Directory(self.path().to_path_buf()),
            version_check: VersionCheckMode::Enabled,
        }
    }
}

/// Loader over `dir` with a recording backend
pub fn loader_for(dir: &LibraryDir, backend: RecordingBackend) -> Loader {
    Loader::with_backend(TEST_PLATFORM, dir.config(), Box::new(backend)).with_binding_major(4)
}
