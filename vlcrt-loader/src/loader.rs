//! LibVLC load sequencing
//!
//! # State machine
//!
//! ```text
//! Unloaded ──► Loading ──► Loaded   (terminal)
//!                     └──► Failed   (terminal, no retry)
//! ```
//!
//! `libvlccore` is loaded before `libvlc`, whose imports it satisfies. Each
//! library comes from the single path its [`LibrarySearch`] resolves to.
//! A failed sequence is recorded and replayed to later callers: loading the
//! same paths again cannot succeed until something outside the process
//! changes, so retrying would only hide the deployment problem.
//!
//! Library handles are kept for the lifetime of the [`Loader`]. The global
//! loader lives until process exit, so LibVLC is never unloaded.
//!
//! [`LibrarySearch`]: crate::library::LibrarySearch

use std::ffi::c_void;
use std::sync::{Mutex, MutexGuard, PoisonError};

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::backend::{system_backend, Backend, NativeLibrary};
use crate::config::{ConfigOverrides, LoaderConfig};
use crate::error::{Error, Result};
use crate::library::{LibraryKind, ResolvedLibrary};
use crate::platform::PlatformInfo;
use crate::version::{self, VersionCheck};

/// Observable phase of the load state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadPhase {
    #[default]
    Unloaded,
    Loading,
    Loaded,
    Failed,
}

/// Mutable load state, only touched with the loader's mutex held
#[derive(Default)]
struct LoadState {
    core_library: Option<Box<dyn NativeLibrary>>,
    main_library: Option<Box<dyn NativeLibrary>>,
    is_loaded: bool,
    phase: LoadPhase,
    failure: Option<Error>,
    /// Dependency that loaded before the main library failed. Kept mapped
    /// but never exposed as a usable handle.
    stranded: Option<Box<dyn NativeLibrary>>,
}

impl LoadState {
    /// Loaded according to either signal
    fn loaded(&self) -> bool {
        self.is_loaded || self.main_library.is_some()
    }
}

/// Loads and validates the LibVLC runtime
pub struct Loader {
    platform: PlatformInfo,
    config: LoaderConfig,
    backend: Box<dyn Backend>,
    binding_major: u32,
    state: Mutex<LoadState>,
}

impl Loader {
    /// Loader for the running process using the platform's OS backend
    pub fn new(config: LoaderConfig) -> Result<Self> {
        let platform = PlatformInfo::current();
        let backend = system_backend(&platform)?;
        Ok(Self::with_backend(platform, config, backend))
    }

    /// Loader with an explicit platform description and backend
    pub fn with_backend(
        platform: PlatformInfo,
        config: LoaderConfig,
        backend: Box<dyn Backend>,
    ) -> Self {
        Self {
            platform,
            config,
            backend,
            binding_major: version::binding_major_version(),
            state: Mutex::new(LoadState::default()),
        }
    }

    /// Check against a binding layer other than this crate
    pub fn with_binding_major(mut self, major: u32) -> Self {
        self.binding_major = major;
        self
    }

    pub fn platform(&self) -> &PlatformInfo {
        &self.platform
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn binding_major(&self) -> u32 {
        self.binding_major
    }

    /// Paths the load sequence will use, in load order
    pub fn resolved_libraries(&self) -> Result<Vec<ResolvedLibrary>> {
        self.config.search.resolve_all(&self.platform)
    }

    /// Whether both libraries are loaded
    pub fn is_loaded(&self) -> bool {
        self.lock_state().loaded()
    }

    pub fn phase(&self) -> LoadPhase {
        self.lock_state().phase
    }

    /// Error that ended the load sequence, if it failed
    pub fn failure(&self) -> Option<Error> {
        self.lock_state().failure.clone()
    }

    /// Load LibVLC unless already loaded
    ///
    /// Returns immediately, without logging or touching the OS, once the
    /// runtime is loaded. After a failed sequence returns the same error.
    pub fn ensure_loaded(&self) -> Result<()> {
        let mut state = self.lock_state();
        if state.loaded() {
            debug_assert!(
                state.is_loaded && state.core_library.is_some() && state.main_library.is_some(),
                "loaded flag and library handles disagree"
            );
            return Ok(());
        }
        if let Some(failure) = &state.failure {
            return Err(failure.clone());
        }

        state.phase = LoadPhase::Loading;
        match self.load_sequence(&mut state) {
            Ok(()) => {
                state.is_loaded = true;
                state.phase = LoadPhase::Loaded;
                info!("LibVLC loaded via {}", self.backend.name());
                Ok(())
            }
            Err(e) => {
                error!("Failed to load required native libraries: {}", e);
                state.phase = LoadPhase::Failed;
                state.failure = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Verify the loaded LibVLC shares this binding's major version
    ///
    /// Loads the runtime first if needed. Reports [`VersionCheck::Skipped`]
    /// without touching the library where the check is unavailable.
    pub fn ensure_versions_match(&self) -> Result<VersionCheck> {
        if !self.config.version_check.is_enabled() {
            debug!("Version check unavailable on this target, skipping");
            return Ok(VersionCheck::Skipped);
        }

        let native_version = self.native_version()?;
        let major = version::check_major_versions(&native_version, self.binding_major)?;
        Ok(VersionCheck::Matched {
            native_version,
            major,
        })
    }

    /// Version string reported by the loaded `libvlc`
    pub fn native_version(&self) -> Result<String> {
        self.ensure_loaded()?;
        let state = self.lock_state();
        let main = state
            .main_library
            .as_deref()
            .ok_or_else(|| self.missing_handle(LibraryKind::Main))?;
        version::query_native_version(main)
    }

    /// Address of an export of `libvlc`, loading the runtime if needed
    pub fn symbol(&self, name: &str) -> Result<*const c_void> {
        self.ensure_loaded()?;
        let state = self.lock_state();
        let main = state
            .main_library
            .as_deref()
            .ok_or_else(|| self.missing_handle(LibraryKind::Main))?;
        main.symbol(name)
    }

    fn load_sequence(&self, state: &mut LoadState) -> Result<()> {
        let core = self.load_library(LibraryKind::Core)?;
        state.core_library = Some(core);

        match self.load_library(LibraryKind::Main) {
            Ok(main) => state.main_library = Some(main),
            Err(e) => {
                // Partial success is not success
                state.stranded = state.core_library.take();
                return Err(e);
            }
        }

        if state.core_library.is_none() {
            return Err(self.missing_handle(LibraryKind::Core));
        }
        if state.main_library.is_none() {
            return Err(self.missing_handle(LibraryKind::Main));
        }
        Ok(())
    }

    fn load_library(&self, kind: LibraryKind) -> Result<Box<dyn NativeLibrary>> {
        let resolved = self.config.search.resolve(kind, &self.platform)?;
        let path = resolved.path;
        debug!("Loading {}", path.display());

        if resolved.check_exists && !path.exists() {
            warn!("Cannot find {}", path.display());
            return Err(Error::MissingLibraryFile {
                library: kind,
                path,
            });
        }

        match self.backend.open(&path) {
            Ok(library) => {
                debug!("Loaded {} from {}", kind, library.path().display());
                Ok(library)
            }
            Err(e) => {
                warn!("Failed to load {}: {:#}", path.display(), e);
                Err(Error::LoadFailure {
                    library: kind,
                    path,
                    reason: format!("{:#}", e),
                })
            }
        }
    }

    fn missing_handle(&self, kind: LibraryKind) -> Error {
        let path = self
            .config
            .search
            .resolve(kind, &self.platform)
            .map(|resolved| resolved.path)
            .unwrap_or_else(|_| kind.file_name(self.platform.platform).into());
        Error::LoadFailure {
            library: kind,
            path,
            reason: "no library handle after load sequence".to_string(),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, LoadState> {
        // State is only written after each step completes, so it stays
        // consistent even if a backend panicked mid-load.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Loader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loader")
            .field("platform", &self.platform)
            .field("config", &self.config)
            .field("backend", &self.backend.name())
            .field("binding_major", &self.binding_major)
            .field("phase", &self.phase())
            .finish()
    }
}

// ========================================
// Process-wide loader
// ========================================

static GLOBAL: OnceCell<Loader> = OnceCell::new();

/// Install the process-wide loader
///
/// Must run before the first call to [`global`] or any of the free
/// functions below; fails with [`Error::AlreadyInitialized`] afterwards.
pub fn install_global(loader: Loader) -> Result<&'static Loader> {
    GLOBAL
        .try_insert(loader)
        .map_err(|_| Error::AlreadyInitialized)
}

/// Process-wide loader, created from resolved configuration on first use
pub fn global() -> Result<&'static Loader> {
    GLOBAL.get_or_try_init(|| {
        let config = LoaderConfig::resolve(&ConfigOverrides::default())?;
        Loader::new(config)
    })
}

/// Load LibVLC into the process unless already loaded
pub fn ensure_loaded() -> Result<()> {
    global()?.ensure_loaded()
}

/// Whether the process-wide loader has loaded LibVLC
///
/// Never initializes the loader.
pub fn is_loaded() -> bool {
    GLOBAL.get().is_some_and(Loader::is_loaded)
}

/// Check the process-wide LibVLC against this binding's major version
pub fn ensure_versions_match() -> Result<VersionCheck> {
    global()?.ensure_versions_match()
}
