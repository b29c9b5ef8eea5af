//! Probe report assembly and rendering

use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;

use vlcrt_loader::library::{LibrarySearch, ResolvedLibrary};
use vlcrt_loader::platform::PlatformInfo;
use vlcrt_loader::{LibraryKind, LoadPhase, Loader, VersionCheck};

/// One resolved library and what the filesystem says about it
#[derive(Debug, Clone, Serialize)]
pub struct LibraryReport {
    pub kind: LibraryKind,
    pub path: PathBuf,
    /// `None` when the OS search path decides
    pub exists: Option<bool>,
}

impl From<ResolvedLibrary> for LibraryReport {
    fn from(resolved: ResolvedLibrary) -> Self {
        let exists = resolved.check_exists.then(|| resolved.path.exists());
        Self {
            kind: resolved.kind,
            path: resolved.path,
            exists,
        }
    }
}

/// Everything the probe learned about the LibVLC installation
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub platform: PlatformInfo,
    pub backend: &'static str,
    pub search: LibrarySearch,
    pub libraries: Vec<LibraryReport>,
    pub loaded: bool,
    pub phase: LoadPhase,
    pub binding_major: u32,
    pub version: Option<VersionCheck>,
    pub error: Option<String>,
}

impl ProbeReport {
    /// Snapshot of `loader` before any load attempt
    pub fn new(loader: &Loader) -> Self {
        let (libraries, error) = match loader.resolved_libraries() {
            Ok(resolved) => (resolved.into_iter().map(LibraryReport::from).collect(), None),
            Err(e) => (Vec::new(), Some(e.to_string())),
        };
        Self {
            platform: *loader.platform(),
            backend: loader.backend_name(),
            search: loader.config().search.clone(),
            libraries,
            loaded: loader.is_loaded(),
            phase: loader.phase(),
            binding_major: loader.binding_major(),
            version: None,
            error,
        }
    }

    /// Refresh load state from `loader`
    pub fn update(&mut self, loader: &Loader) {
        self.loaded = loader.is_loaded();
        self.phase = loader.phase();
    }

    pub fn succeeded(&self) -> bool {
        self.loaded && self.error.is_none()
    }

    /// Human-readable multi-line summary
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let bits = if self.platform.is_64_bit { 64 } else { 32 };
        let _ = writeln!(out, "Platform:  {} ({}-bit)", self.platform.platform, bits);
        let _ = writeln!(out, "Backend:   {}", self.backend);
        let _ = writeln!(out, "Search:    {}", self.search);
        for library in &self.libraries {
            let status = match library.exists {
                Some(true) => "found",
                Some(false) => "missing",
                None => "os search path",
            };
            let _ = writeln!(
                out,
                "  {:<11} {} [{}]",
                library.kind.to_string(),
                library.path.display(),
                status
            );
        }
        let _ = writeln!(out, "State:     {:?}", self.phase);
        match &self.version {
            Some(VersionCheck::Matched {
                native_version,
                major,
            }) => {
                let _ = writeln!(out, "Version:   {} (major {} matches)", native_version, major);
            }
            Some(VersionCheck::Skipped) => {
                let _ = writeln!(out, "Version:   check unavailable on this target");
            }
            None => {
                let _ = writeln!(out, "Version:   not checked (binding major {})", self.binding_major);
            }
        }
        if let Some(error) = &self.error {
            let _ = writeln!(out, "Error:     {}", error);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vlcrt_loader::platform::Platform;

    fn report() -> ProbeReport {
        ProbeReport {
            platform: PlatformInfo::new(Platform::Linux, true),
            backend: "dlopen",
            search: LibrarySearch::SystemDefault,
            libraries: vec![
                LibraryReport {
                    kind: LibraryKind::Core,
                    path: PathBuf::from("libvlccore.so"),
                    exists: None,
                },
                LibraryReport {
                    kind: LibraryKind::Main,
                    path: PathBuf::from("libvlc.so"),
                    exists: None,
                },
            ],
            loaded: true,
            phase: LoadPhase::Loaded,
            binding_major: 4,
            version: Some(VersionCheck::Matched {
                native_version: "4.0.5 Otto".to_string(),
                major: 4,
            }),
            error: None,
        }
    }

    #[test]
    fn test_text_report_lists_libraries_in_order() {
        let text = report().render_text();

        let core = text.find("libvlccore.so").unwrap();
        let main = text.find("libvlc.so").unwrap();
        assert!(core < main);
        assert!(text.contains("linux (64-bit)"));
        assert!(text.contains("4.0.5 Otto"));
    }

    #[test]
    fn test_text_report_shows_error() {
        let mut report = report();
        report.loaded = false;
        report.phase = LoadPhase::Failed;
        report.version = None;
        report.error = Some("Cannot find libvlccore".to_string());

        let text = report.render_text();

        assert!(text.contains("Error:     Cannot find libvlccore"));
        assert!(!report.succeeded());
    }

    #[test]
    fn test_json_report_shape() {
        let json = serde_json::to_value(report()).unwrap();

        assert_eq!(json["platform"]["platform"], "linux");
        assert_eq!(json["search"]["kind"], "system_default");
        assert_eq!(json["libraries"][0]["kind"], "core");
        assert_eq!(json["phase"], "loaded");
        assert_eq!(json["version"]["status"], "matched");
        assert_eq!(json["version"]["major"], 4);
        assert!(json["error"].is_null());
    }

    #[test]
    fn test_missing_file_reported() {
        let resolved = ResolvedLibrary {
            kind: LibraryKind::Main,
            path: PathBuf::from("/nonexistent/vlcrt/libvlc.so"),
            check_exists: true,
        };

        let library = LibraryReport::from(resolved);

        assert_eq!(library.exists, Some(false));
    }
}
