//! Process-wide loader tests
//!
//! The global loader can be installed once per process, so the whole
//! lifecycle is exercised in a single test.

mod helpers;

use helpers::{loader_for, LibraryDir, RecordingBackend};
use vlcrt_loader::{Error, VersionCheck};

#[test]
fn test_global_loader_lifecycle() {
    let dir = LibraryDir::complete();
    let (backend, log) = RecordingBackend::new();

    let installed = vlcrt_loader::install_global(loader_for(&dir, backend)).unwrap();
    assert!(!vlcrt_loader::is_loaded());

    // Second installation is rejected and leaves the first in place
    let (other, _other_log) = RecordingBackend::new();
    let err = vlcrt_loader::install_global(loader_for(&dir, other)).unwrap_err();
    assert_eq!(err, Error::AlreadyInitialized);

    vlcrt_loader::ensure_loaded().unwrap();
    vlcrt_loader::ensure_loaded().unwrap();
    assert!(vlcrt_loader::is_loaded());
    assert!(installed.is_loaded());
    assert_eq!(log.count(), 2);

    let check = vlcrt_loader::ensure_versions_match().unwrap();
    assert!(matches!(check, VersionCheck::Matched { major: 4, .. }));

    let global = vlcrt_loader::global().unwrap();
    assert!(std::ptr::eq(global, installed));
}
