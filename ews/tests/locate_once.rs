use std::fs;

use ews_mail::library::{locate_newest_once, FsRegistry, LIBRARY_FILE_NAME};
use tempfile::{tempdir, TempDir};

fn install(version: &str) -> (TempDir, FsRegistry) {
    let dir = tempdir().unwrap();
    let install_dir = dir.path().join(version);
    fs::create_dir_all(&install_dir).unwrap();
    fs::write(install_dir.join(LIBRARY_FILE_NAME), "").unwrap();

    let registry_path = dir.path().join("registry.toml");
    let registry = format!(
        "[versions.\"{version}\"]\ninstall-directory = {:?}\n",
        install_dir.to_string_lossy()
    );
    fs::write(&registry_path, registry).unwrap();

    (dir, FsRegistry::new(registry_path))
}

#[test_log::test]
fn test_library_is_located_once_per_process() {
    let empty = tempdir().unwrap();
    let empty = FsRegistry::new(empty.path().join("registry.toml"));

    // failures are not kept
    assert!(locate_newest_once(&empty).is_err());

    let (_dir, registry) = install("2.2");
    let first = locate_newest_once(&registry).unwrap();
    assert_eq!(first.version.to_string(), "2.2");

    // successes are kept, whatever the registry is
    let (_newer_dir, newer) = install("3.0");
    let second = locate_newest_once(&newer).unwrap();
    assert!(std::ptr::eq(first, second));

    let third = locate_newest_once(&empty).unwrap();
    assert_eq!(third.version.to_string(), "2.2");
}
