//! # Client library discovery
//!
//! Module dedicated to the discovery and the loading of the client
//! library. Installed versions of the library are registered in a
//! system-wide registry, keyed by version. The newest one is
//! selected, then handed to a [`LoadLibrary`] implementation.
//!
//! The resolution can be done once per process with
//! [`locate_newest_once`]: the first successful resolution is kept
//! for the life of the process.

mod fs;
#[cfg(windows)]
mod windows;

use std::{
    cmp::Ordering,
    fmt, io,
    path::{Path, PathBuf},
    result,
    str::FromStr,
    sync::Arc,
};

use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing::{debug, info};

#[doc(inline)]
pub use self::fs::{FsRegistry, DEFAULT_REGISTRY_PATH};
#[cfg(windows)]
#[doc(inline)]
pub use self::windows::{WindowsRegistry, REGISTRY_KEY};
use crate::{client::ClientLibrary, AnyBoxedError, AnyResult};

/// The file name of the client library, inside its install
/// directory.
pub const LIBRARY_FILE_NAME: &str = "Microsoft.Exchange.WebServices.dll";

/// The remediation message attached to dependency errors.
pub const REMEDIATION: &str = "install the EWS Managed API from \
     https://www.microsoft.com/en-us/download/details.aspx?id=42951";

/// The registry of the current platform.
#[cfg(windows)]
pub type SystemRegistry = WindowsRegistry;

/// The registry of the current platform.
#[cfg(not(windows))]
pub type SystemRegistry = FsRegistry;

static LOCATION: OnceCell<LibraryLocation> = OnceCell::new();

/// The global `Result` alias of the module.
pub type Result<T> = result::Result<T, Error>;

/// The global `Error` enum of the module.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot find any installed client library: {0}")]
    DependencyMissing(String),
    #[error("cannot find client library at {0:?}: {1}")]
    LibraryFileMissing(PathBuf, String),
    #[error("cannot load client library from {1:?}")]
    LoadLibrary(#[source] AnyBoxedError, PathBuf),
    #[error("invalid client library version {0}")]
    ParseLibraryVersion(String),
    #[error("cannot read client library registry at {1:?}")]
    ReadRegistryFile(#[source] io::Error, PathBuf),
    #[error("cannot parse client library registry at {1:?}")]
    ParseRegistryFile(#[source] toml::de::Error, PathBuf),
    #[error("cannot read client library registry key {1}")]
    ReadRegistryKey(#[source] io::Error, String),
}

/// The version of an installed client library.
///
/// Versions are compared numerically, component by component.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct LibraryVersion(Vec<u64>);

impl LibraryVersion {
    pub fn components(&self) -> &[u64] {
        &self.0
    }
}

impl FromStr for LibraryVersion {
    type Err = Error;

    fn from_str(version: &str) -> Result<Self> {
        let components = version
            .trim()
            .split('.')
            .map(|n| n.parse::<u64>())
            .collect::<result::Result<Vec<_>, _>>()
            .map_err(|_| Error::ParseLibraryVersion(version.to_owned()))?;

        Ok(Self(components))
    }
}

impl Ord for LibraryVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.0.len().max(other.0.len());
        let component = |v: &Self, i: usize| v.0.get(i).copied().unwrap_or_default();

        (0..len)
            .map(|i| component(self, i).cmp(&component(other, i)))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for LibraryVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for LibraryVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let components: Vec<_> = self.0.iter().map(u64::to_string).collect();
        f.write_str(&components.join("."))
    }
}

/// The location of an installed client library.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LibraryLocation {
    pub version: LibraryVersion,

    /// The path of the library file.
    pub path: PathBuf,
}

impl LibraryLocation {
    /// Build a location out of an install directory, as registered
    /// in registries.
    pub fn from_install_dir(version: LibraryVersion, dir: impl AsRef<Path>) -> Self {
        Self {
            version,
            path: dir.as_ref().join(LIBRARY_FILE_NAME),
        }
    }
}

/// Registry of installed client libraries.
pub trait LocateLibrary: Send + Sync {
    /// List all installed client libraries, in any order.
    fn installed(&self) -> Result<Vec<LibraryLocation>>;
}

/// Loader of client libraries.
pub trait LoadLibrary: Send + Sync {
    /// Load the client library located at the given location.
    fn load(&self, location: &LibraryLocation) -> AnyResult<Arc<dyn ClientLibrary>>;
}

/// Loader handing out a client library linked into the current
/// binary, whatever the location is.
#[derive(Clone)]
pub struct StaticLoader {
    library: Arc<dyn ClientLibrary>,
}

impl StaticLoader {
    pub fn new(library: impl ClientLibrary + 'static) -> Self {
        Self {
            library: Arc::new(library),
        }
    }

    pub fn from_arc(library: Arc<dyn ClientLibrary>) -> Self {
        Self { library }
    }
}

impl LoadLibrary for StaticLoader {
    fn load(&self, _location: &LibraryLocation) -> AnyResult<Arc<dyn ClientLibrary>> {
        Ok(self.library.clone())
    }
}

/// Find the newest client library installed in the given registry.
pub fn locate_newest(registry: &dyn LocateLibrary) -> Result<LibraryLocation> {
    let installed = registry.installed()?;
    debug!(count = installed.len(), "found installed client libraries");

    installed
        .into_iter()
        .max_by(|a, b| a.version.cmp(&b.version))
        .ok_or_else(|| Error::DependencyMissing(REMEDIATION.to_owned()))
}

/// Find the newest client library installed in the given registry,
/// once per process.
///
/// Once a library has been found, the registry is not consulted
/// anymore and the same location is returned for the life of the
/// process. Failures are not kept, so the resolution is attempted
/// again on the next call.
pub fn locate_newest_once(registry: &dyn LocateLibrary) -> Result<&'static LibraryLocation> {
    LOCATION.get_or_try_init(|| locate_newest(registry))
}

/// Load the client library at the given location, using the given
/// loader.
pub fn load_library(
    loader: &dyn LoadLibrary,
    location: &LibraryLocation,
) -> Result<Arc<dyn ClientLibrary>> {
    if !location.path.exists() {
        return Err(Error::LibraryFileMissing(
            location.path.clone(),
            REMEDIATION.to_owned(),
        ));
    }

    info!(version = %location.version, path = ?location.path, "loading client library");

    loader
        .load(location)
        .map_err(|err| Error::LoadLibrary(err, location.path.clone()))
}

#[cfg(test)]
mod tests {
    use super::{locate_newest, Error, LibraryLocation, LibraryVersion, LocateLibrary, Result};

    struct Locations(Vec<LibraryLocation>);

    impl LocateLibrary for Locations {
        fn installed(&self) -> Result<Vec<LibraryLocation>> {
            Ok(self.0.clone())
        }
    }

    fn location(version: &str) -> LibraryLocation {
        LibraryLocation::from_install_dir(version.parse().unwrap(), format!("/opt/ews/{version}"))
    }

    #[test]
    fn version_order_is_numeric() {
        let v = |s: &str| s.parse::<LibraryVersion>().unwrap();
        assert!(v("2.10") > v("2.9"));
        assert!(v("15.0.847.30") > v("2.2"));
        assert!(v("2.2.1") > v("2.2"));
        assert_eq!(v("2.2.0").cmp(&v("2.2")), std::cmp::Ordering::Equal);
    }

    #[test]
    fn version_parse_errors() {
        assert!("".parse::<LibraryVersion>().is_err());
        assert!("2.x".parse::<LibraryVersion>().is_err());
        assert!("v2".parse::<LibraryVersion>().is_err());
    }

    #[test]
    fn newest_version_wins() {
        let registry = Locations(vec![location("1.2"), location("2.2"), location("2.0")]);
        let newest = locate_newest(&registry).unwrap();

        assert_eq!(newest.version.to_string(), "2.2");
        assert!(newest.path.ends_with("2.2/Microsoft.Exchange.WebServices.dll"));
    }

    #[test]
    fn nothing_installed() {
        let err = locate_newest(&Locations(vec![])).unwrap_err();

        assert!(matches!(err, Error::DependencyMissing(_)));
        assert!(err.to_string().contains("details.aspx?id=42951"));
    }
}
