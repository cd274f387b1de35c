use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use shellexpand_utils::shellexpand_path;
use tracing::{debug, warn};

use super::{Error, LibraryLocation, LibraryVersion, LocateLibrary, Result};

/// The default location of the registry file.
pub const DEFAULT_REGISTRY_PATH: &str = "/etc/ews-mail/registry.toml";

/// Registry of client libraries stored in a TOML file.
///
/// ```toml
/// [versions."2.2"]
/// install-directory = "/opt/ews/2.2"
/// ```
///
/// A missing registry file means that no library is installed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FsRegistry {
    path: PathBuf,
}

impl FsRegistry {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: shellexpand_path(path),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FsRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTRY_PATH)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RegistryFile {
    #[serde(default)]
    versions: BTreeMap<String, RegistryEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RegistryEntry {
    install_directory: PathBuf,
}

impl LocateLibrary for FsRegistry {
    fn installed(&self) -> Result<Vec<LibraryLocation>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "registry file not found");
                return Ok(Vec::new());
            }
            Err(err) => return Err(Error::ReadRegistryFile(err, self.path.clone())),
        };

        let file: RegistryFile = toml::from_str(&content)
            .map_err(|err| Error::ParseRegistryFile(err, self.path.clone()))?;

        let locations = file
            .versions
            .into_iter()
            .filter_map(|(version, entry)| match version.parse::<LibraryVersion>() {
                Ok(version) => Some(LibraryLocation::from_install_dir(
                    version,
                    shellexpand_path(entry.install_directory),
                )),
                Err(err) => {
                    warn!(path = ?self.path, "skipping registry entry: {err}");
                    None
                }
            })
            .collect();

        Ok(locations)
    }
}
