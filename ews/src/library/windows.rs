use std::io;

use tracing::warn;
use winreg::{enums::HKEY_LOCAL_MACHINE, RegKey};

use super::{Error, LibraryLocation, LibraryVersion, LocateLibrary, Result};

/// The registry key under which client libraries register, one
/// subkey per version.
pub const REGISTRY_KEY: &str = r"SOFTWARE\Microsoft\Exchange\Web Services";

const INSTALL_DIRECTORY_VALUE: &str = "Install Directory";

/// Registry of client libraries backed by the Windows registry.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct WindowsRegistry;

impl LocateLibrary for WindowsRegistry {
    fn installed(&self) -> Result<Vec<LibraryLocation>> {
        let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);

        let key = match hklm.open_subkey(REGISTRY_KEY) {
            Ok(key) => key,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(Error::ReadRegistryKey(err, REGISTRY_KEY.to_owned())),
        };

        let mut locations = Vec::new();

        for name in key.enum_keys() {
            let name = name.map_err(|err| Error::ReadRegistryKey(err, REGISTRY_KEY.to_owned()))?;

            let version = match name.parse::<LibraryVersion>() {
                Ok(version) => version,
                Err(err) => {
                    warn!("skipping registry key {name}: {err}");
                    continue;
                }
            };

            let dir = key
                .open_subkey(&name)
                .and_then(|subkey| subkey.get_value::<String, _>(INSTALL_DIRECTORY_VALUE));

            match dir {
                Ok(dir) => locations.push(LibraryLocation::from_install_dir(version, dir)),
                Err(err) => warn!("skipping registry key {name}: {err}"),
            }
        }

        Ok(locations)
    }
}
