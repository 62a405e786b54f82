use crate::types::{Account, FetchConfig, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions, Permissions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_CONFIG_FILE: &str = "gpf.yaml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub buildtime: String,
}

/// Persisted across runs. `last_updated` only moves forward, and only at the
/// end of a run that completed without a fatal error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    #[serde(rename = "lastupdated", default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl RunState {
    /// Move `last_updated` to `run_started`. Never moves it backwards.
    pub fn advance(&mut self, run_started: DateTime<Utc>) {
        match self.last_updated {
            Some(previous) if previous >= run_started => {
                debug!("Keeping last updated time {} (run started {})", previous, run_started);
            }
            _ => self.last_updated = Some(run_started),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    path: PathBuf,
    #[serde(default)]
    pub meta: Meta,
    #[serde(flatten)]
    pub state: RunState,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub accounts: Vec<Account>,
}

impl Config {
    pub fn from_yaml(yaml: &str, path: impl Into<PathBuf>) -> Result<Self> {
        let mut config: Config = serde_yaml::from_str(yaml)?;
        config.path = path.into();
        Ok(config)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the whole document back to the file it was read from.
    ///
    /// Goes through a sibling temp file and a rename so an interrupted save
    /// leaves the previous config intact. The file keeps its permissions, since
    /// it holds access tokens.
    pub fn save(&self) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;

        let permissions = match fs::metadata(&self.path) {
            Ok(metadata) => Some(metadata.permissions()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let replaced = write_file(&tmp, yaml.as_bytes(), permissions.as_ref())
            .and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(e) = replaced {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        info!("Saved config to {}", self.path.display());
        Ok(())
    }
}

fn write_file(path: &Path, contents: &[u8], permissions: Option<&Permissions>) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        if let Some(permissions) = permissions {
            options.mode(permissions.mode());
        }
    }

    let mut file = options.open(path)?;
    // `mode` only applies to newly created files.
    if let Some(permissions) = permissions {
        file.set_permissions(permissions.clone())?;
    }
    file.write_all(contents)?;
    file.sync_all()
}

/// Load the configuration file at `path`.
pub fn read_config(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    debug!("Reading config from {}", path.display());

    let yaml = fs::read_to_string(path)?;
    let config = Config::from_yaml(&yaml, path)?;

    info!(
        "Loaded {} account(s) from {}",
        config.accounts.len(),
        path.display()
    );
    Ok(config)
}
