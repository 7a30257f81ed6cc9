//! Device identity store.
//!
//! This module manages the persistent device identity attached to every
//! report: a UUID created on first use, an optional user-assigned tag, and
//! the machine hostname. UUID and tag live in small flat files under the
//! user config directory.
//!
//! Getters never create state. The entry point calls [`IdentityStore::ensure_uuid`]
//! exactly once before a run; everything else is a plain read.

use crate::dns::report::Identity;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Filename of the persisted UUID.
const UUID_FILENAME: &str = "uuid.cfg";

/// Filename of the persisted tag.
const TAG_FILENAME: &str = "tag.cfg";

/// File-backed identity store.
///
/// # Example
///
/// ```ignore
/// let store = IdentityStore::new();
/// store.ensure_uuid()?;
/// let identity = store.snapshot()?;
/// ```
pub struct IdentityStore {
    dir: PathBuf,
}

impl IdentityStore {
    /// Create a store rooted at the default config directory.
    ///
    /// Uses `$CONFIG_DIR/dnsperf`, falling back to the current directory.
    #[must_use]
    pub fn new() -> Self {
        let dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dnsperf");
        Self { dir }
    }

    /// Create a store rooted at an explicit directory.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Hostname of this machine.
    #[must_use]
    pub fn hostname(&self) -> String {
        hostname::get()
            .map(|h| h.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "unknown".to_string())
    }

    /// Read the persisted UUID, or an empty string if none exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the UUID file exists but cannot be read.
    pub fn uuid(&self) -> Result<String> {
        read_value(&self.uuid_path())
    }

    /// Read the persisted tag, or an empty string if none exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the tag file exists but cannot be read.
    pub fn tag(&self) -> Result<String> {
        read_value(&self.tag_path())
    }

    /// Create the persistent UUID if it does not exist yet, returning it.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory or UUID file cannot be
    /// written.
    pub fn ensure_uuid(&self) -> Result<String> {
        let path = self.uuid_path();
        if path.exists() {
            return read_value(&path);
        }

        std::fs::create_dir_all(&self.dir)?;
        let new_uuid = uuid::Uuid::new_v4().to_string();
        std::fs::write(&path, &new_uuid)?;
        tracing::info!("created device UUID {new_uuid}");
        Ok(new_uuid)
    }

    /// Persist a tag, overwriting any existing one.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory or tag file cannot be
    /// written.
    pub fn set_tag(&self, name: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.tag_path(), name)?;
        Ok(())
    }

    /// Delete the persisted tag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no tag file exists.
    pub fn delete_tag(&self) -> Result<()> {
        delete_value(&self.tag_path(), "Tag")
    }

    /// Delete the persisted UUID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no UUID file exists.
    pub fn delete_uuid(&self) -> Result<()> {
        delete_value(&self.uuid_path(), "UUID")
    }

    /// Take a read-only snapshot of the full identity.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing identity file cannot be read.
    pub fn snapshot(&self) -> Result<Identity> {
        Ok(Identity {
            uuid: self.uuid()?,
            tag: self.tag()?,
            hostname: self.hostname(),
        })
    }

    fn uuid_path(&self) -> PathBuf {
        self.dir.join(UUID_FILENAME)
    }

    fn tag_path(&self) -> PathBuf {
        self.dir.join(TAG_FILENAME)
    }
}

impl Default for IdentityStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a one-line value file, or return an empty string if it is absent.
fn read_value(path: &Path) -> Result<String> {
    if !path.exists() {
        return Ok(String::new());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(content.lines().next().unwrap_or("").trim().to_string())
}

/// Remove a value file, failing visibly when there is nothing to remove.
fn delete_value(path: &Path, label: &str) -> Result<()> {
    if !path.exists() {
        return Err(Error::config(format!("{label} file does not exist")));
    }
    std::fs::remove_file(path)?;
    Ok(())
}
