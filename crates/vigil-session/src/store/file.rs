//! JSON-file session store

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::debug;
use zeroize::Zeroize;

use vigil_core::store::keys;
use vigil_core::{Result, SessionRecord, SessionStore};

/// Session store persisted as a flat JSON object
///
/// Every write goes to a temp file that is renamed over the target. When
/// clearing leaves nothing behind the file is removed.
pub struct FileSessionStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileSessionStore {
    /// Open the store at `path`, starting empty if the file does not exist
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            BTreeMap::new()
        };
        debug!("Opened session store at {:?} ({} keys)", path, entries.len());
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store a freshly logged-in session
    pub fn insert(&self, record: &SessionRecord) -> Result<()> {
        let new_entries = record.to_entries()?;
        self.update(|entries| {
            for (key, value) in new_entries {
                replace_value(entries, key, value);
            }
        })
    }

    /// Set a single raw value
    pub fn set(&self, key: &str, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        self.update(|entries| replace_value(entries, key, value))
    }

    /// Apply `change` to a copy, persist it, and only then adopt it
    ///
    /// On a failed write the in-memory view keeps matching the file.
    fn update(&self, change: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let mut entries = self.entries.lock();
        let mut next = entries.clone();
        change(&mut next);

        if let Err(e) = self.persist(&next) {
            zeroize_values(&mut next);
            return Err(e);
        }

        let mut previous = std::mem::replace(&mut *entries, next);
        zeroize_values(&mut previous);
        Ok(())
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if entries.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path)?;
            }
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut content = serde_json::to_string_pretty(entries)?;

        // Write to temp file first, then rename
        let temp_path = self.path.with_extension("json.tmp");
        let written = std::fs::write(&temp_path, &content);
        content.zeroize();
        written?;
        let moved = restrict_permissions(&temp_path)
            .and_then(|()| Ok(std::fs::rename(&temp_path, &self.path)?));
        if moved.is_err() {
            let _ = std::fs::remove_file(&temp_path);
        }
        moved
    }
}

fn replace_value(entries: &mut BTreeMap<String, String>, key: &str, value: String) {
    if let Some(mut old) = entries.insert(key.to_string(), value) {
        old.zeroize();
    }
}

fn zeroize_values(entries: &mut BTreeMap<String, String>) {
    for value in entries.values_mut() {
        value.zeroize();
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn clear(&self) -> Result<()> {
        self.update(|entries| {
            for key in keys::ALL {
                if let Some(mut value) = entries.remove(key) {
                    value.zeroize();
                }
            }
        })
    }
}

impl Drop for FileSessionStore {
    fn drop(&mut self) {
        zeroize_values(self.entries.get_mut());
    }
}
