//! Profile persistence with file locking.
//!
//! Every profile change goes through [`ProfileStore::update`], which holds an
//! exclusive lock on a sidecar lock file for the whole load-modify-save
//! cycle. Writers therefore always merge into the latest saved profile.

use crate::{Error, Result, UserProfile};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// JSON-file profile store
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sidecar_path(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(suffix);
        self.path.with_file_name(name)
    }

    fn lock_path(&self) -> PathBuf {
        self.sidecar_path(".lock")
    }

    /// Where an unreadable profile is copied before it gets overwritten
    pub fn corrupt_path(&self) -> PathBuf {
        self.sidecar_path(".corrupt")
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Open the sidecar lock file and take an exclusive lock on it
    fn acquire_lock(&self) -> Result<File> {
        self.ensure_parent_dir()?;
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())?;
        lock.lock_exclusive()?;
        Ok(lock)
    }

    /// Load the profile
    ///
    /// Returns the default profile if the file doesn't exist or is corrupt.
    pub fn load(&self) -> Result<UserProfile> {
        self.load_checked().map(|(profile, _)| profile)
    }

    /// Load the profile, flagging whether the stored file was unreadable
    fn load_checked(&self) -> Result<(UserProfile, bool)> {
        if !self.path.exists() {
            tracing::info!("No profile found at {:?}, using default profile", self.path);
            return Ok((UserProfile::default(), false));
        }

        let file = File::open(&self.path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;

        if let Err(e) = read {
            tracing::warn!("Failed to read profile {:?}: {}. Using defaults.", self.path, e);
            return Ok((UserProfile::default(), true));
        }

        match serde_json::from_str::<UserProfile>(&contents) {
            Ok(profile) => {
                tracing::debug!("Loaded profile from {:?}", self.path);
                Ok((profile, false))
            }
            Err(e) => {
                tracing::warn!("Failed to parse profile {:?}: {}. Using defaults.", self.path, e);
                Ok((UserProfile::default(), true))
            }
        }
    }

    /// Write the profile atomically (temp file, fsync, rename)
    fn write(&self, profile: &UserProfile) -> Result<()> {
        self.ensure_parent_dir()?;

        let parent = self
            .path
            .parent()
            .ok_or_else(|| Error::State(format!("profile path {:?} has no parent", self.path)))?;
        let temp = NamedTempFile::new_in(parent)?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, profile)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;

        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        tracing::debug!("Saved profile to {:?}", self.path);
        Ok(())
    }

    /// Replace the stored profile
    pub fn save(&self, profile: &UserProfile) -> Result<()> {
        let lock = self.acquire_lock()?;
        let result = self.write(profile);
        lock.unlock()?;
        result
    }

    /// Load, modify, and save under one exclusive lock
    ///
    /// The closure always sees the latest saved profile. If it fails nothing
    /// is written. An unreadable profile is copied to [`Self::corrupt_path`]
    /// before the defaults replace it.
    pub fn update<F, T>(&self, f: F) -> Result<(UserProfile, T)>
    where
        F: FnOnce(&mut UserProfile) -> Result<T>,
    {
        let lock = self.acquire_lock()?;

        let result = self.load_checked().and_then(|(mut profile, corrupt)| {
            let value = f(&mut profile)?;
            if corrupt {
                std::fs::copy(&self.path, self.corrupt_path())?;
                tracing::warn!(
                    "Kept unreadable profile as {:?}; run `recompute` to rebuild lift state",
                    self.corrupt_path()
                );
            }
            self.write(&profile)?;
            Ok((profile, value))
        });

        lock.unlock()?;
        result
    }
}
