//! Helpers for tests that need a session key on disk.

use std::path::PathBuf;

use uuid::Uuid;

/// Key file in the temp directory, removed on drop.
#[derive(Debug)]
pub struct TempKeyFile {
    path: PathBuf,
}

impl TempKeyFile {
    /// Write `len` filler bytes to a fresh uniquely named file.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be written.
    pub fn new(len: usize) -> std::io::Result<Self> {
        let path = std::env::temp_dir().join(format!("rest-auth-session-key-{}", Uuid::new_v4()));
        std::fs::write(&path, vec![b'k'; len])?;
        Ok(Self { path })
    }

    pub fn path_str(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

impl Drop for TempKeyFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
