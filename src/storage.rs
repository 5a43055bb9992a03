use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::PathBuf;

use serde::Serialize;

use crate::models::Task;

const DATA_FILE: &str = "tasks.json";

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "io error: {err}"),
            StorageError::Json(err) => write!(f, "json error: {err}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        StorageError::Io(value)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        StorageError::Json(value)
    }
}

/// Resolves the directory holding the task file and logs.
/// `TICKLIST_DIR` overrides the platform data directory.
pub fn default_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("TICKLIST_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ticklist")
}

pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn ensure_dirs(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Reads the task list. An absent, unreadable, or malformed slot yields
    /// an empty list; the caller never sees an error.
    pub fn load_tasks(&self) -> Vec<Task> {
        let path = self.root.join(DATA_FILE);
        let mut buf = String::new();
        match File::open(&path).and_then(|mut file| file.read_to_string(&mut buf)) {
            Ok(_) => {}
            Err(_) => return Vec::new(),
        }
        match serde_json::from_str::<Vec<Task>>(&buf) {
            Ok(tasks) => tasks,
            Err(err) => {
                log::warn!(
                    "discarding malformed task data at {}: {err}",
                    path.display()
                );
                Vec::new()
            }
        }
    }

    /// Replaces the stored list wholesale. Best effort; the caller logs
    /// failures and keeps going.
    pub fn save_tasks(&self, tasks: &[Task]) -> Result<(), StorageError> {
        self.write_atomic(self.root.join(DATA_FILE), &tasks)
    }

    fn write_atomic<T: Serialize>(&self, path: PathBuf, data: &T) -> Result<(), StorageError> {
        let temp_path = path.with_extension("tmp");
        let json = serde_json::to_vec_pretty(data)?;
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        fs::rename(temp_path, path)?;
        Ok(())
    }
}
