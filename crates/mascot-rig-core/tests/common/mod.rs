#![allow(dead_code)]
//! Shared fixture helpers: scratch character directories on disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_FIXTURE: AtomicUsize = AtomicUsize::new(0);

/// Unique scratch directory for one test, removed on drop.
pub struct FixtureDir {
    pub path: PathBuf,
}

pub fn fixture_dir(label: &str) -> FixtureDir {
    let n = NEXT_FIXTURE.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!(
        "mascot-rig-{label}-{}-{n}",
        std::process::id()
    ));
    if path.exists() {
        let _ = fs::remove_dir_all(&path);
    }
    fs::create_dir_all(&path).expect("create fixture dir");
    FixtureDir { path }
}

impl FixtureDir {
    /// Write a file at a relative path, creating parent directories.
    pub fn write(&self, rel: &str, contents: &str) {
        let full = self.path.join(rel);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("create fixture subdir");
        }
        fs::write(&full, contents).expect("write fixture file");
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path.join(rel)).expect("read fixture file")
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path.join(rel).exists()
    }

    pub fn as_path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FixtureDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// A minimal character: core data plus whatever extra files a test adds.
pub fn bare_character(label: &str) -> FixtureDir {
    let dir = fixture_dir(label);
    dir.write("model.moc3", "moc3");
    dir
}
