//! Shared helpers for integration tests

#![allow(dead_code)]

mod storage;

pub use storage::FakeStorage;

use serde::de::DeserializeOwned;
use tempfile::TempDir;

/// Deserialize a request from a JSON value
pub fn request<T: DeserializeOwned>(value: serde_json::Value) -> T {
    serde_json::from_value(value).unwrap()
}

/// Create a directory holding `files` as (relative path, contents)
pub fn source_dir(files: &[(&str, &[u8])]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, contents) in files {
        let path = dir.path().join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }
    dir
}
