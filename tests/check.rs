//! `check` against an in-memory bucket

mod helper;

use serde_json::json;

use gcs_resource::resource::CheckCommand;
use gcs_resource::resource::models::CheckRequest;
use gcs_resource::storage::{Storage, UploadOptions};
use gcs_resource::version::types::ObservedVersion;
use helper::{FakeStorage, request};

fn path(value: &str) -> ObservedVersion {
    ObservedVersion::Path(value.to_string())
}

fn pattern_bucket() -> FakeStorage {
    FakeStorage::new("bucket-name")
        .with_object("folder/file-0.0.1.tgz", b"a")
        .with_object("folder/file-2.33.333.tgz", b"b")
        .with_object("folder/file-2.4.3.tgz", b"c")
        .with_object("folder/file-3.53.tgz", b"d")
        .with_object("folder/nested/file-9.0.0.tgz", b"e")
        .with_object("other/file-99.tgz", b"f")
}

#[tokio::test]
async fn reports_only_latest_path_without_previous_version() {
    let storage = pattern_bucket();
    let request: CheckRequest = request(json!({
        "source": { "bucket": "bucket-name", "regexp": "folder/file-(.*).tgz" }
    }));

    let versions = CheckCommand::new(&storage).run(&request).await.unwrap();

    assert_eq!(versions, vec![path("folder/file-3.53.tgz")]);
}

#[tokio::test]
async fn reports_paths_newer_than_previous_in_version_order() {
    let storage = pattern_bucket();
    let request: CheckRequest = request(json!({
        "source": { "bucket": "bucket-name", "regexp": "folder/file-(.*).tgz" },
        "version": { "path": "folder/file-2.4.3.tgz" }
    }));

    let versions = CheckCommand::new(&storage).run(&request).await.unwrap();

    assert_eq!(
        versions,
        vec![path("folder/file-2.33.333.tgz"), path("folder/file-3.53.tgz")]
    );
}

#[tokio::test]
async fn unmatched_previous_path_falls_back_to_latest() {
    let storage = pattern_bucket();
    let request: CheckRequest = request(json!({
        "source": { "bucket": "bucket-name", "regexp": "folder/file-(.*).tgz" },
        "version": { "path": "folder/fake-0.0.1.tgz" }
    }));

    let versions = CheckCommand::new(&storage).run(&request).await.unwrap();

    assert_eq!(versions, vec![path("folder/file-3.53.tgz")]);
}

#[tokio::test]
async fn previous_latest_path_reports_nothing() {
    let storage = pattern_bucket();
    let request: CheckRequest = request(json!({
        "source": { "bucket": "bucket-name", "regexp": "folder/file-(.*).tgz" },
        "version": { "path": "folder/file-3.53.tgz" }
    }));

    let versions = CheckCommand::new(&storage).run(&request).await.unwrap();

    assert!(versions.is_empty());
}

#[tokio::test]
async fn empty_bucket_reports_nothing_in_either_mode() {
    let storage = FakeStorage::new("bucket-name");

    for source in [
        json!({ "bucket": "bucket-name", "regexp": "folder/file-(.*).tgz" }),
        json!({ "bucket": "bucket-name", "versioned_file": "folder/version" }),
    ] {
        let request: CheckRequest = request(json!({ "source": source }));
        let versions = CheckCommand::new(&storage).run(&request).await.unwrap();
        assert!(versions.is_empty());
    }
}

#[tokio::test]
async fn generation_mode_reports_newer_generations() {
    let storage = FakeStorage::new("bucket-name");
    let first = storage.put("folder/version", b"1".to_vec(), UploadOptions::default());
    let second = storage.put("folder/version", b"2".to_vec(), UploadOptions::default());
    let third = storage.put("folder/version", b"3".to_vec(), UploadOptions::default());

    let request: CheckRequest = request(json!({
        "source": { "bucket": "bucket-name", "versioned_file": "folder/version" },
        "version": { "generation": first.to_string() }
    }));

    let versions = CheckCommand::new(&storage).run(&request).await.unwrap();

    assert_eq!(
        versions,
        vec![
            ObservedVersion::Generation(second),
            ObservedVersion::Generation(third)
        ]
    );
}

#[tokio::test]
async fn generation_mode_with_unknown_previous_reports_nothing() {
    let storage = FakeStorage::new("bucket-name").with_object("folder/version", b"1");

    let request: CheckRequest = request(json!({
        "source": { "bucket": "bucket-name", "versioned_file": "folder/version" },
        "version": { "generation": "999999" }
    }));

    let versions = CheckCommand::new(&storage).run(&request).await.unwrap();

    assert!(versions.is_empty());
}

#[tokio::test]
async fn deleted_generation_is_no_longer_reported() {
    let storage = FakeStorage::new("bucket-name");
    let first = storage.put("folder/version", b"1".to_vec(), UploadOptions::default());
    let second = storage.put("folder/version", b"2".to_vec(), UploadOptions::default());
    storage
        .delete("bucket-name", "folder/version", Some(second))
        .await
        .unwrap();

    let request: CheckRequest = request(json!({
        "source": { "bucket": "bucket-name", "versioned_file": "folder/version" }
    }));

    let versions = CheckCommand::new(&storage).run(&request).await.unwrap();

    assert_eq!(versions, vec![ObservedVersion::Generation(first)]);
}

#[tokio::test]
async fn generation_mode_requires_versioned_bucket() {
    let storage = FakeStorage::new("bucket-name")
        .unversioned()
        .with_object("folder/version", b"1");

    let request: CheckRequest = request(json!({
        "source": { "bucket": "bucket-name", "versioned_file": "folder/version" }
    }));

    let err = CheckCommand::new(&storage).run(&request).await.unwrap_err();

    assert_eq!(err.to_string(), "bucket is not versioned: bucket-name");
}

#[tokio::test]
async fn initial_version_seeds_empty_fixed_object() {
    let storage = FakeStorage::new("bucket-name");

    let request: CheckRequest = request(json!({
        "source": {
            "bucket": "bucket-name",
            "versioned_file": "folder/version",
            "initial_version": "0",
            "initial_content_text": "seed"
        }
    }));

    let versions = CheckCommand::new(&storage).run(&request).await.unwrap();

    assert_eq!(versions, vec![ObservedVersion::Generation(0)]);
}
