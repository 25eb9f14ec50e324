//! End-to-end tests of the fingerprint and cluster engine over real files.

mod common;

use std::fs;

use common::{brand_image, noise_image, write_asset};
use logomatch_core::{
    cluster_assets, fingerprint_directory, ClusterOptions, Domain, Fingerprinter, GraphStrategy,
    HashAlgorithm, LogoMatchError,
};
use tempfile::TempDir;

fn domain(name: &str) -> Domain {
    Domain::parse(name).unwrap()
}

/// Two domains sharing a logo, two unrelated ones, and a corrupt file.
fn populated_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    let brand = brand_image(256, 256);

    write_asset(dir.path(), "acme.com.png", &brand);
    write_asset(dir.path(), "acme-shop.com.png", &brand);
    write_asset(dir.path(), "other.org.png", &noise_image(128, 1));
    write_asset(dir.path(), "third.net.png", &noise_image(128, 2));
    fs::write(dir.path().join("broken.com.png"), b"<html>404 not found</html>").unwrap();
    fs::write(dir.path().join("notes.txt"), b"not an asset").unwrap();

    dir
}

#[test]
fn test_groups_shared_logos() {
    let dir = populated_dir();
    let report = cluster_assets(dir.path(), &ClusterOptions::default()).unwrap();

    assert_eq!(report.fingerprint_count, 4);
    assert_eq!(report.node_count, 4);
    assert_eq!(report.edge_count, 1);
    assert_eq!(report.group_count(), 3);

    let shared: Vec<_> = report.shared_groups().collect();
    assert_eq!(shared.len(), 1);
    assert_eq!(
        shared[0].members,
        vec![domain("acme-shop.com"), domain("acme.com")]
    );
}

#[test]
fn test_corrupt_asset_is_excluded() {
    let dir = populated_dir();
    let report = cluster_assets(dir.path(), &ClusterOptions::default()).unwrap();

    assert!(report.group_of(&domain("broken.com")).is_none());
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].file, "broken.com.png");
    assert!(report.skipped[0].reason.contains("decode"));
}

#[test]
fn test_repeated_runs_are_identical() {
    let dir = populated_dir();
    let options = ClusterOptions::default();

    let first = cluster_assets(dir.path(), &options).unwrap();
    let second = cluster_assets(dir.path(), &options).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_strategies_agree_on_directory() {
    let dir = populated_dir();
    let exhaustive = cluster_assets(dir.path(), &ClusterOptions::default()).unwrap();
    let bucketed = cluster_assets(
        dir.path(),
        &ClusterOptions {
            strategy: GraphStrategy::Bucketed,
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(exhaustive.edge_count, bucketed.edge_count);
    assert_eq!(exhaustive.groups, bucketed.groups);
}

#[test]
fn test_blockhash_algorithm() {
    let dir = populated_dir();
    let options = ClusterOptions {
        algorithm: HashAlgorithm::Blockhash64,
        ..Default::default()
    };
    let report = cluster_assets(dir.path(), &options).unwrap();

    assert_eq!(report.algorithm, HashAlgorithm::Blockhash64);
    assert_eq!(report.node_count, 4);
    assert!(report
        .group_of(&domain("acme.com"))
        .unwrap()
        .contains(&domain("acme-shop.com")));
}

#[test]
fn test_jpeg_assets_are_read() {
    let dir = TempDir::new().unwrap();
    write_asset(dir.path(), "photo.com.jpg", &brand_image(128, 128));
    write_asset(dir.path(), "pic.com.JPEG", &brand_image(128, 128));

    let set = fingerprint_directory(dir.path(), &Fingerprinter::default()).unwrap();
    assert_eq!(set.len(), 2);
    assert!(set.fingerprints.contains_key(&domain("photo.com")));
    assert!(set.fingerprints.contains_key(&domain("pic.com")));
}

#[test]
fn test_duplicate_domain_keeps_first_file() {
    let dir = TempDir::new().unwrap();
    write_asset(dir.path(), "dup.com.jpg", &brand_image(64, 64));
    write_asset(dir.path(), "dup.com.png", &noise_image(64, 9));

    let set = fingerprint_directory(dir.path(), &Fingerprinter::default()).unwrap();
    assert_eq!(set.len(), 1);
    assert_eq!(set.skipped.len(), 1);
    assert_eq!(set.skipped[0].file, "dup.com.png");
}

#[test]
fn test_empty_directory() {
    let dir = TempDir::new().unwrap();
    let report = cluster_assets(dir.path(), &ClusterOptions::default()).unwrap();
    assert_eq!(report.node_count, 0);
    assert_eq!(report.edge_count, 0);
    assert!(report.groups.is_empty());
}

#[test]
fn test_missing_directory_aborts() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("logos");
    assert!(matches!(
        cluster_assets(&missing, &ClusterOptions::default()),
        Err(LogoMatchError::MissingAssetDirectory(_))
    ));
}
