//! CLI integration tests for logomatch-cli.
//!
//! These tests run the actual binary against temporary inventories and asset
//! directories and check outputs and exit codes.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use image::{DynamicImage, ImageBuffer, Rgb, RgbImage};
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the logomatch binary with a clean environment.
fn logomatch() -> Command {
    let mut cmd = Command::cargo_bin("logomatch").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    for key in [
        "LOGOMATCH_ASSET_DIR",
        "LOGOMATCH_THRESHOLD",
        "LOGOMATCH_ALGORITHM",
        "LOGOMATCH_STRATEGY",
        "LOGOMATCH_CONCURRENCY",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

/// Seeded blocky image; equal seeds give equal pixels.
fn logo(seed: u64) -> DynamicImage {
    let img: RgbImage = ImageBuffer::from_fn(96, 96, |x, y| {
        let mut v = seed ^ u64::from((y / 12) * 64 + x / 12).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        v ^= v >> 33;
        v = v.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
        v ^= v >> 33;
        Rgb([(v & 0xFF) as u8, ((v >> 8) & 0xFF) as u8, ((v >> 16) & 0xFF) as u8])
    });
    DynamicImage::ImageRgb8(img)
}

/// acme.com and acme-shop.com share a logo; other.org has its own.
fn asset_dir() -> TempDir {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();
    logo(1).save(dir.join("acme.com.png")).unwrap();
    logo(1).save(dir.join("acme-shop.com.png")).unwrap();
    logo(2).save(dir.join("other.org.png")).unwrap();
    temp
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_help_displays_usage() {
    logomatch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Group web domains that share a logo"))
        .stdout(predicate::str::contains("normalize"))
        .stdout(predicate::str::contains("locate"))
        .stdout(predicate::str::contains("scrape"))
        .stdout(predicate::str::contains("cluster"))
        .stdout(predicate::str::contains("run"));
}

#[test]
fn test_version_displays_version() {
    logomatch()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("logomatch"));
}

#[test]
fn test_help_shows_exit_codes() {
    logomatch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exit codes:"))
        .stdout(predicate::str::contains("64"))
        .stdout(predicate::str::contains("66"));
}

#[test]
fn test_cluster_help_shows_options() {
    logomatch()
        .args(["cluster", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--assets"))
        .stdout(predicate::str::contains("--threshold"))
        .stdout(predicate::str::contains("--algorithm"))
        .stdout(predicate::str::contains("--strategy"))
        .stdout(predicate::str::contains("--format"));
}

#[test]
fn test_scrape_help_offers_skip_existing() {
    logomatch()
        .args(["scrape", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--skip-existing"))
        .stdout(predicate::str::contains("--force").not());
}

// ============================================================================
// Exit Code Tests
// ============================================================================

#[test]
fn test_missing_asset_directory_returns_input_error() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("logos");

    // Exit code 66 = EX_NOINPUT
    logomatch()
        .args(["cluster", "--assets", path_arg(&missing)])
        .assert()
        .code(66)
        .stderr(predicate::str::contains("Asset directory not found"));
}

#[test]
fn test_missing_inventory_returns_input_error() {
    logomatch()
        .args(["normalize", "nonexistent_inventory.csv"])
        .assert()
        .code(66)
        .stderr(predicate::str::contains("Failed to load inventory"));
}

#[test]
fn test_threshold_out_of_range_returns_usage_error() {
    let assets = asset_dir();
    logomatch()
        .args(["cluster", "--assets", path_arg(assets.path()), "--threshold", "65"])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("threshold"));
}

#[test]
fn test_unknown_algorithm_returns_usage_error() {
    logomatch()
        .args(["cluster", "--algorithm", "md5"])
        .assert()
        .code(64);
}

// ============================================================================
// Normalize and Locate Tests
// ============================================================================

#[test]
fn test_normalize_sorts_and_dedupes() {
    let temp = TempDir::new().unwrap();
    let inventory = temp.path().join("domains.txt");
    fs::write(
        &inventory,
        "zeta.io\n  Alpha.com \n# comment\n\nhttps://alpha.com/\nzeta.io\nbad domain\n",
    )
    .unwrap();

    logomatch()
        .args(["normalize", path_arg(&inventory)])
        .assert()
        .success()
        .stdout("https://alpha.com/\nhttps://zeta.io/\n");
}

#[test]
fn test_normalize_csv_inventory() {
    let temp = TempDir::new().unwrap();
    let inventory = temp.path().join("domains.csv");
    fs::write(&inventory, "rank,domain\n1,b.org\n2,a.org\n").unwrap();

    logomatch()
        .args(["--quiet", "normalize", path_arg(&inventory)])
        .assert()
        .success()
        .stdout("https://a.org/\nhttps://b.org/\n");
}

#[test]
fn test_locate_resolves_relative_logo() {
    let temp = TempDir::new().unwrap();
    let page = temp.path().join("page.html");
    fs::write(
        &page,
        r#"<html><head><meta property="og:image" content="/social.png"></head>
           <body><img class="header-logo" src="assets/logo.svg"></body></html>"#,
    )
    .unwrap();

    logomatch()
        .args([
            "locate",
            path_arg(&page),
            "--base-url",
            "https://example.com/about/",
        ])
        .assert()
        .success()
        .stdout("https://example.com/about/assets/logo.svg\n");
}

// ============================================================================
// Cluster Tests
// ============================================================================

#[test]
fn test_cluster_text_output() {
    let assets = asset_dir();

    logomatch()
        .args(["cluster", "--assets", path_arg(assets.path())])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fingerprints: 3"))
        .stdout(predicate::str::contains("Nodes: 3"))
        .stdout(predicate::str::contains("Edges: 1"))
        .stdout(predicate::str::contains("Group 1: acme-shop.com, acme.com"))
        .stdout(predicate::str::contains("Group 2: other.org"))
        .stdout(predicate::str::contains("Total groups: 2"));
}

#[test]
fn test_cluster_quiet_prints_groups_only() {
    let assets = asset_dir();

    logomatch()
        .args(["--quiet", "cluster", "--assets", path_arg(assets.path())])
        .assert()
        .success()
        .stdout("Group 1: acme-shop.com, acme.com\nGroup 2: other.org\n");
}

#[test]
fn test_cluster_json_output() {
    let assets = asset_dir();
    fs::write(assets.path().join("broken.net.png"), b"not a png").unwrap();

    let output = logomatch()
        .args([
            "cluster",
            "--assets",
            path_arg(assets.path()),
            "--strategy",
            "bucketed",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["algorithm"], "phash");
    assert_eq!(report["strategy"], "bucketed");
    assert_eq!(report["threshold"], 5);
    assert_eq!(report["node_count"], 3);
    assert_eq!(report["edge_count"], 1);
    assert_eq!(report["groups"].as_array().unwrap().len(), 2);
    assert_eq!(report["groups"][0]["members"][0], "acme-shop.com");
    assert_eq!(report["skipped"][0]["file"], "broken.net.png");
}

#[test]
fn test_cluster_output_is_reproducible() {
    let assets = asset_dir();
    let run = || {
        logomatch()
            .args(["cluster", "--assets", path_arg(assets.path()), "--format", "json"])
            .output()
            .unwrap()
            .stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn test_cluster_reads_asset_dir_from_env() {
    let assets = asset_dir();

    logomatch()
        .env("LOGOMATCH_ASSET_DIR", path_arg(assets.path()))
        .args(["--quiet", "cluster"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Group 2: other.org"));
}
