//! Perceptual fingerprints for logo images.
//!
//! Each persisted logo is reduced to a 64-bit perceptual hash. Visually
//! identical images produce identical or near-identical hashes even after
//! recompression, resizing or small colour shifts, so the Hamming distance
//! between two fingerprints is a cheap similarity measure.
//!
//! # Algorithms
//!
//! - [`HashAlgorithm::PHash`] (default): DCT-based hash from `image_hasher`,
//!   keeping the 8x8 low-frequency block.
//! - [`HashAlgorithm::Blockhash64`]: grid-based blockhash.
//!
//! # Usage
//!
//! ```no_run
//! use logomatch_core::fingerprint::{Fingerprinter, HashAlgorithm};
//!
//! # fn main() -> logomatch_core::Result<()> {
//! let hasher = Fingerprinter::new(HashAlgorithm::PHash);
//! let a = hasher.hash_file("logos/example.com.png".as_ref())?;
//! let b = hasher.hash_file("logos/example.org.png".as_ref())?;
//! let similar = a.distance(&b) <= 5;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use blockhash::{blockhash64, Blockhash64};
use image::DynamicImage;
use image_hasher::{HashAlg, HasherConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::Domain;
use crate::error::{LogoMatchError, Result};

/// Fingerprint size in bits.
pub const FINGERPRINT_BITS: u32 = 64;

/// Side of the low-frequency block kept from the DCT.
const PHASH_SIZE: u32 = 8;

/// Asset file extensions the engine reads.
pub const ASSET_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Perceptual hash algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// Frequency-domain perceptual hash.
    #[default]
    PHash,
    /// Blockhash with a 64-bit output.
    Blockhash64,
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PHash => f.write_str("phash"),
            Self::Blockhash64 => f.write_str("blockhash64"),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = LogoMatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "phash" => Ok(Self::PHash),
            "blockhash" | "blockhash64" => Ok(Self::Blockhash64),
            other => Err(LogoMatchError::Config(format!(
                "Unknown hash algorithm: {other}"
            ))),
        }
    }
}

/// A 64-bit perceptual hash with the algorithm that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    pub bits: u64,
    pub algorithm: HashAlgorithm,
}

impl Fingerprint {
    pub fn new(bits: u64, algorithm: HashAlgorithm) -> Self {
        Self { bits, algorithm }
    }

    /// Number of differing bits between two fingerprints.
    ///
    /// Symmetric, and zero for a fingerprint compared with itself.
    /// Fingerprints of different algorithms are not comparable; callers keep
    /// one algorithm per run.
    pub fn distance(&self, other: &Self) -> u32 {
        debug_assert_eq!(self.algorithm, other.algorithm);
        (self.bits ^ other.bits).count_ones()
    }

    /// Check whether two fingerprints are within `threshold` bits.
    pub fn is_similar(&self, other: &Self, threshold: u32) -> bool {
        self.distance(other) <= threshold
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bits.to_be_bytes())
    }

    pub fn from_hex(hex_str: &str, algorithm: HashAlgorithm) -> Result<Self> {
        let bytes: [u8; 8] = hex::decode(hex_str)
            .map_err(|e| LogoMatchError::Fingerprint(format!("Invalid hex string: {e}")))?
            .try_into()
            .map_err(|v: Vec<u8>| {
                LogoMatchError::Fingerprint(format!("Expected 8 bytes, got {}", v.len()))
            })?;
        Ok(Self::new(u64::from_be_bytes(bytes), algorithm))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex())
    }
}

/// Computes fingerprints with a fixed algorithm.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fingerprinter {
    algorithm: HashAlgorithm,
}

impl Fingerprinter {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Decode raw image bytes (format sniffed from content) and hash them.
    pub fn hash_bytes(&self, image_data: &[u8]) -> Result<Fingerprint> {
        let image = image::load_from_memory(image_data)
            .map_err(|e| LogoMatchError::Fingerprint(format!("Failed to decode image: {e}")))?;

        self.hash_image(&image)
    }

    pub fn hash_file(&self, path: &Path) -> Result<Fingerprint> {
        let data = std::fs::read(path)?;
        self.hash_bytes(&data)
    }

    pub fn hash_image(&self, image: &DynamicImage) -> Result<Fingerprint> {
        if image.width() == 0 || image.height() == 0 {
            return Err(LogoMatchError::Fingerprint("Image has no pixels".into()));
        }

        let bits = match self.algorithm {
            HashAlgorithm::PHash => phash(image)?,
            HashAlgorithm::Blockhash64 => {
                let hash: Blockhash64 = blockhash64(image);
                let bytes: [u8; 8] = hash.into();
                u64::from_be_bytes(bytes)
            }
        };

        Ok(Fingerprint::new(bits, self.algorithm))
    }

    /// Check if the provided bytes appear to be a decodable image format.
    pub fn is_supported_format(data: &[u8]) -> bool {
        image::guess_format(data).is_ok()
    }
}

/// DCT hash over the 8x8 low-frequency block, thresholded at the median.
fn phash(image: &DynamicImage) -> Result<u64> {
    let hasher = HasherConfig::new()
        .hash_size(PHASH_SIZE, PHASH_SIZE)
        .preproc_dct()
        .hash_alg(HashAlg::Median)
        .to_hasher();

    let hash = hasher.hash_image(image);
    let bytes: [u8; 8] = hash.as_bytes().try_into().map_err(|_| {
        LogoMatchError::Fingerprint(format!(
            "Expected a 64-bit pHash, got {} bytes",
            hash.as_bytes().len()
        ))
    })?;
    Ok(u64::from_be_bytes(bytes))
}

/// A persisted asset that could not be fingerprinted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedAsset {
    pub file: String,
    pub reason: String,
}

/// Fingerprints for every usable asset in a directory, keyed by domain.
#[derive(Debug, Clone, Default)]
pub struct FingerprintSet {
    pub algorithm: HashAlgorithm,
    pub fingerprints: BTreeMap<Domain, Fingerprint>,
    pub skipped: Vec<SkippedAsset>,
}

impl FingerprintSet {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }

    pub fn insert(&mut self, domain: Domain, fingerprint: Fingerprint) -> Option<Fingerprint> {
        self.fingerprints.insert(domain, fingerprint)
    }
}

/// Split an asset file name into its domain, if it has an asset extension.
pub fn asset_domain(file_name: &str) -> Option<Result<Domain>> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    let ext = ext.to_lowercase();
    if !ASSET_EXTENSIONS.contains(&ext.as_str()) {
        return None;
    }
    Some(Domain::parse(stem))
}

/// Fingerprint every `{domain}.png|jpg|jpeg` file in `dir`.
///
/// Files are visited in sorted name order. Decode or hash failures are
/// recorded in [`FingerprintSet::skipped`] and never abort the scan; only a
/// missing or unreadable directory is an error.
pub fn fingerprint_directory(dir: &Path, hasher: &Fingerprinter) -> Result<FingerprintSet> {
    if !dir.is_dir() {
        return Err(LogoMatchError::MissingAssetDirectory(dir.to_path_buf()));
    }

    let mut files: Vec<(String, PathBuf)> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            Some((name, entry.path()))
        })
        .collect();
    files.sort();

    let mut set = FingerprintSet::new(hasher.algorithm());

    for (name, path) in files {
        let domain = match asset_domain(&name) {
            None => continue,
            Some(Ok(domain)) => domain,
            Some(Err(e)) => {
                warn!(file = %name, error = %e, "Skipping asset with invalid name");
                set.skipped.push(SkippedAsset {
                    file: name,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if set.fingerprints.contains_key(&domain) {
            warn!(file = %name, domain = %domain, "Duplicate asset for domain, keeping first");
            set.skipped.push(SkippedAsset {
                file: name,
                reason: format!("duplicate asset for {domain}"),
            });
            continue;
        }

        match hasher.hash_file(&path) {
            Ok(fingerprint) => {
                debug!(domain = %domain, fingerprint = %fingerprint, "Fingerprinted asset");
                set.insert(domain, fingerprint);
            }
            Err(e) => {
                warn!(file = %name, error = %e, "Skipping asset");
                set.skipped.push(SkippedAsset {
                    file: name,
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        dir = %dir.display(),
        fingerprints = set.len(),
        skipped = set.skipped.len(),
        algorithm = %set.algorithm,
        "Fingerprinted asset directory"
    );

    Ok(set)
}
