//! Band index for near-duplicate candidate generation.
//!
//! A 64-bit fingerprint is cut into `threshold + 1` disjoint bands. Two
//! fingerprints within `threshold` differing bits cannot differ in every
//! band, so they share at least one band value exactly. Bucketing by
//! `(band, value)` therefore yields a superset of all qualifying pairs;
//! callers verify each candidate with the real distance.

use std::collections::{BTreeSet, HashMap};

use crate::fingerprint::FINGERPRINT_BITS;

/// One band: the bits `(value >> shift) & mask`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub shift: u32,
    pub mask: u64,
}

impl Band {
    fn key(&self, bits: u64) -> u64 {
        (bits >> self.shift) & self.mask
    }
}

/// Split 64 bits into `threshold + 1` contiguous bands of near-equal width.
///
/// Returns `None` when there would be more bands than bits; at that point
/// every pair is a candidate and the index is useless.
pub fn band_layout(threshold: u32) -> Option<Vec<Band>> {
    let bands = threshold.checked_add(1)?;
    if bands > FINGERPRINT_BITS {
        return None;
    }

    let base = FINGERPRINT_BITS / bands;
    let extra = FINGERPRINT_BITS % bands;
    let mut shift = 0;

    let layout = (0..bands)
        .map(|i| {
            let width = base + u32::from(i < extra);
            let mask = if width == 64 { u64::MAX } else { (1u64 << width) - 1 };
            let band = Band { shift, mask };
            shift += width;
            band
        })
        .collect();

    Some(layout)
}

/// Index from band values to the positions of the fingerprints carrying them.
#[derive(Debug, Clone)]
pub struct BandIndex {
    layout: Vec<Band>,
    buckets: HashMap<(usize, u64), Vec<usize>>,
}

impl BandIndex {
    /// Index `fingerprints` (by position) for the given threshold.
    pub fn build(fingerprints: &[u64], threshold: u32) -> Option<Self> {
        let layout = band_layout(threshold)?;
        let mut buckets: HashMap<(usize, u64), Vec<usize>> = HashMap::new();

        for (pos, &bits) in fingerprints.iter().enumerate() {
            for (band_idx, band) in layout.iter().enumerate() {
                buckets
                    .entry((band_idx, band.key(bits)))
                    .or_default()
                    .push(pos);
            }
        }

        Some(Self { layout, buckets })
    }

    pub fn band_count(&self) -> usize {
        self.layout.len()
    }

    /// Unordered position pairs `(i, j)` with `i < j` sharing any bucket.
    pub fn candidate_pairs(&self) -> BTreeSet<(usize, usize)> {
        let mut pairs = BTreeSet::new();
        for members in self.buckets.values() {
            for (a, &i) in members.iter().enumerate() {
                for &j in &members[a + 1..] {
                    pairs.insert((i.min(j), i.max(j)));
                }
            }
        }
        pairs
    }
}
