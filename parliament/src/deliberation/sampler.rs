//! Stratified temperature sampling.
//!
//! The range `[lo, hi]` is cut into `n` equal-width bands and exactly one
//! value is drawn from each band, so coverage of the whole range is
//! structural rather than probabilistic. The draws are shuffled before they
//! are handed out so band position is not tied to seat order.
//!
//! # Rounding
//!
//! Band `i` spans `[lo + i*w, lo + (i+1)*w)` with `w = (hi - lo) / n`. The
//! integer draw bounds round both edges down, so band `i` draws from
//! `floor(lo + i*w) ..= floor(lo + (i+1)*w)`. Neighbouring bands therefore
//! share one integer endpoint and two adjacent draws may tie. Since each
//! band's upper bound is the next band's lower bound, the unshuffled draws are
//! non-decreasing, and the sorted sample has exactly one value inside each
//! band's bounds.

use rand::seq::SliceRandom;
use rand::Rng;

/// Inclusive integer draw bounds of one band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    /// Band index (0-based, lowest band first).
    pub index: usize,
    /// Lowest value a draw from this band can take.
    pub low: u32,
    /// Highest value a draw from this band can take.
    pub high: u32,
}

impl Band {
    /// Whether `value` lies inside this band's draw bounds.
    pub fn contains(&self, value: u32) -> bool {
        (self.low..=self.high).contains(&value)
    }
}

/// Compute the integer draw bounds of the `n` bands covering `[lo, hi]`.
///
/// Edges are computed in integers, so the first band starts at `lo` and the
/// last ends at `hi` exactly. An inverted range is read as `[hi, lo]`.
pub fn band_bounds(n: usize, lo: u32, hi: u32) -> Vec<Band> {
    let (lo, hi) = (lo.min(hi), lo.max(hi));
    if n == 0 {
        return Vec::new();
    }

    let span = u64::from(hi - lo);
    let n_wide = n as u64;
    let edge = |i: u64| lo + (i * span / n_wide) as u32;
    (0..n)
        .map(|i| Band {
            index: i,
            low: edge(i as u64),
            high: edge(i as u64 + 1),
        })
        .collect()
}

/// Draw one value per band and return them in shuffled order.
///
/// Returns `n` values, each in `[lo, hi]`. `lo == hi` yields `lo` in every
/// slot; `n == 0` yields an empty vector.
pub fn stratified_sample<R: Rng + ?Sized>(rng: &mut R, n: usize, lo: u32, hi: u32) -> Vec<u32> {
    let (lo, hi) = (lo.min(hi), lo.max(hi));
    let mut draws: Vec<u32> = band_bounds(n, lo, hi)
        .into_iter()
        .map(|band| rng.gen_range(band.low..=band.high))
        .collect();

    draws.shuffle(rng);
    draws
}
