use alloc::vec::Vec;

#[allow(unused_imports)]
use micromath::F32Ext;

use crate::config::ScaleMode;

/// Partition of a contiguous FFT bin range into per-bar buckets.
///
/// Holds one inclusive upper bin index per bar. Bar 0 starts at the
/// configured minimum bin; every later bar starts one past the previous
/// bar's boundary. The table is recomputed only when geometry or
/// configuration change, never per tick.
#[derive(Clone, Debug)]
pub struct BandBoundaries {
    boundaries: Vec<usize>,
    min_bin: usize,
    max_bin: usize,
}

impl BandBoundaries {
    /// Compute the boundary table for `bar_count` bars over
    /// `min_bin..=max_bin`.
    ///
    /// Linear mode uses equal-width buckets of
    /// `round((max - min) / bar_count)` bins. Logarithmic mode compresses
    /// resolution at the high end so the low end gets more bins per bar.
    /// In both modes the last boundary is forced to `max_bin` so the range
    /// is fully covered even under rounding.
    pub fn compute(bar_count: usize, min_bin: usize, max_bin: usize, mode: ScaleMode) -> Self {
        let bar_count = bar_count.max(1);
        let max_bin = max_bin.max(min_bin + 1);
        let index_range = max_bin - min_bin;

        let mut boundaries = Vec::with_capacity(bar_count);

        match mode {
            ScaleMode::Linear => {
                let bucket_size = (index_range as f32 / bar_count as f32).round() as usize;
                for i in 1..bar_count {
                    boundaries.push((min_bin + i * bucket_size).min(max_bin));
                }
            }
            ScaleMode::Logarithmic => {
                // boundary[i] = min + range * (1 - log_{n+1}(n + 1 - i)),
                // floored. The log base shifts by one so boundary[0] lands
                // above min_bin even for small bar counts.
                let log_base = ((bar_count + 1) as f32).ln();
                for i in 1..bar_count {
                    let remaining = (bar_count + 1 - i) as f32;
                    let fraction = 1.0 - remaining.ln() / log_base;
                    let offset = (fraction * index_range as f32).floor() as usize;
                    boundaries.push((min_bin + offset).min(max_bin));
                }
            }
        }

        boundaries.push(max_bin);

        Self {
            boundaries,
            min_bin,
            max_bin,
        }
    }

    /// The inclusive upper bin index of each bar, one entry per bar.
    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }

    pub fn bar_count(&self) -> usize {
        self.boundaries.len()
    }

    pub fn min_bin(&self) -> usize {
        self.min_bin
    }

    pub fn max_bin(&self) -> usize {
        self.max_bin
    }

    /// Inclusive `(start, end)` bin range owned by `bar`. May be empty
    /// (`start > end`) when rounding collapses adjacent boundaries.
    pub fn bucket_range(&self, bar: usize) -> (usize, usize) {
        let end = self.boundaries[bar];
        let start = if bar == 0 {
            self.min_bin
        } else {
            self.boundaries[bar - 1] + 1
        };
        (start, end)
    }

    /// A usable table is non-decreasing and ends at `max_bin`. Anything
    /// else means the table was corrupted mid-update; ticks skip the frame
    /// and the next geometry/config change rebuilds it.
    pub fn is_valid(&self) -> bool {
        self.boundaries.windows(2).all(|w| w[0] <= w[1])
            && self.boundaries.last() == Some(&self.max_bin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_boundaries_cover_full_range() {
        let bands = BandBoundaries::compute(4, 0, 512, ScaleMode::Linear);
        assert_eq!(bands.boundaries(), &[128, 256, 384, 512]);
        assert_eq!(bands.bucket_range(0), (0, 128));
        assert_eq!(bands.bucket_range(1), (129, 256));
        assert_eq!(bands.bucket_range(3), (385, 512));
    }

    #[test]
    fn single_bar_spans_whole_range() {
        let bands = BandBoundaries::compute(1, 3, 511, ScaleMode::Linear);
        assert_eq!(bands.boundaries(), &[511]);
        assert_eq!(bands.bucket_range(0), (3, 511));

        let bands = BandBoundaries::compute(1, 3, 511, ScaleMode::Logarithmic);
        assert_eq!(bands.boundaries(), &[511]);
    }

    #[test]
    fn boundaries_non_decreasing_and_end_at_max_for_all_counts() {
        for mode in [ScaleMode::Linear, ScaleMode::Logarithmic] {
            for bar_count in 1..=256 {
                let bands = BandBoundaries::compute(bar_count, 3, 511, mode);
                let b = bands.boundaries();
                assert_eq!(b.len(), bar_count);
                assert!(b.windows(2).all(|w| w[0] <= w[1]), "bars={}", bar_count);
                assert_eq!(*b.last().unwrap(), 511, "bars={}", bar_count);
                assert!(bands.is_valid());
            }
        }
    }

    #[test]
    fn logarithmic_is_denser_at_the_low_end() {
        let linear = BandBoundaries::compute(32, 0, 1023, ScaleMode::Linear);
        let log = BandBoundaries::compute(32, 0, 1023, ScaleMode::Logarithmic);
        // Early log buckets end well below the corresponding linear ones.
        assert!(log.boundaries()[1] < linear.boundaries()[1]);
        assert!(log.boundaries()[0] < linear.boundaries()[0]);
    }

    #[test]
    fn bucket_table_is_cheap_to_index() {
        let bands = BandBoundaries::compute(16, 10, 1000, ScaleMode::Logarithmic);
        let mut prev_end = None;
        for bar in 0..bands.bar_count() {
            let (start, end) = bands.bucket_range(bar);
            if let Some(p) = prev_end {
                assert_eq!(start, p + 1);
            } else {
                assert_eq!(start, 10);
            }
            prev_end = Some(end);
        }
        assert_eq!(prev_end, Some(1000));
    }
}
