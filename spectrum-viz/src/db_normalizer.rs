#[allow(unused_imports)]
use micromath::F32Ext;

use crate::config::{DEFAULT_MAX_DB, DEFAULT_MIN_DB};

/// Converts raw FFT magnitudes to clamped bar heights on a decibel scale.
#[derive(Clone, Copy, Debug)]
pub struct DbNormalizer {
    min_db: f32,
    max_db: f32,
}

impl Default for DbNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DB, DEFAULT_MAX_DB)
    }
}

impl DbNormalizer {
    /// A collapsed or inverted span falls back to the default range rather
    /// than dividing by zero later.
    pub fn new(min_db: f32, max_db: f32) -> Self {
        if max_db > min_db {
            Self { min_db, max_db }
        } else {
            Self {
                min_db: DEFAULT_MIN_DB,
                max_db: DEFAULT_MAX_DB,
            }
        }
    }

    /// Normalized height in canvas units for one magnitude.
    ///
    /// dB = 20*log10(m); a magnitude of zero is treated as -inf and clamps
    /// to the floor. The result is always in `[0, canvas_height]`.
    pub fn height(&self, magnitude: f32, canvas_height: f32) -> f32 {
        if magnitude <= 0.0 {
            return 0.0;
        }
        let db = 20.0 * magnitude.log10();
        let normalized = (db - self.min_db) / (self.max_db - self.min_db);
        normalized.clamp(0.0, 1.0) * canvas_height
    }

    /// Height for a whole bucket: the **maximum** over its bins, not the
    /// average, so a transient spike inside the bucket stays visible.
    pub fn bucket_height(&self, bins: &[f32], canvas_height: f32) -> f32 {
        bins.iter()
            .map(|&m| self.height(m, canvas_height))
            .fold(0.0, f32::max)
    }
}
