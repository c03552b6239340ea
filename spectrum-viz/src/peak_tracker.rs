use alloc::{vec, vec::Vec};

/// Per-bar peak heights with hold/decay behavior across ticks.
///
/// A peak rises instantly to any new height at or above it. On a falling
/// height `h` it decays as `(h + fall_factor * peak) / (fall_factor + 1)`,
/// so larger fall factors fall slower. Deterministic for a given height
/// sequence and fall factor.
#[derive(Clone, Debug)]
pub struct PeakTracker {
    peaks: Vec<f32>,
    fall_factor: f32,
}

impl PeakTracker {
    pub fn new(bar_count: usize, fall_factor: f32) -> Self {
        Self {
            peaks: vec![0.0; bar_count],
            fall_factor: fall_factor.max(0.0),
        }
    }

    /// Drop all held peaks and resize to a new bar count.
    pub fn reset(&mut self, bar_count: usize) {
        self.peaks.clear();
        self.peaks.resize(bar_count, 0.0);
    }

    pub fn set_fall_factor(&mut self, fall_factor: f32) {
        self.fall_factor = fall_factor.max(0.0);
    }

    pub fn bar_count(&self) -> usize {
        self.peaks.len()
    }

    /// Feed this tick's raw height for `bar` and return the updated peak.
    pub fn update(&mut self, bar: usize, height: f32) -> f32 {
        let height = height.max(0.0);
        let peak = &mut self.peaks[bar];
        if height >= *peak {
            *peak = height;
        } else {
            *peak = (height + self.fall_factor * *peak) / (self.fall_factor + 1.0);
        }
        *peak
    }

    pub fn peak(&self, bar: usize) -> f32 {
        self.peaks[bar]
    }

    pub fn peaks(&self) -> &[f32] {
        &self.peaks
    }

    /// Whether every peak has decayed below `epsilon` canvas units.
    pub fn all_settled(&self, epsilon: f32) -> bool {
        self.peaks.iter().all(|&p| p <= epsilon)
    }

    /// Cap held peaks after the canvas shrinks so no peak can sit above
    /// the control.
    pub fn clamp_to(&mut self, max_height: f32) {
        for peak in &mut self.peaks {
            *peak = peak.min(max_height);
        }
    }
}
