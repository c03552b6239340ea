use alloc::{vec, vec::Vec};

/// Contract the external audio player must fulfil.
///
/// The source computes the FFT; this crate only consumes magnitude
/// snapshots. `try_fill_magnitudes` fills a caller-provided buffer of
/// agreed length and returns `false` when no new data is available this
/// tick, in which case the caller keeps its previous frame.
pub trait AudioSource {
    fn is_playing(&self) -> bool;

    /// Copy the current magnitude snapshot into `buf`. Returns `false` if
    /// the source has nothing new; `buf` must be left untouched then.
    fn try_fill_magnitudes(&mut self, buf: &mut [f32]) -> bool;

    /// Map a frequency in Hz to a bin index for the current transform size.
    fn frequency_to_bin_index(&self, hz: u32) -> usize;
}

/// Owns the per-tick magnitude snapshot.
///
/// The source may be fed from another execution context (a playback
/// thread); copying into a sampler-owned buffer once per tick is what
/// keeps the rest of the pipeline single-writer/single-reader. Everything
/// downstream only ever sees this one consistent frame.
#[derive(Clone, Debug)]
pub struct SpectrumSampler {
    frame: Vec<f32>,
}

impl SpectrumSampler {
    /// `frame_len` must cover the highest bin the bucket table references
    /// (`max_bin + 1` entries).
    pub fn new(frame_len: usize) -> Self {
        Self {
            frame: vec![0.0; frame_len],
        }
    }

    /// Resize the snapshot buffer after the frequency range changed.
    /// Existing content is discarded.
    pub fn resize(&mut self, frame_len: usize) {
        self.frame.clear();
        self.frame.resize(frame_len, 0.0);
    }

    /// Obtain this tick's frame.
    ///
    /// Not playing: the frame becomes silence without touching the source,
    /// so held peaks can decay to rest. Playing but no fresh data: the
    /// previous frame is reused rather than stalling the animation.
    pub fn sample<S: AudioSource>(&mut self, source: &mut S) {
        if !source.is_playing() {
            self.frame.fill(0.0);
            return;
        }
        let _ = source.try_fill_magnitudes(&mut self.frame);
    }

    pub fn frame(&self) -> &[f32] {
        &self.frame
    }

    /// Mutable access for the Smoothed style's pre-attenuation pass.
    pub fn frame_mut(&mut self) -> &mut [f32] {
        &mut self.frame
    }

    pub fn frame_len(&self) -> usize {
        self.frame.len()
    }
}
