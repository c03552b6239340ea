use alloc::vec::Vec;

use embedded_graphics::{draw_target::DrawTarget, pixelcolor::Rgb888};

#[cfg(feature = "logging")]
use defmt::info;
#[cfg(feature = "logging")]
use defmt_rtt as _;

use crate::band_boundaries::BandBoundaries;
use crate::bar_layout::BarLayout;
use crate::config::{AnimationStyle, ScaleMode, VisualizerConfig, MAX_FREQUENCY_BIN, PEAK_SETTLE_EPSILON};
use crate::db_normalizer::DbNormalizer;
use crate::error::FrameError;
use crate::peak_tracker::PeakTracker;
use crate::render_scheduler::RenderScheduler;
use crate::renderer::{BarRenderer, Renderer};
use crate::spectrum_sampler::{AudioSource, SpectrumSampler};
use crate::types::BarDescriptor;

/// Owns the whole pipeline and its state: config, snapshot buffer, bucket
/// table, peaks, layout and scheduler.
///
/// The host wires it to three collaborators: an [`AudioSource`], a display
/// surface (via the `surface_*` lifecycle calls) and the host window (via
/// [`window_state_changed`](Self::window_state_changed)). Per tick the
/// analyzer samples a magnitude frame, reduces each bucket to a dB height,
/// updates peak decay and refreshes the bar rectangles. Bucket boundaries
/// and layout are recomputed only when geometry or configuration change.
pub struct SpectrumAnalyzer<S: AudioSource> {
    config: VisualizerConfig,
    source: Option<S>,
    sampler: SpectrumSampler,
    boundaries: Option<BandBoundaries>,
    normalizer: DbNormalizer,
    peaks: PeakTracker,
    layout: BarLayout,
    scheduler: RenderScheduler,
    renderer: BarRenderer,
    bars: Vec<BarDescriptor>,
    canvas_width: u32,
    canvas_height: u32,
    surface_loaded: bool,
}

impl<S: AudioSource> SpectrumAnalyzer<S> {
    pub fn new(mut config: VisualizerConfig) -> Self {
        config.clamp();
        let normalizer = DbNormalizer::new(config.min_db, config.max_db);
        let peaks = PeakTracker::new(0, config.peak_fall_factor);
        let scheduler = RenderScheduler::new(config.refresh_interval_ms);
        let renderer = BarRenderer::new(config.bar_color, config.draw_peak_markers);
        let layout = BarLayout::compute(0, 0, &config);
        Self {
            config,
            source: None,
            sampler: SpectrumSampler::new(0),
            boundaries: None,
            normalizer,
            peaks,
            layout,
            scheduler,
            renderer,
            bars: Vec::new(),
            canvas_width: 0,
            canvas_height: 0,
            surface_loaded: false,
        }
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Bar state as of the last completed tick.
    pub fn bars(&self) -> &[BarDescriptor] {
        &self.bars
    }

    // ---- collaborator wiring -------------------------------------------

    /// Hand the audio source to the analyzer. Any previously attached
    /// source is detached first; the bucket table is derived from the new
    /// source's frequency mapping.
    pub fn attach_source(&mut self, source: S) {
        self.detach_source();
        self.source = Some(source);
        self.rebuild_layout();
        self.reevaluate();
        #[cfg(feature = "logging")]
        info!("audio source attached");
    }

    /// Take the source back, stopping the tick timer.
    pub fn detach_source(&mut self) -> Option<S> {
        let source = self.source.take();
        self.boundaries = None;
        self.scheduler.stop();
        source
    }

    /// The display surface became available at the given size. Registers
    /// the scheduler with the surface/window lifecycle.
    pub fn surface_loaded(&mut self, width: u32, height: u32) {
        self.surface_loaded = true;
        self.canvas_width = width;
        self.canvas_height = height;
        self.scheduler.attach();
        self.rebuild_layout();
        self.update_surface_gate();
        self.reevaluate();
    }

    /// The display surface is going away. Always unregisters, so no tick
    /// can fire into a torn-down surface.
    pub fn surface_unloaded(&mut self) {
        self.surface_loaded = false;
        self.scheduler.detach();
    }

    pub fn surface_resized(&mut self, width: u32, height: u32) {
        self.canvas_width = width;
        self.canvas_height = height;
        self.rebuild_layout();
        self.update_surface_gate();
        self.reevaluate();
    }

    /// Host window activation state: `active` is false while minimized or
    /// deactivated, which gates the scheduler off.
    pub fn window_state_changed(&mut self, active: bool) {
        self.scheduler.set_window_active(active);
        self.reevaluate();
    }

    /// The source's playback state flipped; gives a stopped scheduler the
    /// chance to start again.
    pub fn playback_state_changed(&mut self) {
        self.reevaluate();
    }

    // ---- configuration surface -----------------------------------------

    pub fn set_bar_count(&mut self, bar_count: usize) {
        self.config.bar_count = bar_count.max(1);
        self.rebuild_layout();
    }

    pub fn set_bar_width(&mut self, bar_width: f32) {
        self.config.bar_width = bar_width.max(0.0);
        self.rebuild_layout();
    }

    pub fn set_bar_spacing(&mut self, bar_spacing: f32) {
        self.config.bar_spacing = bar_spacing.max(0.0);
        self.rebuild_layout();
    }

    pub fn set_scale_mode(&mut self, mode: ScaleMode) {
        self.config.scale_mode = mode;
        self.rebuild_layout();
    }

    pub fn set_frequency_range(&mut self, min_hz: u32, max_hz: u32) {
        self.config.min_frequency_hz = min_hz;
        self.config.max_frequency_hz = max_hz.max(min_hz + 1);
        self.rebuild_layout();
    }

    pub fn set_refresh_interval_ms(&mut self, interval_ms: u32) {
        self.scheduler.set_interval_ms(interval_ms);
        self.config.refresh_interval_ms = self.scheduler.interval_ms();
    }

    pub fn set_animation_style(&mut self, style: AnimationStyle) {
        self.config.animation_style = style;
    }

    pub fn set_db_range(&mut self, min_db: f32, max_db: f32) {
        self.normalizer = DbNormalizer::new(min_db, max_db);
        self.config.min_db = min_db;
        self.config.max_db = max_db;
        self.config.clamp();
    }

    pub fn set_peak_fall_factor(&mut self, fall_factor: f32) {
        self.config.peak_fall_factor = fall_factor.max(0.0);
        self.peaks.set_fall_factor(self.config.peak_fall_factor);
    }

    pub fn set_bar_color(&mut self, color: Rgb888) {
        self.config.bar_color = color;
        self.renderer.set_color(color);
    }

    pub fn set_smoothing_attenuation(&mut self, attenuation: f32) {
        self.config.smoothing_attenuation = attenuation.max(0.0);
    }

    pub fn set_draw_peak_markers(&mut self, draw: bool) {
        self.config.draw_peak_markers = draw;
        self.renderer.set_draw_peak_markers(draw);
    }

    // ---- ticking --------------------------------------------------------

    /// Account for elapsed wall time on the render timeline; runs one full
    /// pipeline tick when due. Returns whether a tick ran.
    pub fn advance(&mut self, elapsed_ms: u32) -> bool {
        if self.scheduler.advance(elapsed_ms) {
            self.tick();
            true
        } else {
            false
        }
    }

    /// Draw the bars from the last tick onto the target.
    pub fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        self.renderer.draw(target, &self.bars)
    }

    fn tick(&mut self) {
        if let Err(_skipped) = self.run_tick() {
            // Expected transient under a resize/tick race; the frame is
            // dropped and the loop keeps going.
            #[cfg(feature = "logging")]
            info!("frame skipped: {}", defmt::Debug2Format(&_skipped));
        }
    }

    fn run_tick(&mut self) -> Result<(), FrameError> {
        let (Some(source), Some(bands)) = (&mut self.source, &self.boundaries) else {
            return Ok(());
        };

        if !bands.is_valid() {
            return Err(FrameError::CorruptBoundaries);
        }
        let needed = bands.max_bin() + 1;
        if self.sampler.frame_len() < needed {
            return Err(FrameError::FrameTooShort {
                needed,
                available: self.sampler.frame_len(),
            });
        }

        let playing = source.is_playing();
        self.sampler.sample(source);

        // The Smoothed style bleeds a little energy out of the raw
        // magnitudes each tick so transients land softly.
        if playing && self.config.animation_style == AnimationStyle::Smoothed {
            let attenuation = self.config.smoothing_attenuation;
            if attenuation > 0.0 {
                for magnitude in self.sampler.frame_mut() {
                    *magnitude = (*magnitude - attenuation).max(0.0);
                }
            }
        }

        let canvas_height = self.canvas_height as f32;
        self.bars.clear();

        for bar in 0..bands.bar_count() {
            let (start_bin, end_bin) = bands.bucket_range(bar);
            let raw = if !playing || start_bin > end_bin {
                // Paused: heights drop to zero so the peaks fall to rest.
                0.0
            } else {
                let bins = self
                    .sampler
                    .frame()
                    .get(start_bin..=end_bin)
                    .ok_or(FrameError::FrameTooShort {
                        needed: end_bin + 1,
                        available: self.sampler.frame_len(),
                    })?;
                self.normalizer
                    .bucket_height(bins, canvas_height)
                    .min(canvas_height)
            };

            let peak = self.peaks.update(bar, raw);
            let drawn = match self.config.animation_style {
                AnimationStyle::Sharp => raw,
                AnimationStyle::Smoothed => peak,
            };

            self.bars.push(BarDescriptor {
                index: bar,
                start_bin,
                end_bin,
                current_height: raw,
                peak_height: peak,
                rect: self.layout.bar_rect(bar, drawn),
            });
        }

        // Once paused playback has let every peak settle, the scheduler
        // stops itself until the next playback or visibility event.
        self.scheduler
            .reevaluate(playing, self.peaks.all_settled(PEAK_SETTLE_EPSILON));
        Ok(())
    }

    // ---- recompute plumbing ---------------------------------------------

    fn surface_visible(&self) -> bool {
        self.surface_loaded && self.canvas_width >= 1 && self.canvas_height >= 1
    }

    fn update_surface_gate(&mut self) {
        self.scheduler.set_surface_visible(self.surface_visible());
    }

    fn reevaluate(&mut self) {
        // No source means nothing to animate and no tick that could decay
        // held peaks; the scheduler must not start until one is attached.
        let Some(source) = &self.source else {
            self.scheduler.reevaluate(false, true);
            return;
        };
        let playing = source.is_playing();
        let settled = self.peaks.all_settled(PEAK_SETTLE_EPSILON);
        self.scheduler.reevaluate(playing, settled);
    }

    /// Recompute layout, bucket table, snapshot buffer and peak storage.
    /// Runs on every geometry or bar-shape config change, never per tick.
    fn rebuild_layout(&mut self) {
        self.layout = BarLayout::compute(self.canvas_width, self.canvas_height, &self.config);

        let Some(source) = &self.source else {
            self.boundaries = None;
            self.bars.clear();
            return;
        };

        let min_bin = source
            .frequency_to_bin_index(self.config.min_frequency_hz)
            .min(MAX_FREQUENCY_BIN);
        let max_bin = (source.frequency_to_bin_index(self.config.max_frequency_hz) + 1)
            .min(MAX_FREQUENCY_BIN)
            .max(min_bin + 1);

        let bar_count = self.layout.actual_bar_count();
        self.boundaries = Some(BandBoundaries::compute(
            bar_count,
            min_bin,
            max_bin,
            self.config.scale_mode,
        ));
        self.sampler.resize(max_bin + 1);

        if self.peaks.bar_count() != bar_count {
            self.peaks.reset(bar_count);
        } else {
            // Same bars, new canvas: held peaks must not float above it.
            self.peaks.clamp_to(self.canvas_height as f32);
        }
        self.bars.clear();

        #[cfg(feature = "logging")]
        info!(
            "layout rebuilt: {} bars over bins {}..={}",
            bar_count, min_bin, max_bin
        );
    }
}

impl<S: AudioSource> Drop for SpectrumAnalyzer<S> {
    fn drop(&mut self) {
        // Mirror of surface_unloaded: teardown can never leave a live
        // registration behind.
        self.scheduler.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    struct TestSource {
        playing: bool,
        magnitudes: Vec<f32>,
        bins_per_10_hz: usize,
    }

    impl TestSource {
        fn new(playing: bool, level: f32) -> Self {
            Self {
                playing,
                // frequency_to_bin_index(20_000) / 10 + 1 bins and change.
                magnitudes: vec![level; 2048],
                bins_per_10_hz: 10,
            }
        }
    }

    impl AudioSource for TestSource {
        fn is_playing(&self) -> bool {
            self.playing
        }

        fn try_fill_magnitudes(&mut self, buf: &mut [f32]) -> bool {
            let len = buf.len().min(self.magnitudes.len());
            buf[..len].copy_from_slice(&self.magnitudes[..len]);
            true
        }

        fn frequency_to_bin_index(&self, hz: u32) -> usize {
            hz as usize / self.bins_per_10_hz
        }
    }

    fn ready_analyzer(playing: bool, level: f32) -> SpectrumAnalyzer<TestSource> {
        let mut analyzer = SpectrumAnalyzer::new(VisualizerConfig::default());
        analyzer.attach_source(TestSource::new(playing, level));
        analyzer.surface_loaded(400, 100);
        analyzer.window_state_changed(true);
        analyzer
    }

    #[test]
    fn playing_source_starts_the_scheduler_and_fills_bars() {
        let mut analyzer = ready_analyzer(true, 1.0);
        assert!(analyzer.is_running());

        assert!(analyzer.advance(16));
        assert_eq!(analyzer.bars().len(), 32);
        for bar in analyzer.bars() {
            assert!((bar.current_height - 100.0).abs() < 1e-3);
            assert!(bar.peak_height >= bar.current_height - 1e-6);
        }
    }

    #[test]
    fn bars_cover_the_configured_bin_range() {
        let mut analyzer = ready_analyzer(true, 0.5);
        analyzer.advance(16);
        let bars = analyzer.bars();
        // min 20 Hz -> bin 2; max 20 kHz -> bin 2000 + 1.
        assert_eq!(bars.first().unwrap().start_bin, 2);
        assert_eq!(bars.last().unwrap().end_bin, 2001);
    }

    #[test]
    fn paused_attach_with_settled_peaks_never_starts() {
        let mut analyzer = ready_analyzer(false, 1.0);
        analyzer.playback_state_changed();
        assert!(!analyzer.is_running());
        assert!(!analyzer.advance(1000));
    }

    #[test]
    fn pause_lets_peaks_fall_and_then_stops() {
        let mut analyzer = ready_analyzer(true, 1.0);
        analyzer.advance(16);
        analyzer.source.as_mut().unwrap().playing = false;

        // Peaks are at full height; the scheduler keeps running while
        // they decay toward the settle epsilon.
        let mut ticks = 0;
        while analyzer.is_running() && ticks < 500 {
            analyzer.advance(16);
            ticks += 1;
        }
        assert!(!analyzer.is_running(), "never settled");
        assert!(analyzer.peaks.all_settled(PEAK_SETTLE_EPSILON));
        // Well under the cap: 100 * (10/11)^n < 0.05 within ~80 ticks.
        assert!(ticks < 120, "took {} ticks", ticks);
    }

    #[test]
    fn minimized_window_stops_ticks_and_restore_resumes() {
        let mut analyzer = ready_analyzer(true, 1.0);
        analyzer.window_state_changed(false);
        assert!(!analyzer.is_running());
        assert!(!analyzer.advance(1000));

        analyzer.window_state_changed(true);
        assert!(analyzer.is_running());
    }

    #[test]
    fn resize_with_thin_bars_recomputes_count_and_boundaries() {
        let mut analyzer = ready_analyzer(true, 0.5);
        analyzer.set_bar_width(0.5);
        analyzer.advance(16);
        assert_eq!(analyzer.bars().len(), 71);

        analyzer.surface_resized(800, 100);
        analyzer.advance(16);
        assert_eq!(analyzer.bars().len(), 144);
        assert_eq!(
            analyzer.boundaries.as_ref().unwrap().bar_count(),
            144,
            "boundary table must follow the derived bar count"
        );
    }

    #[test]
    fn smoothed_style_draws_the_peak_value() {
        let mut analyzer = ready_analyzer(true, 1.0);
        analyzer.set_animation_style(AnimationStyle::Smoothed);
        analyzer.advance(16);
        analyzer.source.as_mut().unwrap().magnitudes.fill(0.0);
        analyzer.advance(16);

        let bar = &analyzer.bars()[0];
        assert_eq!(bar.current_height, 0.0);
        assert!(bar.peak_height > 0.0);
        // Drawn rect follows the peak, not the raw height.
        assert_eq!(
            bar.rect.size.height,
            bar.peak_height.round() as u32
        );
    }

    #[test]
    fn short_frame_is_skipped_not_fatal() {
        let mut analyzer = ready_analyzer(true, 1.0);
        // Force the snapshot buffer out of sync with the bucket table, as
        // a mid-resize race would.
        analyzer.sampler.resize(10);
        let err = analyzer.run_tick().unwrap_err();
        assert!(matches!(err, FrameError::FrameTooShort { .. }));

        // The public path swallows it and keeps the scheduler alive.
        analyzer.advance(16);
        assert!(analyzer.is_running());

        // The next geometry change restores a consistent table.
        analyzer.surface_resized(400, 100);
        assert!(analyzer.advance(16));
        assert_eq!(analyzer.bars().len(), 32);
    }

    #[test]
    fn detaching_the_source_stops_the_scheduler() {
        let mut analyzer = ready_analyzer(true, 1.0);
        assert!(analyzer.is_running());
        let source = analyzer.detach_source();
        assert!(source.is_some());
        assert!(!analyzer.is_running());
        assert!(!analyzer.advance(1000));
    }

    #[test]
    fn host_events_after_source_detach_do_not_restart_the_scheduler() {
        let mut analyzer = ready_analyzer(true, 1.0);
        analyzer.advance(16);
        // Peaks are held high when the source goes away.
        assert!(!analyzer.peaks.all_settled(PEAK_SETTLE_EPSILON));
        analyzer.detach_source();
        assert!(!analyzer.is_running());

        analyzer.window_state_changed(true);
        analyzer.surface_resized(400, 100);
        analyzer.playback_state_changed();
        assert!(!analyzer.is_running());
        assert!(!analyzer.advance(1000));
    }

    #[test]
    fn surface_unload_detaches_the_scheduler() {
        let mut analyzer = ready_analyzer(true, 1.0);
        analyzer.surface_unloaded();
        assert!(!analyzer.is_running());

        // Stale events after unload must not revive it.
        analyzer.window_state_changed(true);
        analyzer.playback_state_changed();
        assert!(!analyzer.is_running());
    }
}
