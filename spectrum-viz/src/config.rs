use embedded_graphics::pixelcolor::Rgb888;

/// Default dB floor of the display range.
pub const DEFAULT_MIN_DB: f32 = -90.0;
/// Default dB ceiling of the display range.
pub const DEFAULT_MAX_DB: f32 = 0.0;
/// Default tick interval in milliseconds (~60 fps).
pub const DEFAULT_REFRESH_INTERVAL_MS: u32 = 16;
/// Refresh interval is always coerced into this range (ms).
pub const MIN_REFRESH_INTERVAL_MS: u32 = 10;
pub const MAX_REFRESH_INTERVAL_MS: u32 = 1000;
/// Highest bin index the bucket table may reference, regardless of what
/// the source maps a frequency to.
pub const MAX_FREQUENCY_BIN: usize = 2047;
/// A bar has settled once its peak has decayed below this height
/// (canvas units).
pub const PEAK_SETTLE_EPSILON: f32 = 0.05;

/// How FFT bins are partitioned into bars across the frequency range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScaleMode {
    /// Equal-width buckets.
    Linear,
    /// Denser buckets at the low end, matching perceptual spacing.
    Logarithmic,
}

/// Which computed value a bar draws each tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationStyle {
    /// Draw the instantaneous height; peaks only feed the optional marker.
    Sharp,
    /// Draw the peak-hold value itself for a floaty, inertial look.
    Smoothed,
}

/// All tunable inputs of the visualizer.
///
/// Fields are plain data; coercion to valid ranges happens in
/// [`clamp`](VisualizerConfig::clamp), which the analyzer applies before
/// any field is used. Setters on the analyzer clamp individually and
/// trigger the dependent recomputes.
#[derive(Clone, Debug)]
pub struct VisualizerConfig {
    /// Requested number of bars (>= 1). When `bar_width` < 1 the actual
    /// count is derived from the canvas width instead.
    pub bar_count: usize,
    /// Bar width in canvas units (>= 0).
    pub bar_width: f32,
    /// Gap between bars in canvas units (>= 0).
    pub bar_spacing: f32,
    /// Lower edge of the displayed frequency range (Hz).
    pub min_frequency_hz: u32,
    /// Upper edge of the displayed frequency range (Hz).
    pub max_frequency_hz: u32,
    pub scale_mode: ScaleMode,
    pub min_db: f32,
    pub max_db: f32,
    /// Peak decay divisor: larger values fall slower (>= 0).
    pub peak_fall_factor: f32,
    /// Tick cadence in ms, coerced into [10, 1000].
    pub refresh_interval_ms: u32,
    pub animation_style: AnimationStyle,
    pub bar_color: Rgb888,
    /// Amount subtracted from each raw magnitude before dB conversion in
    /// the Smoothed style. Bleeds a little energy out of quiet bins each
    /// tick so transients land softly instead of flickering.
    pub smoothing_attenuation: f32,
    /// Draw a one-pixel marker at the peak height in the Sharp style.
    pub draw_peak_markers: bool,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            bar_count: 32,
            bar_width: 1.0,
            bar_spacing: 5.0,
            min_frequency_hz: 20,
            max_frequency_hz: 20_000,
            scale_mode: ScaleMode::Linear,
            min_db: DEFAULT_MIN_DB,
            max_db: DEFAULT_MAX_DB,
            peak_fall_factor: 10.0,
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            animation_style: AnimationStyle::Sharp,
            bar_color: Rgb888::new(255, 255, 255),
            smoothing_attenuation: 0.003,
            draw_peak_markers: false,
        }
    }
}

impl VisualizerConfig {
    /// Coerce every field into its valid range. Invalid values are never
    /// rejected, only clamped to the nearest valid value.
    pub fn clamp(&mut self) {
        self.bar_count = self.bar_count.max(1);
        self.bar_width = self.bar_width.max(0.0);
        self.bar_spacing = self.bar_spacing.max(0.0);
        self.peak_fall_factor = self.peak_fall_factor.max(0.0);
        self.smoothing_attenuation = self.smoothing_attenuation.max(0.0);
        self.refresh_interval_ms = self
            .refresh_interval_ms
            .clamp(MIN_REFRESH_INTERVAL_MS, MAX_REFRESH_INTERVAL_MS);
        if self.max_frequency_hz <= self.min_frequency_hz {
            self.max_frequency_hz = self.min_frequency_hz + 1;
        }
        // A collapsed dB span would divide by zero during normalization.
        if self.max_db <= self.min_db {
            self.min_db = DEFAULT_MIN_DB;
            self.max_db = DEFAULT_MAX_DB;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_coerces_out_of_range_values() {
        let mut config = VisualizerConfig {
            bar_count: 0,
            bar_width: -3.0,
            bar_spacing: -1.0,
            refresh_interval_ms: 5,
            peak_fall_factor: -2.0,
            ..VisualizerConfig::default()
        };
        config.clamp();

        assert_eq!(config.bar_count, 1);
        assert_eq!(config.bar_width, 0.0);
        assert_eq!(config.bar_spacing, 0.0);
        assert_eq!(config.refresh_interval_ms, MIN_REFRESH_INTERVAL_MS);
        assert_eq!(config.peak_fall_factor, 0.0);
    }

    #[test]
    fn clamp_restores_collapsed_db_span() {
        let mut config = VisualizerConfig {
            min_db: 0.0,
            max_db: -10.0,
            ..VisualizerConfig::default()
        };
        config.clamp();

        assert_eq!(config.min_db, DEFAULT_MIN_DB);
        assert_eq!(config.max_db, DEFAULT_MAX_DB);
    }

    #[test]
    fn clamp_caps_refresh_interval_high_end() {
        let mut config = VisualizerConfig {
            refresh_interval_ms: 10_000,
            ..VisualizerConfig::default()
        };
        config.clamp();
        assert_eq!(config.refresh_interval_ms, MAX_REFRESH_INTERVAL_MS);
    }
}
