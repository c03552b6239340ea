use embedded_graphics::{pixelcolor::Rgb888, prelude::*};
use embedded_graphics_simulator::{
    sdl2::Keycode, OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window,
};
#[allow(unused_imports)]
use micromath::F32Ext;
use spectrum_viz::{AnimationStyle, AudioSource, ScaleMode, SpectrumAnalyzer, VisualizerConfig};
use std::{thread, time::Duration};

// Constants for visualization parameters
pub const WIDTH: u32 = 400;
pub const HEIGHT: u32 = 100;
pub const FRAME_DELAY_MS: u64 = 16;

const FFT_SIZE: usize = 4096;
const SAMPLE_RATE_HZ: f32 = 44_100.0;

const BLACK: Rgb888 = Rgb888::new(0, 0, 0);
const GREEN: Rgb888 = Rgb888::new(0, 255, 0);

/// Fake player producing a magnitude frame of a few wandering tones, so
/// the analyzer can be exercised without any audio backend.
struct SyntheticSource {
    playing: bool,
    time: f32,
}

impl SyntheticSource {
    fn new() -> Self {
        Self {
            playing: true,
            time: 0.0,
        }
    }

    fn tone(&self, bin_hz: f32, center_hz: f32, width_hz: f32, level: f32) -> f32 {
        let d = (bin_hz - center_hz) / width_hz;
        level * (-d * d).exp()
    }
}

impl AudioSource for SyntheticSource {
    fn is_playing(&self) -> bool {
        self.playing
    }

    fn try_fill_magnitudes(&mut self, buf: &mut [f32]) -> bool {
        let bass_hz = 80.0 + 40.0 * (self.time * 0.7).sin();
        let mid_hz = 800.0 + 600.0 * (self.time * 0.4).sin();
        let high_hz = 6_000.0 + 3_000.0 * (self.time * 0.9).sin();

        for (bin, magnitude) in buf.iter_mut().enumerate() {
            let bin_hz = bin as f32 * SAMPLE_RATE_HZ / FFT_SIZE as f32;
            let mut m = self.tone(bin_hz, bass_hz, 60.0, 0.8)
                + self.tone(bin_hz, mid_hz, 200.0, 0.5)
                + self.tone(bin_hz, high_hz, 900.0, 0.3);
            // A quiet shimmering floor well above the -90 dB cutoff.
            m += 0.001 * (1.0 + (self.time * 3.0 + bin as f32 * 0.05).sin());
            *magnitude = m.min(1.0);
        }
        self.time += FRAME_DELAY_MS as f32 / 1000.0;
        true
    }

    fn frequency_to_bin_index(&self, hz: u32) -> usize {
        (hz as f32 * FFT_SIZE as f32 / SAMPLE_RATE_HZ) as usize
    }
}

fn main() -> Result<(), std::convert::Infallible> {
    let mut display: SimulatorDisplay<Rgb888> = SimulatorDisplay::new(Size::new(WIDTH, HEIGHT));

    let mut window = Window::new(
        "Spectrum Visualizer Simulator",
        &OutputSettingsBuilder::new().scale(2).build(),
    );

    let mut config = VisualizerConfig::default();
    config.bar_width = 4.0;
    config.bar_spacing = 2.0;
    config.bar_color = GREEN;
    config.scale_mode = ScaleMode::Logarithmic;
    config.draw_peak_markers = true;

    let mut analyzer = SpectrumAnalyzer::new(config);
    analyzer.attach_source(SyntheticSource::new());
    analyzer.surface_loaded(WIDTH, HEIGHT);
    analyzer.window_state_changed(true);

    let mut scale_mode = ScaleMode::Logarithmic;
    let mut animation_style = AnimationStyle::Sharp;
    let mut markers = true;

    // Keys: Space play/pause, S scale mode, A animation style, M peak markers.
    'running: loop {
        if analyzer.advance(FRAME_DELAY_MS as u32) {
            display.clear(BLACK)?;
            analyzer.draw(&mut display)?;
        }
        window.update(&display);

        thread::sleep(Duration::from_millis(FRAME_DELAY_MS));

        for event in window.events() {
            match event {
                SimulatorEvent::Quit => break 'running,
                SimulatorEvent::KeyDown { keycode, .. } => match keycode {
                    Keycode::Space => {
                        if let Some(mut source) = analyzer.detach_source() {
                            source.playing = !source.playing;
                            analyzer.attach_source(source);
                        }
                    }
                    Keycode::S => {
                        scale_mode = match scale_mode {
                            ScaleMode::Linear => ScaleMode::Logarithmic,
                            ScaleMode::Logarithmic => ScaleMode::Linear,
                        };
                        analyzer.set_scale_mode(scale_mode);
                    }
                    Keycode::A => {
                        animation_style = match animation_style {
                            AnimationStyle::Sharp => AnimationStyle::Smoothed,
                            AnimationStyle::Smoothed => AnimationStyle::Sharp,
                        };
                        analyzer.set_animation_style(animation_style);
                    }
                    Keycode::M => {
                        markers = !markers;
                        analyzer.set_draw_peak_markers(markers);
                    }
                    _ => {}
                },
                _ => {}
            }
        }
    }

    analyzer.surface_unloaded();
    Ok(())
}
