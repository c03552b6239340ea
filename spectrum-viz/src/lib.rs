//! Real-time audio spectrum bar visualizer pipeline.
//!
//! Turns a stream of FFT magnitude frames from a playing audio source into
//! animated bar rectangles for display. The pipeline per tick:
//! sample magnitudes -> reduce bins into per-bar heights on a dB scale ->
//! update peak hold/decay state -> emit bar rectangles.
//!
//! The crate is display-agnostic: bars are drawn on any
//! `embedded-graphics` [`DrawTarget`](embedded_graphics::draw_target::DrawTarget).
//! The audio side is equally external; hosts implement [`AudioSource`] and
//! feed elapsed time into [`SpectrumAnalyzer::advance`].

#![no_std]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod band_boundaries;
pub mod bar_layout;
pub mod config;
pub mod db_normalizer;
pub mod error;
pub mod peak_tracker;
pub mod render_scheduler;
pub mod renderer;
pub mod spectrum_analyzer;
pub mod spectrum_sampler;
pub mod types;

pub use band_boundaries::BandBoundaries;
pub use bar_layout::BarLayout;
pub use config::{AnimationStyle, ScaleMode, VisualizerConfig};
pub use db_normalizer::DbNormalizer;
pub use error::FrameError;
pub use peak_tracker::PeakTracker;
pub use render_scheduler::{RenderScheduler, SchedulerState};
pub use renderer::{BarRenderer, Renderer};
pub use spectrum_analyzer::SpectrumAnalyzer;
pub use spectrum_sampler::{AudioSource, SpectrumSampler};
pub use types::BarDescriptor;
