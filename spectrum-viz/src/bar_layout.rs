use embedded_graphics::{geometry::Point, geometry::Size, primitives::Rectangle};
#[allow(unused_imports)]
use micromath::F32Ext;

use crate::config::VisualizerConfig;

/// Screen-space geometry of the bar row for one canvas size.
///
/// When `bar_width` >= 1 the configured bar count wins; below that the
/// count is derived from how many bars fit the canvas width, so shrinking
/// bars pack the full width. Changing the count feeds back into a bucket
/// table recompute.
#[derive(Clone, Debug)]
pub struct BarLayout {
    canvas_width: u32,
    canvas_height: u32,
    bar_width: f32,
    bar_spacing: f32,
    actual_bar_count: usize,
}

impl BarLayout {
    pub fn compute(canvas_width: u32, canvas_height: u32, config: &VisualizerConfig) -> Self {
        let bar_width = config.bar_width.max(0.0);
        let bar_spacing = config.bar_spacing.max(0.0);

        let actual_bar_count = if bar_width >= 1.0 {
            config.bar_count.max(1)
        } else {
            let pitch = bar_width + bar_spacing;
            if pitch > 0.0 {
                (((canvas_width as f32 - bar_spacing) / pitch) as usize).max(1)
            } else {
                1
            }
        };

        Self {
            canvas_width,
            canvas_height,
            bar_width,
            bar_spacing,
            actual_bar_count,
        }
    }

    pub fn actual_bar_count(&self) -> usize {
        self.actual_bar_count
    }

    pub fn canvas_width(&self) -> u32 {
        self.canvas_width
    }

    pub fn canvas_height(&self) -> u32 {
        self.canvas_height
    }

    /// Rectangle for bar `index` at `height` canvas units.
    ///
    /// The height is capped at the canvas so a bar can never overflow
    /// above the control. Bars sit on the bottom edge, one pixel in from
    /// the left spacing run.
    pub fn bar_rect(&self, index: usize, height: f32) -> Rectangle {
        let drawn = height.clamp(0.0, self.canvas_height as f32);
        let x = self.bar_spacing + index as f32 * (self.bar_width + self.bar_spacing) + 1.0;
        let y = self.canvas_height as f32 - 1.0 - drawn;

        // Sub-pixel bar widths still rasterize as a hairline.
        let px_width = self.bar_width.round().max(1.0) as u32;
        let px_height = drawn.round() as u32;

        Rectangle::new(
            Point::new(x as i32, y as i32),
            Size::new(px_width, px_height),
        )
    }
}
