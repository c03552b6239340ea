use embedded_graphics::{
    draw_target::DrawTarget,
    pixelcolor::Rgb888,
    primitives::{Primitive, PrimitiveStyle, Rectangle},
    Drawable,
};
#[allow(unused_imports)]
use micromath::F32Ext;

use crate::types::BarDescriptor;

pub trait Renderer {
    fn draw<D: DrawTarget<Color = Rgb888>>(
        &self,
        target: &mut D,
        bars: &[BarDescriptor],
    ) -> Result<(), D::Error>;
}

/// Draws the bar row as filled rectangles in a single color.
pub struct BarRenderer {
    color: Rgb888,
    draw_peak_markers: bool,
}

impl BarRenderer {
    pub fn new(color: Rgb888, draw_peak_markers: bool) -> Self {
        Self {
            color,
            draw_peak_markers,
        }
    }

    pub fn set_color(&mut self, color: Rgb888) {
        self.color = color;
    }

    pub fn set_draw_peak_markers(&mut self, draw: bool) {
        self.draw_peak_markers = draw;
    }

    fn marker_rect(bar: &BarDescriptor) -> Rectangle {
        // The bar rect already encodes the bottom edge; lift a one-pixel
        // slice up to the held peak.
        let mut rect = bar.rect;
        let delta = (bar.peak_height - bar.current_height).max(0.0).round() as i32;
        rect.top_left.y -= delta;
        rect.size.height = 1;
        rect
    }
}

impl Renderer for BarRenderer {
    fn draw<D>(&self, target: &mut D, bars: &[BarDescriptor]) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let style = PrimitiveStyle::with_fill(self.color);
        for bar in bars {
            if bar.rect.size.height > 0 {
                bar.rect.into_styled(style).draw(target)?;
            }
            if self.draw_peak_markers && bar.peak_height > bar.current_height {
                Self::marker_rect(bar).into_styled(style).draw(target)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::{geometry::Point, geometry::Size};

    fn bar(current: f32, peak: f32) -> BarDescriptor {
        BarDescriptor {
            index: 0,
            start_bin: 0,
            end_bin: 7,
            current_height: current,
            peak_height: peak,
            rect: Rectangle::new(Point::new(6, 59), Size::new(4, current.round() as u32)),
        }
    }

    #[test]
    fn marker_sits_at_the_peak_height() {
        let descriptor = bar(40.0, 55.0);
        let marker = BarRenderer::marker_rect(&descriptor);
        assert_eq!(marker.size.height, 1);
        assert_eq!(marker.top_left.y, 59 - 15);
    }
}
