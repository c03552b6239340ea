use embedded_graphics::primitives::Rectangle;

/// One bar of the spectrum for one frame of visualization.
#[derive(Clone, Debug)]
pub struct BarDescriptor {
    /// The index of this bar (0, 1, 2...).
    pub index: usize,
    /// First FFT bin owned by this bar.
    pub start_bin: usize,
    /// Last FFT bin owned by this bar (inclusive).
    pub end_bin: usize,
    /// Instantaneous height in canvas units, >= 0.
    pub current_height: f32,
    /// Peak-hold height in canvas units; rises instantly, decays gradually.
    /// Always >= `current_height` immediately after an update.
    pub peak_height: f32,
    /// Screen-space rectangle for the drawn height this tick.
    pub rect: Rectangle,
}
