//! Frame buffer view for 2D pixel access.
//!
//! Depth is stored the way a 24-bit hardware depth buffer stores it: window
//! depth in [0, 1] quantized to integers, smaller is closer. The limited
//! precision is what makes coplanar surfaces fight.

/// Number of distinct depth values.
pub const DEPTH_BITS: u32 = 24;

/// Depth buffer value of the far plane; buffers are cleared to it.
pub const MAX_DEPTH: u32 = (1 << DEPTH_BITS) - 1;

/// Quantize a window depth to the stored integer format.
#[inline]
pub fn quantize_depth(depth: f32) -> u32 {
    if depth.is_nan() {
        return MAX_DEPTH;
    }
    (depth.clamp(0.0, 1.0) * MAX_DEPTH as f32).round() as u32
}

/// A view into color and depth buffers.
///
/// Borrowed, not owning: created per draw to pass buffers and dimensions
/// together.
pub struct FrameBuffer<'a> {
    color_buffer: &'a mut [u32],
    depth_buffer: &'a mut [u32],
    width: u32,
    height: u32,
}

impl<'a> FrameBuffer<'a> {
    pub fn new(
        color_buffer: &'a mut [u32],
        depth_buffer: &'a mut [u32],
        width: u32,
        height: u32,
    ) -> Self {
        debug_assert_eq!(
            color_buffer.len(),
            (width * height) as usize,
            "Color buffer size doesn't match dimensions"
        );
        debug_assert_eq!(
            depth_buffer.len(),
            (width * height) as usize,
            "Depth buffer size doesn't match dimensions"
        );
        Self {
            color_buffer,
            depth_buffer,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear_depth(&mut self) {
        self.depth_buffer.fill(MAX_DEPTH);
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            Some((y as u32 * self.width + x as u32) as usize)
        } else {
            None
        }
    }

    /// Whether a fragment at `depth` would be written (less-or-equal test).
    #[inline]
    pub fn passes_depth(&self, x: i32, y: i32, depth: f32) -> bool {
        self.index(x, y)
            .is_some_and(|idx| quantize_depth(depth) <= self.depth_buffer[idx])
    }

    /// Write a pixel if it passes the depth test. Out-of-bounds coordinates
    /// are ignored.
    #[inline]
    pub fn set_pixel_with_depth(&mut self, x: i32, y: i32, depth: f32, color: u32) {
        if let Some(idx) = self.index(x, y) {
            let quantized = quantize_depth(depth);
            if quantized <= self.depth_buffer[idx] {
                self.depth_buffer[idx] = quantized;
                self.color_buffer[idx] = color;
            }
        }
    }

    /// Write a pixel without depth testing (backgrounds).
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if let Some(idx) = self.index(x, y) {
            self.color_buffer[idx] = color;
        }
    }

    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<u32> {
        self.index(x, y).map(|idx| self.color_buffer[idx])
    }

    #[inline]
    pub fn get_depth(&self, x: i32, y: i32) -> Option<u32> {
        self.index(x, y).map(|idx| self.depth_buffer[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantization_clamps_and_rounds() {
        assert_eq!(quantize_depth(-1.0), 0);
        assert_eq!(quantize_depth(0.0), 0);
        assert_eq!(quantize_depth(1.0), MAX_DEPTH);
        assert_eq!(quantize_depth(7.0), MAX_DEPTH);
        assert_eq!(quantize_depth(f32::NAN), MAX_DEPTH);
    }

    #[test]
    fn nearby_depths_collapse() {
        // Closer than one step of the 24-bit grid
        let a = 0.999_9;
        let b = a + 1e-9;
        assert_eq!(quantize_depth(a), quantize_depth(b));
    }

    #[test]
    fn depth_test_is_less_or_equal() {
        let (mut color, mut depth) = (vec![0u32; 4], vec![0u32; 4]);
        let mut fb = FrameBuffer::new(&mut color, &mut depth, 2, 2);
        fb.clear_depth();

        fb.set_pixel_with_depth(0, 0, 0.5, 1);
        fb.set_pixel_with_depth(0, 0, 0.5, 2);
        assert_eq!(fb.get_pixel(0, 0), Some(2));
        fb.set_pixel_with_depth(0, 0, 0.7, 3);
        assert_eq!(fb.get_pixel(0, 0), Some(2));
        assert!(!fb.passes_depth(0, 0, 0.9));
        assert!(!fb.passes_depth(5, 0, 0.1));
    }

    #[test]
    fn out_of_bounds_is_ignored() {
        let (mut color, mut depth) = (vec![0u32; 4], vec![0u32; 4]);
        let mut fb = FrameBuffer::new(&mut color, &mut depth, 2, 2);
        fb.set_pixel(-1, 0, 9);
        fb.set_pixel(2, 1, 9);
        assert_eq!(fb.get_pixel(2, 1), None);
        assert!(color.iter().all(|&c| c == 0));
    }
}
