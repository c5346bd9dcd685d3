/// Viewport rectangle in physical pixels.
///
/// Maps normalized device coordinates onto the surface: `-1` lands on the
/// left/bottom edge (pixel `0`) and `+1` on the right/top edge (pixel
/// `width`/`height`). The mapping is always full-surface; no aspect-ratio
/// correction is applied.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Full-surface viewport for a `width` x `height` surface.
    #[inline]
    pub const fn full(width: u32, height: u32) -> Self {
        Self { x: 0, y: 0, width, height }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Maps an NDC x coordinate in `[-1, 1]` to a pixel x coordinate.
    #[inline]
    pub fn ndc_to_pixel_x(self, ndc: f32) -> f32 {
        self.x as f32 + (ndc + 1.0) * 0.5 * self.width as f32
    }

    /// Maps an NDC y coordinate in `[-1, 1]` to a pixel y coordinate.
    ///
    /// Pixel y grows upward from the bottom edge, matching NDC orientation.
    #[inline]
    pub fn ndc_to_pixel_y(self, ndc: f32) -> f32 {
        self.y as f32 + (ndc + 1.0) * 0.5 * self.height as f32
    }

    #[inline]
    pub fn ndc_to_pixel(self, ndc: [f32; 2]) -> [f32; 2] {
        [self.ndc_to_pixel_x(ndc[0]), self.ndc_to_pixel_y(ndc[1])]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ndc_extremes_map_to_surface_edges() {
        let vp = Viewport::full(800, 600);
        assert_eq!(vp.ndc_to_pixel([-1.0, -1.0]), [0.0, 0.0]);
        assert_eq!(vp.ndc_to_pixel([1.0, 1.0]), [800.0, 600.0]);
    }

    #[test]
    fn mapping_is_linear() {
        let vp = Viewport::full(800, 600);
        // (-0.5, 0.5) lands a quarter of the way in horizontally, three quarters vertically.
        assert_eq!(vp.ndc_to_pixel([-0.5, 0.5]), [200.0, 450.0]);
        assert_eq!(vp.ndc_to_pixel([0.0, 0.0]), [400.0, 300.0]);
    }

    #[test]
    fn mapping_follows_resized_dimensions() {
        let vp = Viewport::full(1024, 333);
        assert_eq!(vp.ndc_to_pixel_x(1.0), 1024.0);
        assert_eq!(vp.ndc_to_pixel_y(1.0), 333.0);
        assert_eq!(vp.ndc_to_pixel_x(-1.0), 0.0);
    }

    #[test]
    fn zero_area_is_empty() {
        assert!(Viewport::full(0, 600).is_empty());
        assert!(Viewport::full(800, 0).is_empty());
        assert!(!Viewport::full(1, 1).is_empty());
    }
}
