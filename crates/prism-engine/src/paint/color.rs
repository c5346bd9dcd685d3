/// Straight-alpha RGBA color with `f32` channels in `[0, 1]`.
///
/// Channels are written to the render target as-is; the surface format decides
/// whether an sRGB encode happens on store.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_wgpu_preserves_channels() {
        let c = Color::new(0.2, 0.3, 0.3, 1.0).to_wgpu();
        assert!((c.r - 0.2).abs() < 1e-6);
        assert!((c.g - 0.3).abs() < 1e-6);
        assert!((c.b - 0.3).abs() < 1e-6);
        assert_eq!(c.a, 1.0);
    }
}
