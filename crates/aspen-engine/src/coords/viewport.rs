/// Drawable size in logical pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// `height / width`: multiplying clip-space x by this keeps shapes square.
    ///
    /// This is the `aspect_ratio` the offset/scale shaders expect. Returns 1 for
    /// an invalid viewport (e.g. a minimized window).
    #[inline]
    pub fn x_correction(self) -> f32 {
        if self.is_valid() { self.height / self.width } else { 1.0 }
    }

    /// `width / height`, as taken by perspective projections.
    #[inline]
    pub fn aspect(self) -> f32 {
        if self.is_valid() { self.width / self.height } else { 1.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landscape_viewport_squeezes_x() {
        let v = Viewport::new(1280.0, 720.0);
        assert_eq!(v.x_correction(), 0.5625);
        assert_eq!(v.aspect(), 1280.0 / 720.0);
    }

    #[test]
    fn zero_sized_viewport_falls_back_to_one() {
        let v = Viewport::new(0.0, 720.0);
        assert!(!v.is_valid());
        assert_eq!(v.x_correction(), 1.0);
        assert_eq!(v.aspect(), 1.0);
    }

    #[test]
    fn non_finite_viewport_is_invalid() {
        assert!(!Viewport::new(f32::INFINITY, 10.0).is_valid());
    }
}
