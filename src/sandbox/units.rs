//! Conversion between simulation space (meters) and presentation space
//! (pixels).
//!
//! Both spaces are y-down with the origin at the window's top-left corner,
//! so conversion is a pure scale.

use bevy::prelude::*;

/// Pixels per meter.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct UnitScale(f32);

/// The default scale: 100 pixels per meter.
pub const METER: UnitScale = UnitScale(100.0);

impl Default for UnitScale {
    fn default() -> Self {
        METER
    }
}

impl UnitScale {
    /// A scale of `pixels_per_meter`. Must be positive.
    pub const fn new(pixels_per_meter: f32) -> Self {
        Self(pixels_per_meter)
    }

    pub fn pixels_per_meter(self) -> f32 {
        self.0
    }

    /// Meters to pixels.
    #[inline]
    pub fn to_presentation(self, meters: f32) -> f32 {
        meters * self.0
    }

    /// Pixels to meters.
    #[inline]
    pub fn to_simulation(self, pixels: f32) -> f32 {
        pixels / self.0
    }

    #[inline]
    pub fn vec_to_presentation(self, meters: Vec2) -> Vec2 {
        meters * self.0
    }

    #[inline]
    pub fn vec_to_simulation(self, pixels: Vec2) -> Vec2 {
        pixels / self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_scale() {
        assert_eq!(UnitScale::default().pixels_per_meter(), 100.0);
        assert_eq!(METER.to_presentation(2.5), 250.0);
        assert_eq!(METER.to_simulation(460.0), 4.6);
        assert_eq!(
            METER.vec_to_simulation(Vec2::new(800.0, 460.0)),
            Vec2::new(8.0, 4.6)
        );
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() <= 1e-5 * a.abs().max(b.abs()).max(1.0)
    }

    proptest! {
        #[test]
        fn prop_presentation_round_trip(x in -1.0e6f32..1.0e6) {
            let back = METER.to_presentation(METER.to_simulation(x));
            prop_assert!(close(back, x), "{} -> {}", x, back);
        }

        #[test]
        fn prop_simulation_round_trip(x in -1.0e4f32..1.0e4) {
            let back = METER.to_simulation(METER.to_presentation(x));
            prop_assert!(close(back, x), "{} -> {}", x, back);
        }

        #[test]
        fn prop_any_scale_round_trip(scale in 0.5f32..1000.0, x in -1.0e4f32..1.0e4, y in -1.0e4f32..1.0e4) {
            let scale = UnitScale::new(scale);
            let v = Vec2::new(x, y);
            let back = scale.vec_to_presentation(scale.vec_to_simulation(v));
            prop_assert!(close(back.x, v.x) && close(back.y, v.y));
        }
    }
}
