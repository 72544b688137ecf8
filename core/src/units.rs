//! Screen-to-pitch unit conversion.

use serde::Serialize;

use crate::constants::{PITCH_FRACTION_OF_FIELD, PX_PER_CM, REAL_PITCH_LENGTH_METERS};
use crate::geometry::FieldBounds;

/// Derived field measurements for the current viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldScale {
    pub field_diameter: f64,
    pub pitch_length_px: f64,
    /// Real-world centimeters per on-screen centimeter
    pub speed_ratio: f64,
}

impl FieldScale {
    pub fn from_bounds(bounds: &FieldBounds) -> Self {
        let field_diameter = bounds.width.min(bounds.height);
        let pitch_length_px = field_diameter * PITCH_FRACTION_OF_FIELD;
        let pitch_length_cm = pitch_length_px / PX_PER_CM;
        let speed_ratio = REAL_PITCH_LENGTH_METERS * 100.0 / pitch_length_cm;
        Self { field_diameter, pitch_length_px, speed_ratio }
    }

    /// On-screen speed (px/s) of a ball moving at `speed_ms` in the real world.
    pub fn screen_speed_px_per_sec(&self, speed_ms: f64) -> f64 {
        speed_ms * 100.0 * PX_PER_CM / self.speed_ratio
    }
}

/// Keeps the latest measured field geometry.
///
/// Measurements of an unmounted field are skipped and the previous values are
/// kept, so an active delivery never sees its geometry disappear.
#[derive(Debug, Clone, Default)]
pub struct UnitConverter {
    bounds: Option<FieldBounds>,
    scale: Option<FieldScale>,
}

impl UnitConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute from a fresh measurement. Returns the scale now in effect.
    pub fn measure(&mut self, bounds: Option<FieldBounds>) -> Option<FieldScale> {
        match bounds {
            Some(b) if b.is_measurable() => {
                let scale = FieldScale::from_bounds(&b);
                tracing::debug!(
                    "Field size: {:.1}px, pitch length: {:.1}px, speed ratio: {:.3}",
                    scale.field_diameter,
                    scale.pitch_length_px,
                    scale.speed_ratio
                );
                self.bounds = Some(b);
                self.scale = Some(scale);
            }
            _ => {
                tracing::debug!("Field not measurable, keeping previous geometry");
            }
        }
        self.scale
    }

    pub fn scale(&self) -> Option<FieldScale> {
        self.scale
    }

    pub fn bounds(&self) -> Option<FieldBounds> {
        self.bounds
    }

    /// Speed ratio in effect; 1.0 until the field has been measured.
    pub fn speed_ratio(&self) -> f64 {
        self.scale.map(|s| s.speed_ratio).unwrap_or(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousand_pixel_field_gives_700px_pitch() {
        let scale = FieldScale::from_bounds(&FieldBounds::square(1000.0));
        assert_eq!(scale.field_diameter, 1000.0);
        assert!((scale.pitch_length_px - 700.0).abs() < 1e-9);
        // 2012 cm over 70 cm of screen
        assert!((scale.speed_ratio - 2012.0 / 70.0).abs() < 1e-9);
    }

    #[test]
    fn halving_the_field_doubles_the_ratio() {
        let full = FieldScale::from_bounds(&FieldBounds::square(1000.0));
        let half = FieldScale::from_bounds(&FieldBounds::square(500.0));
        assert!((half.speed_ratio - 2.0 * full.speed_ratio).abs() < 1e-9);
    }

    #[test]
    fn diameter_uses_the_shorter_side() {
        let scale = FieldScale::from_bounds(&FieldBounds::new(0.0, 0.0, 1200.0, 800.0));
        assert_eq!(scale.field_diameter, 800.0);
    }

    #[test]
    fn unmounted_field_keeps_previous_values() {
        let mut units = UnitConverter::new();
        assert_eq!(units.speed_ratio(), 1.0);
        let first = units.measure(Some(FieldBounds::square(1000.0))).unwrap();
        assert_eq!(units.measure(None), Some(first));
        assert_eq!(units.measure(Some(FieldBounds::new(0.0, 0.0, 0.0, 0.0))), Some(first));
    }

    #[test]
    fn screen_time_matches_real_time() {
        let scale = FieldScale::from_bounds(&FieldBounds::square(800.0));
        let speed_ms = 140.0 / 3.6;
        let screen_time = scale.pitch_length_px / scale.screen_speed_px_per_sec(speed_ms);
        let real_time = REAL_PITCH_LENGTH_METERS / speed_ms;
        assert!((screen_time - real_time).abs() < 1e-9);
    }
}
