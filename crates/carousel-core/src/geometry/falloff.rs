use crate::color::Rgba;

/// Normalized distance of a slot from the selection.
///
/// `ratio` is `distance / threshold` clamped to [-1, 1]; beyond the threshold every effect is
/// at its resting value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Falloff {
    ratio: f64,
    within: bool,
}

impl Falloff {
    pub fn new(distance: f64, threshold: f64) -> Self {
        if threshold <= 0.0 || !threshold.is_finite() {
            return Self {
                ratio: if distance == 0.0 { 0.0 } else { distance.signum() },
                within: distance == 0.0,
            };
        }
        let ratio = distance / threshold;
        Self {
            ratio: ratio.clamp(-1.0, 1.0),
            within: ratio.abs() < 1.0,
        }
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn within(&self) -> bool {
        self.within
    }

    /// `|ratio|`, 1 outside the threshold
    pub fn magnitude(&self) -> f64 {
        if self.within {
            self.ratio.abs()
        } else {
            1.0
        }
    }

    /// Scale growing linearly from 1 at the threshold to `selected` at the selection
    pub fn scale(&self, selected: f64) -> f64 {
        if self.within {
            (selected - 1.0) * (1.0 - self.ratio.abs()) + 1.0
        } else {
            1.0
        }
    }

    /// Perpendicular displacement: `w * |w| * curve` with `w = intensity * (1 - |ratio|)`
    pub fn warp(&self, intensity: f64, curve: f64) -> f64 {
        if !self.within || intensity == 0.0 {
            return 0.0;
        }
        let w = intensity * (1.0 - self.ratio.abs());
        w * w.abs() * curve
    }

    /// Tilt that is zero at the selection and reaches `degrees` at the threshold, signed by side
    pub fn tilt(&self, degrees: f64) -> f64 {
        if self.ratio == 0.0 {
            return 0.0;
        }
        degrees * self.ratio.signum() * self.magnitude()
    }

    /// Blend from `selected` at the selection to `deselected` at the threshold
    pub fn blend(&self, selected: Rgba, deselected: Rgba) -> Rgba {
        if self.within {
            selected.lerp(deselected, self.ratio.abs())
        } else {
            deselected
        }
    }
}
