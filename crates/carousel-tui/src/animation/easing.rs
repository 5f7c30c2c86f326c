//! Easing curves mapping progress in [0, 1] onto [0, 1].

pub use carousel_core::EasingType;

pub trait EasingTypeExt {
    /// Eased value for progress `t`; input outside [0, 1] is clamped
    fn apply(&self, t: f64) -> f64;
}

impl EasingTypeExt for EasingType {
    #[inline]
    fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            // Hold the start value, then jump at the end
            EasingType::None if t < 1.0 => 0.0,
            EasingType::None => 1.0,
            EasingType::Linear => t,
            EasingType::Cubic => ease_out_power(t, 3),
            EasingType::Quintic => ease_out_power(t, 5),
            EasingType::EaseOut => ease_out_expo(t),
        }
    }
}

/// 1 - (1 - t)^n
#[inline]
fn ease_out_power(t: f64, n: i32) -> f64 {
    1.0 - (1.0 - t).powi(n)
}

/// 1 - 2^(-10t), pinned to 1 at the end
#[inline]
fn ease_out_expo(t: f64) -> f64 {
    if t >= 1.0 {
        1.0
    } else {
        1.0 - (-10.0 * t).exp2()
    }
}
