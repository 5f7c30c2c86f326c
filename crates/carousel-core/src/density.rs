//! Window size normalization.

/// Smallest window the carousel materializes.
pub const MIN_DENSITY: usize = 12;
/// Largest window the carousel materializes.
pub const MAX_DENSITY: usize = 72;

/// Normalize a requested window size.
///
/// Values below 12 clamp to 12 and values above 72 clamp to 72. Multiples of 12 pass through.
/// Anything else is pushed outward to `val + (val % 12)`, which keeps the result even, so
/// `D/2` stays exact. Values in 61..=71 would land past 72 and are clamped back.
pub fn normalize(requested: i64) -> usize {
    if requested < MIN_DENSITY as i64 {
        return MIN_DENSITY;
    }
    if requested > MAX_DENSITY as i64 {
        return MAX_DENSITY;
    }
    let val = requested as usize;
    if val % 12 == 0 {
        val
    } else {
        (val + val % 12).min(MAX_DENSITY)
    }
}

/// Cap an "additional items" option at half the window.
#[inline]
pub fn cap_additional(additional: u32, density: usize) -> usize {
    (additional as usize).min(density / 2)
}
