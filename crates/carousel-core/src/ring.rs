//! Circular index arithmetic shared by every component that wraps slot or item indices.

/// True modulus: the result is always in `[0, n)`, including for negative `a`.
///
/// `n` must be non-zero; callers guard empty collections before reaching here.
#[inline]
pub fn modulus(a: i64, n: usize) -> usize {
    debug_assert!(n > 0, "modulus of an empty ring");
    a.rem_euclid(n as i64) as usize
}

/// Minimum forward distance from `a` to `b` walking forward around a ring of size `n`.
#[inline]
pub fn forward_distance(a: usize, b: usize, n: usize) -> usize {
    modulus(b as i64 - a as i64, n)
}

/// Direction of travel around the ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// The shorter way around the ring from one index to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hop {
    pub direction: Direction,
    pub distance: usize,
}

/// Shortest hop from `from` to `to`. Ties go forward.
pub fn shortest_hop(from: usize, to: usize, n: usize) -> Hop {
    let forward = forward_distance(from, to, n);
    let backward = forward_distance(to, from, n);
    if forward <= backward {
        Hop {
            direction: Direction::Forward,
            distance: forward,
        }
    } else {
        Hop {
            direction: Direction::Backward,
            distance: backward,
        }
    }
}

/// Step an index one position around the ring.
#[inline]
pub fn step(index: usize, direction: Direction, n: usize) -> usize {
    match direction {
        Direction::Forward => modulus(index as i64 + 1, n),
        Direction::Backward => modulus(index as i64 - 1, n),
    }
}

/// Wrap an angle in degrees into `[-180, 180)`.
#[inline]
pub fn wrap_degrees(angle: f64) -> f64 {
    (angle + 180.0).rem_euclid(360.0) - 180.0
}
