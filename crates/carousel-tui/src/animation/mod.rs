//! Slot transitions for the terminal host.
//!
//! The engine hands the host a target [`SlotVisual`](carousel_core::SlotVisual) or wheel angle
//! together with a [`Transition`](carousel_core::Transition). The host keeps one [`Animated`]
//! value per property and samples it every frame.
//!
//! - `easing` maps linear progress onto a curve
//! - `timing` turns a start instant and a duration into progress
//! - `config` reads the animation settings from the ui section
//! - `tween` combines the three into an animated value

pub mod config;
pub mod easing;
pub mod timing;
pub mod tween;

pub use config::AnimationConfigExt;
pub use easing::{EasingType, EasingTypeExt};
pub use tween::{Animated, Interpolate};
