use std::time::Duration;

pub use carousel_core::config::AnimationConfig;
use carousel_core::Transition;

pub trait AnimationConfigExt {
    /// Frame interval while a transition is running
    fn animation_tick_duration(&self) -> Duration;

    /// Duration a host transition actually runs for; zero when smoothing is off
    fn effective(&self, transition: Transition) -> Duration;
}

impl AnimationConfigExt for AnimationConfig {
    #[inline]
    fn animation_tick_duration(&self) -> Duration {
        match self.animation_fps {
            0 => Duration::from_millis(16),
            fps => Duration::from_millis((1000 / fps as u64).max(1)),
        }
    }

    #[inline]
    fn effective(&self, transition: Transition) -> Duration {
        if self.smooth_enabled {
            transition.duration()
        } else {
            Duration::ZERO
        }
    }
}
