pub mod carousel;
pub mod color;
pub mod config;
pub mod density;
pub mod depth;
pub mod error;
pub mod geometry;
pub mod load;
pub mod ring;
pub mod scroll;
pub mod window;

pub use carousel::{
    Carousel, CarouselEvent, Measurement, SelectionOrigin, SelectionState, SlotHost, SlotVisual,
    Transition,
};
pub use color::{Brush, Rgba};
pub use config::{AppConfig, CarouselConfig, CarouselPatch, EasingType, Impact};
pub use error::{Error, Result};
pub use geometry::{Axis, Layout, LayoutMode, Size, Vec2, WheelAlignment};
pub use load::{LoadOutcome, PendingLoad};
