mod carousel_view;
mod status_bar;

pub use carousel_view::CarouselWidget;
pub use status_bar::StatusBarWidget;
