use carousel_core::config::UiColors;
use carousel_core::{Brush, Rgba};
use ratatui::style::Color;

/// Runtime theme with configurable colors
#[derive(Debug, Clone)]
pub struct Theme {
    // Background colors
    pub bg0: Color,
    pub bg2: Color,

    // Foreground colors
    pub fg0: Color,
    pub grey1: Color,
    pub grey2: Color,

    // Semantic colors
    pub accent: Color,
    pub error: Color,
    pub warning: Color,
    pub info: Color,

    /// Label color of items away from the selection, before any recolor
    pub deselected: Rgba,
}

impl Default for Theme {
    fn default() -> Self {
        // Gruvbox Dark
        Self {
            bg0: Color::Rgb(0x28, 0x28, 0x28),
            bg2: Color::Rgb(0x45, 0x40, 0x3d),
            fg0: Color::Rgb(0xd4, 0xbe, 0x98),
            grey1: Color::Rgb(0x92, 0x83, 0x74),
            grey2: Color::Rgb(0xa8, 0x99, 0x84),
            accent: Color::Rgb(0x89, 0xb4, 0x82),
            error: Color::Rgb(0xea, 0x69, 0x62),
            warning: Color::Rgb(0xe7, 0x8a, 0x4e),
            info: Color::Rgb(0x7d, 0xae, 0xa3),
            deselected: Rgba::rgb(0xa8, 0x99, 0x84),
        }
    }
}

impl From<&UiColors> for Theme {
    fn from(colors: &UiColors) -> Self {
        Self {
            bg0: to_color(colors.background),
            grey2: to_color(colors.deselected),
            accent: to_color(colors.accent),
            deselected: colors.deselected,
            ..Self::default()
        }
    }
}

/// Terminal color of an `Rgba`; alpha is dropped
pub fn to_color(color: Rgba) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

/// Color of `brush` at position `t` in [0, 1] across its stops
pub fn brush_color(brush: &Brush, t: f64) -> Color {
    let stops = brush.stops();
    match stops {
        [] => Color::Reset,
        [only] => to_color(*only),
        _ => {
            let scaled = t.clamp(0.0, 1.0) * (stops.len() - 1) as f64;
            let index = (scaled.floor() as usize).min(stops.len() - 2);
            to_color(stops[index].lerp(stops[index + 1], scaled - index as f64))
        }
    }
}
