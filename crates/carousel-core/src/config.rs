use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::color::{Brush, Rgba};
use crate::density;
use crate::geometry::{LayoutMode, WheelAlignment};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub carousel: CarouselConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Items file for the demo, one item per line (named colors when unset)
    #[serde(default)]
    pub items_file: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            items_file: None,
        }
    }
}

/// Every recognized carousel option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarouselConfig {
    #[serde(default)]
    pub layout_mode: LayoutMode,
    #[serde(default)]
    pub wheel_alignment: WheelAlignment,
    /// Requested window size; see [`CarouselConfig::density`] for the normalized value
    #[serde(default = "default_density")]
    pub density: i64,
    #[serde(default)]
    pub selected_index: usize,
    /// Scale of the selected item (values below 1.0 are treated as 1.0)
    #[serde(default = "default_selected_item_scale")]
    pub selected_item_scale: f64,
    #[serde(default)]
    pub additional_items_to_scale: u32,
    #[serde(default = "default_additional_items_to_warp")]
    pub additional_items_to_warp: u32,
    /// 3-D tilt of items away from the selection, in degrees
    #[serde(default)]
    pub fliptych_degrees: f64,
    #[serde(default)]
    pub warp_intensity: i32,
    #[serde(default = "default_warp_curve")]
    pub warp_curve: f64,
    #[serde(default)]
    pub item_gap: i32,
    /// Navigation animation duration in milliseconds (0 disables animation)
    #[serde(default = "default_navigation_speed")]
    pub navigation_speed: u64,
    #[serde(default)]
    pub z_index_update_waits_for_animation: bool,
    /// Brush blended into recolorable targets of the selected item
    #[serde(default)]
    pub selected_item_foreground: Option<Brush>,
    /// Deadline for pending item measurements
    #[serde(default = "default_load_timeout")]
    pub load_timeout_ms: u64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            layout_mode: LayoutMode::default(),
            wheel_alignment: WheelAlignment::default(),
            density: default_density(),
            selected_index: 0,
            selected_item_scale: default_selected_item_scale(),
            additional_items_to_scale: 0,
            additional_items_to_warp: default_additional_items_to_warp(),
            fliptych_degrees: 0.0,
            warp_intensity: 0,
            warp_curve: default_warp_curve(),
            item_gap: 0,
            navigation_speed: default_navigation_speed(),
            z_index_update_waits_for_animation: false,
            selected_item_foreground: None,
            load_timeout_ms: default_load_timeout(),
        }
    }
}

/// How much of the carousel a configuration change invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Impact {
    /// Nothing changed
    None,
    /// Only animation timing changed
    Timing,
    /// Falloff effects must be recomputed in place
    Effects,
    /// The window must be rebuilt
    Rebuild,
}

/// Partial update of [`CarouselConfig`]; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarouselPatch {
    pub layout_mode: Option<LayoutMode>,
    pub wheel_alignment: Option<WheelAlignment>,
    pub density: Option<i64>,
    pub selected_index: Option<usize>,
    pub selected_item_scale: Option<f64>,
    pub additional_items_to_scale: Option<u32>,
    pub additional_items_to_warp: Option<u32>,
    pub fliptych_degrees: Option<f64>,
    pub warp_intensity: Option<i32>,
    pub warp_curve: Option<f64>,
    pub item_gap: Option<i32>,
    pub navigation_speed: Option<u64>,
    pub z_index_update_waits_for_animation: Option<bool>,
    pub selected_item_foreground: Option<Option<Brush>>,
    pub load_timeout_ms: Option<u64>,
}

/// Store `value` into `slot` and report whether it differed.
fn replace<T: PartialEq>(slot: &mut T, value: Option<T>) -> bool {
    match value {
        Some(value) if *slot != value => {
            *slot = value;
            true
        }
        _ => false,
    }
}

impl CarouselConfig {
    /// Apply a patch and return the strongest impact among the fields that changed.
    ///
    /// `selected_index` is not applied here: an external selection change is a navigation
    /// request, handled by the carousel itself.
    pub fn apply(&mut self, patch: CarouselPatch) -> Impact {
        let mut impact = Impact::None;
        let mut raise = |changed: bool, level: Impact| {
            if changed && level > impact {
                impact = level;
            }
        };

        let old_density = self.density();
        let density_changed = replace(&mut self.density, patch.density);
        raise(
            density_changed && self.density() != old_density,
            Impact::Rebuild,
        );
        raise(replace(&mut self.layout_mode, patch.layout_mode), Impact::Rebuild);
        raise(
            replace(&mut self.wheel_alignment, patch.wheel_alignment),
            Impact::Rebuild,
        );
        raise(replace(&mut self.item_gap, patch.item_gap), Impact::Rebuild);
        raise(
            replace(&mut self.load_timeout_ms, patch.load_timeout_ms),
            Impact::Timing,
        );

        raise(
            replace(&mut self.selected_item_scale, patch.selected_item_scale),
            Impact::Effects,
        );
        raise(
            replace(
                &mut self.additional_items_to_scale,
                patch.additional_items_to_scale,
            ),
            Impact::Effects,
        );
        raise(
            replace(&mut self.additional_items_to_warp, patch.additional_items_to_warp),
            Impact::Effects,
        );
        raise(
            replace(&mut self.fliptych_degrees, patch.fliptych_degrees),
            Impact::Effects,
        );
        raise(
            replace(&mut self.warp_intensity, patch.warp_intensity),
            Impact::Effects,
        );
        raise(replace(&mut self.warp_curve, patch.warp_curve), Impact::Effects);
        raise(
            replace(
                &mut self.selected_item_foreground,
                patch.selected_item_foreground,
            ),
            Impact::Effects,
        );

        raise(
            replace(&mut self.navigation_speed, patch.navigation_speed),
            Impact::Timing,
        );
        raise(
            replace(
                &mut self.z_index_update_waits_for_animation,
                patch.z_index_update_waits_for_animation,
            ),
            Impact::Timing,
        );

        impact
    }

    /// Normalized window size
    pub fn density(&self) -> usize {
        density::normalize(self.density)
    }

    pub fn selected_scale(&self) -> f64 {
        self.selected_item_scale.max(1.0)
    }

    pub fn items_to_scale(&self) -> usize {
        density::cap_additional(self.additional_items_to_scale, self.density())
    }

    pub fn items_to_warp(&self) -> usize {
        density::cap_additional(self.additional_items_to_warp, self.density())
    }

    /// Tilt only kicks in beyond one degree either way
    pub fn use_fliptych(&self) -> bool {
        self.fliptych_degrees > 1.0 || self.fliptych_degrees < -1.0
    }

    pub fn navigation_duration(&self) -> Duration {
        Duration::from_millis(self.navigation_speed)
    }

    /// Delay before depth order is refreshed after a step, when it waits for the animation
    pub fn depth_refresh_delay(&self) -> Option<Duration> {
        if self.navigation_speed > 1 && self.z_index_update_waits_for_animation {
            Some(Duration::from_millis(self.navigation_speed / 2))
        } else {
            None
        }
    }

    /// Duration of the wheel's snap-to-slot animation after a gesture
    pub fn wheel_snap_duration(&self) -> Duration {
        Duration::from_millis((self.navigation_speed / 2).min(500))
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tick rate in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub colors: UiColors,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            animation: AnimationConfig::default(),
            colors: UiColors::default(),
        }
    }
}

/// Easing curve for slot transitions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    None,
    #[default]
    Linear,
    Cubic,
    Quintic,
    EaseOut,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Animate slot transitions
    #[serde(default = "default_true")]
    pub smooth_enabled: bool,
    #[serde(default)]
    pub easing: EasingType,
    /// Frame rate while a transition is running
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            smooth_enabled: default_true(),
            easing: EasingType::default(),
            animation_fps: default_animation_fps(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiColors {
    /// Label color of items away from the selection
    #[serde(default = "default_deselected_color")]
    pub deselected: Rgba,
    /// Border color of the selected item
    #[serde(default = "default_accent_color")]
    pub accent: Rgba,
    #[serde(default = "default_background_color")]
    pub background: Rgba,
}

impl Default for UiColors {
    fn default() -> Self {
        Self {
            deselected: default_deselected_color(),
            accent: default_accent_color(),
            background: default_background_color(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_density() -> i64 {
    36
}

fn default_selected_item_scale() -> f64 {
    1.0
}

fn default_additional_items_to_warp() -> u32 {
    4
}

fn default_warp_curve() -> f64 {
    0.002
}

fn default_navigation_speed() -> u64 {
    500
}

fn default_load_timeout() -> u64 {
    5000
}

fn default_tick_rate() -> u64 {
    100
}

fn default_animation_fps() -> u32 {
    60
}

fn default_deselected_color() -> Rgba {
    Rgba::rgb(0xa8, 0x99, 0x84)
}

fn default_accent_color() -> Rgba {
    Rgba::rgb(0x89, 0xb4, 0x82)
}

fn default_background_color() -> Rgba {
    Rgba::rgb(0x28, 0x28, 0x28)
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&config_path, self.to_toml()?)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/carousel/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("carousel")
            .join("config.toml")
    }
}
