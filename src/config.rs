use bon::Builder;
use std::time::Duration;

use crate::easing::Easing;
use crate::scheduler::SpinParams;

/// Color representation for wheel elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn as_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Builder)]
pub struct WheelConfig {
    #[builder(default = "Wheel".to_string())]
    pub title: String,

    // Window configuration
    #[builder(default = 480)]
    pub window_width: usize,
    #[builder(default = 480)]
    pub window_height: usize,
    #[builder(default = 60.0)]
    pub max_framerate: f64,

    // Wheel layout
    #[builder(default = 40)]
    pub wheel_margin: i32,
    #[builder(default = 3)]
    pub rim_thickness: i32,
    #[builder(default = 0.22)]
    pub hub_radius_factor: f64,
    #[builder(default = 1.2)]
    pub divider_thickness: f32,

    // Pointer configuration (drawn at 3 o'clock in the un-rotated frame)
    #[builder(default = 14)]
    pub pointer_half_width: i32,
    #[builder(default = 0.14)]
    pub pointer_depth_factor: f64,
    #[builder(default = 10)]
    pub pointer_overhang: i32,

    // Labels
    #[builder(default = 20.0)]
    pub label_font_size: f32,
    #[builder(default = 0.64)]
    pub label_radius_factor: f64,
    pub font_data: Option<Vec<u8>>,

    // Spin behavior
    #[builder(default = Duration::from_millis(6000))]
    pub spin_duration: Duration,
    #[builder(default = 4)]
    pub min_full_turns: u32,
    #[builder(default = Easing::CubicOut)]
    pub easing: Easing,

    // Colors
    #[builder(default = Color::new(0x12, 0x12, 0x14))]
    pub background_color: Color,
    #[builder(default = Color::new(0xc7, 0xc7, 0xc7))]
    pub rim_color: Color,
    #[builder(default = Color::new(0xe6, 0xe6, 0xe6))]
    pub text_color: Color,
    #[builder(default = Color::new(0xe6, 0xe6, 0xe6))]
    pub pointer_color: Color,
    #[builder(default = Color::new(0x1a, 0x1a, 0x1a))]
    pub hub_color: Color,
    #[builder(default = Color::new(0x3d, 0xd6, 0xc6))]
    pub highlight_color: Color,
    /// Wedge fill colors, assigned per category in order of first appearance
    /// and cycled when categories outnumber entries.
    #[builder(default = vec![
        Color::new(0x14, 0x4e, 0x44),
        Color::new(0x2a, 0x2a, 0x2a),
        Color::new(0x4a, 0x30, 0x52),
        Color::new(0x1e, 0x3a, 0x5f),
        Color::new(0x5f, 0x36, 0x1e),
        Color::new(0x36, 0x45, 0x1e),
    ])]
    pub palette: Vec<Color>,
}

impl WheelConfig {
    /// Spin parameters derived from the configured defaults.
    pub fn spin_params(&self) -> SpinParams {
        SpinParams {
            duration: self.spin_duration,
            min_full_turns: self.min_full_turns.max(1),
            easing: self.easing,
        }
    }
}
