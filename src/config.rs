use std::time::Duration;

use bon::Builder;

/// Arc start angle in degrees (0° at 3 o'clock, clockwise).
pub const DEFAULT_ARC_START_ANGLE: f64 = 165.0;
/// Visual span of the whole gauge in degrees.
pub const DEFAULT_ARC_SWEEP_ANGLE: f64 = 210.0;
pub const DEFAULT_ANIMATION_TIME: Duration = Duration::from_millis(2500);
pub const DEFAULT_BREAKPOINTS: [i32; 4] = [0, 400, 600, 800];
pub const DEFAULT_MINOR_STEPS: usize = 3;
/// Minimum padding around the arc, in logical pixels.
pub const DEFAULT_PADDING: f32 = 30.0;
/// Default widget edge length, in logical pixels.
pub const DEFAULT_SIZE: u32 = 250;
pub const DEFAULT_TEXT_SPACING: f32 = 7.0;

/// Color representation for gauge elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::new(0x00, 0x00, 0x00);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Size (logical pixels) and color of one line of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub color: Color,
}

impl TextStyle {
    pub const fn new(size: f32, color: Color) -> Self {
        Self { size, color }
    }
}

/// Everything needed to build a [`FlowMeter`](crate::FlowMeter) and its window.
#[derive(Debug, Clone, Builder)]
pub struct FlowMeterConfig {
    #[builder(default = "Flow".to_string())]
    pub title: String,

    // Calibration
    #[builder(default = DEFAULT_BREAKPOINTS.to_vec())]
    pub breakpoints: Vec<i32>,
    #[builder(default)]
    pub minor_labels: Vec<String>,
    #[builder(default = DEFAULT_MINOR_STEPS)]
    pub minor_steps_per_interval: usize,
    #[builder(default = DEFAULT_ARC_START_ANGLE)]
    pub arc_start_angle: f64,
    #[builder(default = DEFAULT_ARC_SWEEP_ANGLE)]
    pub arc_sweep_angle: f64,

    // Animation
    #[builder(default = DEFAULT_ANIMATION_TIME)]
    pub animation_duration: Duration,
    #[builder(default = 60.0)]
    pub max_framerate: f64,

    // Layout
    #[builder(default = DEFAULT_SIZE)]
    pub size: u32,
    #[builder(default = DEFAULT_PADDING)]
    pub padding: f32,
    #[builder(default = DEFAULT_TEXT_SPACING)]
    pub text_spacing: f32,
    #[builder(default = 8.0)]
    pub arc_thickness: f32,
    #[builder(default = 12.0)]
    pub major_tick_length: f32,
    #[builder(default = 6.0)]
    pub minor_tick_length: f32,
    #[builder(default = 2.0)]
    pub major_tick_thickness: f32,
    #[builder(default = 1.0)]
    pub minor_tick_thickness: f32,
    #[builder(default = 11.0)]
    pub calibration_font_size: f32,

    // Text
    #[builder(default = TextStyle::new(22.0, Color::WHITE))]
    pub value_style: TextStyle,
    #[builder(default = TextStyle::new(12.0, Color::WHITE))]
    pub date_style: TextStyle,
    pub unit_info: Option<String>,
    /// Template for the time line, `{date}` is replaced.
    pub date_pattern: Option<String>,
    /// Template for the level line, `{level}` is replaced.
    pub value_level_pattern: Option<String>,

    // Colors
    pub background_color: Option<Color>,
    pub dial_color: Option<Color>,
    pub progress_color: Option<Color>,
    pub tick_color: Option<Color>,

    /// TrueType/OpenType font used for all text. Text is skipped without one.
    pub font_data: Option<Vec<u8>>,
}

impl Default for FlowMeterConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_match_constants() {
        let config = FlowMeterConfig::default();
        assert_eq!(config.breakpoints, DEFAULT_BREAKPOINTS.to_vec());
        assert_eq!(config.minor_steps_per_interval, DEFAULT_MINOR_STEPS);
        assert_eq!(config.arc_start_angle, DEFAULT_ARC_START_ANGLE);
        assert_eq!(config.arc_sweep_angle, DEFAULT_ARC_SWEEP_ANGLE);
        assert_eq!(config.animation_duration, Duration::from_millis(2500));
        assert!(config.minor_labels.is_empty());
        assert!(config.font_data.is_none());
    }

    #[test]
    fn builder_overrides() {
        let config = FlowMeterConfig::builder()
            .breakpoints(vec![0, 10, 100])
            .minor_steps_per_interval(0)
            .value_style(TextStyle::new(30.0, Color::BLACK))
            .unit_info("MB".to_string())
            .build();
        assert_eq!(config.breakpoints, vec![0, 10, 100]);
        assert_eq!(config.minor_steps_per_interval, 0);
        assert_eq!(config.value_style.color, Color::BLACK);
        assert_eq!(config.unit_info.as_deref(), Some("MB"));
    }
}
