//! Drawing contract between the gauge core and whatever paints it.

use crate::calibration::CalibrationModel;
use crate::config::TextStyle;

/// Square the dial arc is inscribed in, in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl ArcRect {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    pub fn radius(&self) -> f32 {
        ((self.right - self.left).min(self.bottom - self.top) / 2.0).max(0.0)
    }
}

/// Text block in the middle of the dial.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeText<'a> {
    pub value: i32,
    pub unit: Option<&'a str>,
    pub value_level: Option<&'a str>,
    pub current_time: Option<&'a str>,
    pub value_style: TextStyle,
    pub date_style: TextStyle,
    /// Gap between lines, logical pixels.
    pub spacing: f32,
}

/// Paints a gauge. [`FlowMeter::draw`](crate::FlowMeter::draw) calls
/// `draw_arc`, `draw_progress_arc` and `draw_text` in that order for every
/// frame; `layout` is called by the host whenever the surface size changes.
pub trait Renderer {
    type Error;

    fn layout(&mut self, rect: ArcRect);

    /// Dial background, ticks and calibration labels.
    fn draw_arc(&mut self, calibration: &CalibrationModel) -> Result<(), Self::Error>;

    /// Progress arc from `start_angle`, `sweep` degrees clockwise.
    fn draw_progress_arc(&mut self, start_angle: f64, sweep: f64) -> Result<(), Self::Error>;

    fn draw_text(&mut self, text: &GaugeText<'_>) -> Result<(), Self::Error>;
}

/// Logical to physical pixels, rounded to nearest.
pub fn dp_to_px(dp: f32, scale_factor: f64) -> i32 {
    (f64::from(dp) * scale_factor + 0.5) as i32
}
