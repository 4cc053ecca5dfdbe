use std::time::Duration;

use crate::animator::ProgressAnimator;
use crate::calibration::CalibrationModel;
use crate::config::{FlowMeterConfig, TextStyle, DEFAULT_PADDING};
use crate::error::ConfigurationError;
use crate::renderer::{dp_to_px, ArcRect, GaugeText, Renderer};

const DATE_PLACEHOLDER: &str = "{date}";
const LEVEL_PLACEHOLDER: &str = "{level}";

/// A flow meter widget: calibration, progress animation and the text shown
/// inside the dial.
///
/// The widget does not draw or tick on its own. The host calls
/// [`advance`](Self::advance) from its frame loop and [`draw`](Self::draw)
/// when the redraw callback has fired.
pub struct FlowMeter {
    pub(crate) config: FlowMeterConfig,
    calibration: CalibrationModel,
    animator: ProgressAnimator,
    info: Option<String>,
    date_text: Option<String>,
    redraw: Option<Box<dyn FnMut()>>,
}

impl FlowMeter {
    pub fn new(config: FlowMeterConfig) -> Result<Self, ConfigurationError> {
        let calibration = CalibrationModel::new(
            config.breakpoints.clone(),
            config.minor_labels.clone(),
            config.minor_steps_per_interval,
            config.arc_start_angle,
            config.arc_sweep_angle,
        )?;
        let animator = ProgressAnimator::new(&calibration, config.animation_duration);

        Ok(Self {
            config,
            calibration,
            animator,
            info: None,
            date_text: None,
            redraw: None,
        })
    }

    /// Registers the callback fired whenever the displayed state changes.
    pub fn on_redraw(&mut self, callback: impl FnMut() + 'static) {
        self.redraw = Some(Box::new(callback));
    }

    fn request_redraw(&mut self) {
        if let Some(redraw) = self.redraw.as_mut() {
            redraw();
        }
    }

    // ------------------------------------------------------------------
    // Value
    // ------------------------------------------------------------------

    pub fn set_value(&mut self, value: i32) {
        self.set_value_with(value, false, false);
    }

    /// Sets the value, optionally animating from the current reading or,
    /// with `reset_from_min`, from the bottom of the scale.
    pub fn set_value_with(&mut self, value: i32, animate: bool, reset_from_min: bool) {
        self.date_text = self.info.clone();
        self.animator
            .set_value(&self.calibration, value, animate, reset_from_min);
        self.request_redraw();
    }

    /// Advances any running animation; the host calls this once per frame.
    pub fn advance(&mut self, delta: Duration) {
        if self.animator.advance(delta) {
            self.request_redraw();
        }
    }

    pub fn cancel_animation(&mut self) {
        self.animator.cancel();
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_animating()
    }

    pub fn value(&self) -> i32 {
        self.animator.value()
    }

    /// Current progress sweep in degrees.
    pub fn progress_sweep_angle(&self) -> f64 {
        self.animator.angle()
    }

    pub fn min(&self) -> i32 {
        self.calibration.min()
    }

    pub fn max(&self) -> i32 {
        self.calibration.max()
    }

    // ------------------------------------------------------------------
    // Calibration
    // ------------------------------------------------------------------

    /// Replaces the breakpoints. Invalid input is rejected and the gauge
    /// keeps its previous calibration.
    pub fn set_calibration(
        &mut self,
        breakpoints: &[i32],
        minor_labels: Option<Vec<String>>,
        minor_steps: usize,
    ) -> Result<(), ConfigurationError> {
        if let Err(err) = self
            .calibration
            .set_calibration(breakpoints, minor_labels, minor_steps)
        {
            log::warn!("ignoring calibration {breakpoints:?}: {err}");
            return Err(err);
        }
        self.animator.resync(&self.calibration);
        self.request_redraw();
        Ok(())
    }

    pub fn set_arc_angles(&mut self, start: f64, sweep: f64) -> Result<(), ConfigurationError> {
        if let Err(err) = self.calibration.set_arc_angles(start, sweep) {
            log::warn!("ignoring arc angles: {err}");
            return Err(err);
        }
        self.animator.resync(&self.calibration);
        self.request_redraw();
        Ok(())
    }

    pub fn calibration(&self) -> &CalibrationModel {
        &self.calibration
    }

    pub fn set_animation_duration(&mut self, duration: Duration) {
        self.animator.set_duration(duration);
    }

    // ------------------------------------------------------------------
    // Text
    // ------------------------------------------------------------------

    /// Sets the "current time" string. It is picked up by the next `set_value`.
    pub fn set_info(&mut self, info: impl Into<String>) {
        self.info = Some(info.into());
    }

    pub fn info(&self) -> Option<&str> {
        self.info.as_deref()
    }

    pub fn set_unit_info(&mut self, unit: impl Into<String>) {
        self.config.unit_info = Some(unit.into());
    }

    pub fn unit_info(&self) -> Option<&str> {
        self.config.unit_info.as_deref()
    }

    /// Template for the time line, e.g. `"Updated {date}"`.
    pub fn set_date_pattern(&mut self, pattern: impl Into<String>) {
        self.config.date_pattern = Some(pattern.into());
    }

    /// Template for the level line, e.g. `"Level: {level}"`.
    pub fn set_value_level_pattern(&mut self, pattern: impl Into<String>) {
        self.config.value_level_pattern = Some(pattern.into());
    }

    pub fn set_text_spacing(&mut self, spacing: f32) {
        self.config.text_spacing = spacing;
        self.request_redraw();
    }

    pub fn set_value_style(&mut self, style: TextStyle) {
        self.config.value_style = style;
        self.request_redraw();
    }

    pub fn set_date_style(&mut self, style: TextStyle) {
        self.config.date_style = style;
        self.request_redraw();
    }

    /// Label of the interval holding the displayed value, run through the
    /// level pattern. `None` when the calibration has no interval labels.
    pub fn value_level(&self) -> Option<String> {
        let index = self.calibration.interval_index(self.value());
        let label = self.calibration.minor_labels().get(index)?;
        Some(apply_pattern(
            self.config.value_level_pattern.as_deref(),
            LEVEL_PLACEHOLDER,
            label,
        ))
    }

    /// Time captured at the last `set_value`, run through the date pattern.
    pub fn current_time(&self) -> Option<String> {
        let date = self.date_text.as_deref()?;
        Some(apply_pattern(
            self.config.date_pattern.as_deref(),
            DATE_PLACEHOLDER,
            date,
        ))
    }

    // ------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------

    /// Arc rectangle for a square surface `width` physical pixels wide.
    pub fn arc_rect(&self, width: u32, scale_factor: f64) -> ArcRect {
        let padding = self.config.padding.max(DEFAULT_PADDING);
        let padding = dp_to_px(padding, scale_factor) as f32;
        let width = width as f32;
        ArcRect::new(padding, padding, width - padding, width - padding)
    }

    pub fn draw<R: Renderer>(&self, renderer: &mut R) -> Result<(), R::Error> {
        let level = self.value_level();
        let time = self.current_time();

        renderer.draw_arc(&self.calibration)?;
        renderer.draw_progress_arc(self.calibration.arc_start_angle(), self.animator.angle())?;
        renderer.draw_text(&GaugeText {
            value: self.value(),
            unit: self.unit_info(),
            value_level: level.as_deref(),
            current_time: time.as_deref(),
            value_style: self.config.value_style,
            date_style: self.config.date_style,
            spacing: self.config.text_spacing,
        })
    }
}

fn apply_pattern(pattern: Option<&str>, placeholder: &str, text: &str) -> String {
    match pattern {
        Some(pattern) => pattern.replace(placeholder, text),
        None => text.to_string(),
    }
}
