//! Calibration breakpoints and the value-to-angle mapping.
//!
//! The dial is split into major intervals between consecutive breakpoints.
//! Intervals have equal angular width no matter how wide their value range
//! is, so `[0, 400, 600, 800]` spends as many degrees on `0..400` as on
//! `600..800`.

use crate::error::ConfigurationError;

/// Upper bound on ticks drawn around the dial.
pub const MAX_TICKS: usize = 1024;

/// Angles derived from the breakpoint count, minor step count and sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TickLayout {
    total_ticks: usize,
    major_step: f64,
    minor_step: f64,
}

impl TickLayout {
    fn compute(
        major_count: usize,
        minor_steps: usize,
        sweep: f64,
    ) -> Result<Self, ConfigurationError> {
        if major_count < 2 {
            return Err(ConfigurationError::TooFewBreakpoints(major_count));
        }
        let total_ticks = (major_count - 1)
            .checked_mul(minor_steps)
            .and_then(|minor| minor.checked_add(major_count))
            .filter(|&total| total <= MAX_TICKS)
            .ok_or(ConfigurationError::TooManyTicks(minor_steps))?;
        if total_ticks < 2 {
            return Err(ConfigurationError::TooFewBreakpoints(total_ticks));
        }
        Ok(Self {
            total_ticks,
            major_step: sweep / (major_count - 1) as f64,
            minor_step: sweep / (total_ticks - 1) as f64,
        })
    }
}

/// One tick mark, as an angle offset from the arc start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub offset: f64,
    pub major: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationModel {
    breakpoints: Vec<i32>,
    minor_labels: Vec<String>,
    minor_steps: usize,
    arc_start_angle: f64,
    arc_sweep_angle: f64,
    layout: TickLayout,
}

fn validate_breakpoints(breakpoints: &[i32]) -> Result<(), ConfigurationError> {
    let (Some(&min), Some(&max)) = (breakpoints.first(), breakpoints.last()) else {
        return Err(ConfigurationError::TooFewBreakpoints(0));
    };
    if breakpoints.len() < 2 {
        return Err(ConfigurationError::TooFewBreakpoints(breakpoints.len()));
    }
    if min >= max {
        return Err(ConfigurationError::EmptyRange { min, max });
    }
    if let Some(index) = breakpoints.windows(2).position(|pair| pair[0] >= pair[1]) {
        return Err(ConfigurationError::NotIncreasing {
            index: index + 1,
            value: breakpoints[index + 1],
            previous: breakpoints[index],
        });
    }
    Ok(())
}

fn validate_arc(start: f64, sweep: f64) -> Result<(), ConfigurationError> {
    if !start.is_finite() || !sweep.is_finite() || sweep < 0.0 {
        return Err(ConfigurationError::InvalidArc { start, sweep });
    }
    Ok(())
}

impl CalibrationModel {
    pub fn new(
        breakpoints: Vec<i32>,
        minor_labels: Vec<String>,
        minor_steps: usize,
        arc_start_angle: f64,
        arc_sweep_angle: f64,
    ) -> Result<Self, ConfigurationError> {
        validate_breakpoints(&breakpoints)?;
        validate_arc(arc_start_angle, arc_sweep_angle)?;
        let layout = TickLayout::compute(breakpoints.len(), minor_steps, arc_sweep_angle)?;
        Ok(Self {
            breakpoints,
            minor_labels,
            minor_steps,
            arc_start_angle,
            arc_sweep_angle,
            layout,
        })
    }

    /// Replaces breakpoints, interval labels and minor step count.
    ///
    /// On error nothing changes.
    pub fn set_calibration(
        &mut self,
        breakpoints: &[i32],
        minor_labels: Option<Vec<String>>,
        minor_steps: usize,
    ) -> Result<(), ConfigurationError> {
        validate_breakpoints(breakpoints)?;
        let layout = TickLayout::compute(breakpoints.len(), minor_steps, self.arc_sweep_angle)?;

        self.breakpoints = breakpoints.to_vec();
        self.minor_labels = minor_labels.unwrap_or_default();
        self.minor_steps = minor_steps;
        self.layout = layout;
        log::debug!(
            "calibration set to {:?} with {} minor steps ({} ticks)",
            self.breakpoints,
            minor_steps,
            layout.total_ticks
        );
        Ok(())
    }

    pub fn set_arc_angles(&mut self, start: f64, sweep: f64) -> Result<(), ConfigurationError> {
        validate_arc(start, sweep)?;
        let layout = TickLayout::compute(self.breakpoints.len(), self.minor_steps, sweep)?;

        self.arc_start_angle = start;
        self.arc_sweep_angle = sweep;
        self.layout = layout;
        Ok(())
    }

    /// Recomputes the derived tick constants from the current inputs.
    pub fn reset_calibration_data(&mut self) -> Result<(), ConfigurationError> {
        self.layout = TickLayout::compute(
            self.breakpoints.len(),
            self.minor_steps,
            self.arc_sweep_angle,
        )?;
        Ok(())
    }

    /// Maps a raw value to the progress sweep in degrees, `0..=arc_sweep_angle`.
    pub fn compute_sweep_angle(&self, value: i32) -> f64 {
        if value <= self.min() {
            return 0.0;
        }
        if value >= self.max() {
            return self.arc_sweep_angle;
        }

        // First breakpoint strictly above the value closes its interval.
        match self.breakpoints.iter().position(|&b| b > value) {
            Some(upper) if upper > 0 => {
                let index = upper - 1;
                let low = f64::from(self.breakpoints[index]);
                let high = f64::from(self.breakpoints[upper]);
                self.layout.major_step * index as f64
                    + (f64::from(value) - low) / (high - low) * self.layout.major_step
            }
            _ => {
                log::warn!(
                    "value {value} not inside any interval of {:?}, using linear mapping",
                    self.breakpoints
                );
                self.linear_sweep_angle(value)
            }
        }
    }

    fn linear_sweep_angle(&self, value: i32) -> f64 {
        let (min, max) = (f64::from(self.min()), f64::from(self.max()));
        (f64::from(value) - min) / (max - min) * self.arc_sweep_angle
    }

    /// Index of the major interval holding `value`, after clamping to the range.
    pub fn interval_index(&self, value: i32) -> usize {
        let last = self.breakpoints.len() - 2;
        self.breakpoints
            .iter()
            .position(|&b| b > value)
            .map_or(last, |upper| upper.saturating_sub(1).min(last))
    }

    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.min(), self.max())
    }

    /// All ticks from the arc start to its end, majors on the breakpoints.
    pub fn ticks(&self) -> impl Iterator<Item = Tick> + '_ {
        let stride = self.minor_steps + 1;
        (0..self.layout.total_ticks).map(move |k| Tick {
            offset: k as f64 * self.layout.minor_step,
            major: k % stride == 0,
        })
    }

    /// Angle offset of the middle of interval `index`, where its label sits.
    pub fn interval_label_offset(&self, index: usize) -> f64 {
        self.layout.major_step * (index as f64 + 0.5)
    }

    pub fn min(&self) -> i32 {
        self.breakpoints[0]
    }

    pub fn max(&self) -> i32 {
        self.breakpoints[self.breakpoints.len() - 1]
    }

    pub fn breakpoints(&self) -> &[i32] {
        &self.breakpoints
    }

    pub fn minor_labels(&self) -> &[String] {
        &self.minor_labels
    }

    pub fn minor_steps(&self) -> usize {
        self.minor_steps
    }

    pub fn arc_start_angle(&self) -> f64 {
        self.arc_start_angle
    }

    pub fn arc_sweep_angle(&self) -> f64 {
        self.arc_sweep_angle
    }

    pub fn total_tick_count(&self) -> usize {
        self.layout.total_ticks
    }

    pub fn degrees_per_major_interval(&self) -> f64 {
        self.layout.major_step
    }

    pub fn degrees_per_minor_tick(&self) -> f64 {
        self.layout.minor_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn default_model() -> CalibrationModel {
        CalibrationModel::new(vec![0, 400, 600, 800], Vec::new(), 3, 165.0, 210.0).unwrap()
    }

    #[test]
    fn derived_constants() {
        let model = default_model();
        assert_eq!(model.total_tick_count(), 13);
        assert_abs_diff_eq!(model.degrees_per_major_interval(), 70.0);
        assert_abs_diff_eq!(model.degrees_per_minor_tick(), 17.5);
    }

    #[test]
    fn endpoints_map_to_arc_ends() {
        let model = default_model();
        assert_eq!(model.compute_sweep_angle(0), 0.0);
        assert_eq!(model.compute_sweep_angle(800), 210.0);
        assert_eq!(model.compute_sweep_angle(-10), 0.0);
        assert_eq!(model.compute_sweep_angle(5000), 210.0);
    }

    #[test]
    fn interval_interpolation() {
        let model = default_model();
        assert_abs_diff_eq!(model.compute_sweep_angle(400), 70.0);
        assert_abs_diff_eq!(model.compute_sweep_angle(500), 105.0);
        assert_abs_diff_eq!(model.compute_sweep_angle(200), 35.0);
        assert_abs_diff_eq!(model.compute_sweep_angle(700), 175.0);
    }

    #[test]
    fn sweep_angle_is_monotonic() {
        let model = CalibrationModel::new(vec![-50, 0, 10, 1000], Vec::new(), 2, 0.0, 270.0).unwrap();
        let mut previous = model.compute_sweep_angle(-50);
        for value in -49..=1000 {
            let angle = model.compute_sweep_angle(value);
            assert!(angle >= previous, "angle dropped at {value}: {angle} < {previous}");
            previous = angle;
        }
        assert_eq!(previous, 270.0);
    }

    #[test]
    fn breakpoint_belongs_to_interval_it_starts() {
        let model = default_model();
        assert_eq!(model.interval_index(0), 0);
        assert_eq!(model.interval_index(399), 0);
        assert_eq!(model.interval_index(400), 1);
        assert_eq!(model.interval_index(600), 2);
        assert_eq!(model.interval_index(800), 2);
        assert_eq!(model.interval_index(-1), 0);
    }

    #[test]
    fn linear_fallback_spans_whole_range() {
        let model = default_model();
        assert_abs_diff_eq!(model.linear_sweep_angle(400), 105.0);
        assert_abs_diff_eq!(model.linear_sweep_angle(800), 210.0);
    }

    #[test]
    fn rejects_short_calibration_and_keeps_state() {
        let mut model = default_model();
        let before = model.clone();

        assert_eq!(
            model.set_calibration(&[100], None, 2),
            Err(ConfigurationError::TooFewBreakpoints(1))
        );
        assert_eq!(
            model.set_calibration(&[], None, 2),
            Err(ConfigurationError::TooFewBreakpoints(0))
        );
        assert_eq!(
            model.set_calibration(&[10, 10], None, 2),
            Err(ConfigurationError::EmptyRange { min: 10, max: 10 })
        );
        assert_eq!(
            model.set_calibration(&[0, 50, 40, 100], None, 2),
            Err(ConfigurationError::NotIncreasing {
                index: 2,
                value: 40,
                previous: 50
            })
        );
        assert_eq!(model, before);
    }

    #[test]
    fn set_calibration_recomputes() {
        let mut model = default_model();
        let labels = vec!["low".to_string(), "high".to_string()];
        model.set_calibration(&[0, 100, 1000], Some(labels.clone()), 0).unwrap();

        assert_eq!(model.min(), 0);
        assert_eq!(model.max(), 1000);
        assert_eq!(model.minor_labels(), labels.as_slice());
        assert_eq!(model.total_tick_count(), 3);
        assert_abs_diff_eq!(model.degrees_per_major_interval(), 105.0);
        assert_abs_diff_eq!(model.compute_sweep_angle(550), 157.5);
    }

    #[test]
    fn arc_angles_recompute_and_validate() {
        let mut model = default_model();
        model.set_arc_angles(135.0, 270.0).unwrap();
        assert_abs_diff_eq!(model.degrees_per_major_interval(), 90.0);
        assert_abs_diff_eq!(model.compute_sweep_angle(500), 135.0);

        let before = model.clone();
        assert!(model.set_arc_angles(0.0, -10.0).is_err());
        assert!(model.set_arc_angles(f64::NAN, 90.0).is_err());
        assert_eq!(model, before);
    }

    #[test]
    fn minor_step_overflow_is_rejected() {
        let mut model = default_model();
        assert_eq!(
            model.set_calibration(&[0, 1, 2], None, usize::MAX),
            Err(ConfigurationError::TooManyTicks(usize::MAX))
        );
        assert_eq!(model.breakpoints(), &[0, 400, 600, 800]);
    }

    #[test]
    fn tick_count_is_bounded() {
        let mut model = default_model();
        assert_eq!(
            model.set_calibration(&[0, 1, 2], None, 1_000_000_000),
            Err(ConfigurationError::TooManyTicks(1_000_000_000))
        );
        assert_eq!(model.total_tick_count(), 13);

        // 3 + 2 * 510 is the largest count under the limit
        model.set_calibration(&[0, 1, 2], None, 510).unwrap();
        assert_eq!(model.total_tick_count(), MAX_TICKS - 1);
        assert_eq!(model.ticks().count(), MAX_TICKS - 1);
        assert!(model.set_calibration(&[0, 1, 2], None, 511).is_err());
    }

    #[test]
    fn ticks_cover_the_arc() {
        let model = default_model();
        let ticks: Vec<Tick> = model.ticks().collect();
        assert_eq!(ticks.len(), 13);
        assert_eq!(ticks.iter().filter(|t| t.major).count(), 4);
        assert!(ticks[4].major);
        assert_abs_diff_eq!(ticks[4].offset, 70.0);
        assert_abs_diff_eq!(ticks[12].offset, 210.0);
        assert_abs_diff_eq!(model.interval_label_offset(1), 105.0);
    }

    #[test]
    fn reset_keeps_consistent_layout() {
        let mut model = default_model();
        let before = model.clone();
        model.reset_calibration_data().unwrap();
        assert_eq!(model, before);
    }
}
