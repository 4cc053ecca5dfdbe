use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use approx::assert_abs_diff_eq;
use flowmeter::{
    CalibrationModel, ConfigurationError, FlowMeter, FlowMeterCommand, FlowMeterConfig,
    PixelRenderer, Renderer,
};

const FRAME: Duration = Duration::from_micros(16_667);

fn meter() -> FlowMeter {
    FlowMeter::new(FlowMeterConfig::default()).unwrap()
}

/// Ticks at 60 Hz until the animation stops, returning every displayed angle.
fn run_to_rest(meter: &mut FlowMeter) -> Vec<f64> {
    let mut angles = vec![meter.progress_sweep_angle()];
    let mut frames = 0;
    while meter.is_animating() {
        meter.advance(FRAME);
        angles.push(meter.progress_sweep_angle());
        frames += 1;
        assert!(frames < 1000, "animation did not settle");
    }
    angles
}

#[test]
fn default_scale_maps_breakpoints_to_equal_shares() {
    let cal = meter().calibration().clone();
    assert_eq!(cal.breakpoints(), &[0, 400, 600, 800]);
    assert_eq!(cal.total_tick_count(), 13);
    assert_abs_diff_eq!(cal.compute_sweep_angle(0), 0.0);
    assert_abs_diff_eq!(cal.compute_sweep_angle(400), 70.0);
    assert_abs_diff_eq!(cal.compute_sweep_angle(600), 140.0);
    assert_abs_diff_eq!(cal.compute_sweep_angle(700), 175.0);
    assert_abs_diff_eq!(cal.compute_sweep_angle(800), 210.0);
}

#[test]
fn animation_settles_on_target_at_sixty_hertz() {
    let mut meter = meter();
    meter.set_value_with(650, true, false);
    let angles = run_to_rest(&mut meter);

    // 2.5 s at 60 fps
    assert!((149..=152).contains(&angles.len()));
    assert!(angles.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(meter.value(), 650);
    assert_abs_diff_eq!(meter.progress_sweep_angle(), 157.5);
}

#[test]
fn retargeting_mid_flight_does_not_jump() {
    let mut meter = meter();
    meter.set_value_with(800, true, false);
    for _ in 0..60 {
        meter.advance(FRAME);
    }
    let before = meter.progress_sweep_angle();

    meter.set_value_with(200, true, false);
    assert_eq!(meter.progress_sweep_angle(), before);

    let angles = run_to_rest(&mut meter);
    let largest_step = angles
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).abs())
        .fold(0.0, f64::max);
    assert!(largest_step < 5.0, "jumped {largest_step} degrees");
    assert_eq!(meter.value(), 200);
}

#[test]
fn out_of_range_values_are_clamped() {
    let mut meter = meter();
    meter.set_value(-1);
    assert_eq!(meter.value(), 0);
    meter.set_value(i32::MAX);
    assert_eq!(meter.value(), 800);
    assert_eq!(meter.progress_sweep_angle(), 210.0);
}

#[test]
fn rejected_calibration_reports_the_reason() {
    let mut meter = meter();
    meter.set_value(300);

    assert_eq!(
        meter.set_calibration(&[], None, 3),
        Err(ConfigurationError::TooFewBreakpoints(0))
    );
    assert!(matches!(
        meter.set_calibration(&[0, 10, 10, 20], None, 3),
        Err(ConfigurationError::NotIncreasing { index: 2, .. })
    ));
    assert_eq!(meter.calibration().breakpoints(), &[0, 400, 600, 800]);
    assert_eq!(meter.value(), 300);
}

#[test]
fn recalibration_through_commands_redraws() {
    let mut meter = meter();
    let redraws = Rc::new(Cell::new(0));
    let counter = redraws.clone();
    meter.on_redraw(move || counter.set(counter.get() + 1));

    meter.apply(FlowMeterCommand::SetCalibration {
        breakpoints: vec![100, 200],
        minor_labels: Some(vec!["only".into()]),
        minor_steps: 9,
    });
    assert_eq!(redraws.get(), 1);
    assert_eq!(meter.value(), 100);
    assert_eq!(meter.calibration().total_tick_count(), 11);
    assert_eq!(meter.value_level().as_deref(), Some("only"));
}

#[test]
fn pixel_renderer_paints_a_frame() {
    let mut meter = meter();
    meter.set_value(800);

    let config = FlowMeterConfig::default();
    let mut renderer = PixelRenderer::new(&config, 1.0).unwrap();
    renderer.layout(meter.arc_rect(120, 1.0));
    meter.draw(&mut renderer).unwrap();

    let mut frame = vec![0u8; 120 * 120 * 4];
    renderer.render(&mut frame, 120, 120);
    assert!(frame.chunks_exact(4).all(|pixel| pixel[3] == 0xff));

    let distinct: std::collections::HashSet<_> =
        frame.chunks_exact(4).map(|pixel| [pixel[0], pixel[1], pixel[2]]).collect();
    assert!(distinct.len() > 2);
}

#[test]
fn calibration_model_is_usable_standalone() {
    let cal = CalibrationModel::new(vec![-10, 0, 10], Vec::new(), 1, 180.0, 180.0).unwrap();
    assert_eq!(cal.clamp(-50), -10);
    assert_abs_diff_eq!(cal.compute_sweep_angle(-5), 45.0);
    assert_eq!(cal.ticks().filter(|tick| tick.major).count(), 3);
}
