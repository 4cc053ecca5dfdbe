// ============================================================================
// DESKTOP HOST
// ============================================================================
//
// Owns the winit event loop and the pixels surface, ticks the gauge once per
// frame and redraws only after the gauge asked for it.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use pixels::{Pixels, SurfaceTexture};
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::gauge::FlowMeter;
use crate::raster::PixelRenderer;
use crate::renderer::Renderer;

/// Command enum for driving a shown gauge from another thread
#[derive(Debug, Clone, PartialEq)]
pub enum FlowMeterCommand {
    SetValue {
        value: i32,
        animate: bool,
        reset: bool,
    },
    SetCalibration {
        breakpoints: Vec<i32>,
        minor_labels: Option<Vec<String>>,
        minor_steps: usize,
    },
    SetArcAngles(f64, f64),
    SetInfo(String),
}

impl FlowMeter {
    pub fn apply(&mut self, command: FlowMeterCommand) {
        match command {
            FlowMeterCommand::SetValue {
                value,
                animate,
                reset,
            } => self.set_value_with(value, animate, reset),
            FlowMeterCommand::SetCalibration {
                breakpoints,
                minor_labels,
                minor_steps,
            } => {
                // rejected input is already logged and leaves the gauge as is
                let _ = self.set_calibration(&breakpoints, minor_labels, minor_steps);
            }
            FlowMeterCommand::SetArcAngles(start, sweep) => {
                let _ = self.set_arc_angles(start, sweep);
            }
            FlowMeterCommand::SetInfo(info) => self.set_info(info),
        }
    }

    pub fn show(self) -> Result<(), Box<dyn std::error::Error>> {
        self.run_window(None)
    }

    pub fn show_with_commands(
        self,
        receiver: Receiver<FlowMeterCommand>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.run_window(Some(receiver))
    }

    fn run_window(
        mut self,
        receiver: Option<Receiver<FlowMeterCommand>>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let logical_size = f64::from(self.config.size);

        let event_loop = EventLoop::new()?;
        let window = WindowBuilder::new()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(logical_size, logical_size))
            .with_resizable(false)
            .build(&event_loop)?;

        let window = std::sync::Arc::new(window);
        let window_clone = window.clone();

        let dirty = Rc::new(Cell::new(true));
        let flag = dirty.clone();
        self.on_redraw(move || flag.set(true));

        let mut scale_factor = window.scale_factor();
        let mut renderer = PixelRenderer::new(&self.config, scale_factor)?;

        let size = window.inner_size();
        let mut fb_width = size.width;
        let mut fb_height = size.height;
        let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
        let mut pixels = Pixels::new(size.width, size.height, surface_texture)?;
        renderer.layout(self.arc_rect(fb_width.min(fb_height), scale_factor));

        let frame_duration = Duration::from_secs_f64(1.0 / self.config.max_framerate.max(1.0));
        let mut last_tick = Instant::now();
        log::info!(
            "showing {:?} ({}x{} px, scale {scale_factor})",
            self.config.title,
            fb_width,
            fb_height
        );

        event_loop.run(move |event, window_target| match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if new_size.width == 0 || new_size.height == 0 {
                        return;
                    }
                    fb_width = new_size.width;
                    fb_height = new_size.height;
                    if let Err(err) = pixels.resize_buffer(fb_width, fb_height) {
                        log::error!("failed to resize frame buffer: {err}");
                    }
                    if let Err(err) = pixels.resize_surface(fb_width, fb_height) {
                        log::error!("failed to resize surface: {err}");
                    }
                    renderer.layout(self.arc_rect(fb_width.min(fb_height), scale_factor));
                    dirty.set(true);
                }
                WindowEvent::ScaleFactorChanged {
                    scale_factor: new_scale,
                    ..
                } => {
                    scale_factor = new_scale;
                    renderer.set_scale_factor(scale_factor);
                    renderer.layout(self.arc_rect(fb_width.min(fb_height), scale_factor));
                    dirty.set(true);
                }
                WindowEvent::RedrawRequested => {
                    match self.draw(&mut renderer) {
                        Ok(()) => {}
                        Err(never) => match never {},
                    }
                    renderer.render(pixels.frame_mut(), fb_width as usize, fb_height as usize);
                    if let Err(err) = pixels.render() {
                        log::error!("render failed: {err}");
                        window_target.exit();
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                let now = Instant::now();
                if now.duration_since(last_tick) >= frame_duration {
                    if let Some(ref receiver) = receiver {
                        // Drain without blocking the frame
                        while let Ok(command) = receiver.try_recv() {
                            self.apply(command);
                        }
                    }
                    self.advance(now - last_tick);
                    last_tick = now;
                    if dirty.replace(false) {
                        window_clone.request_redraw();
                    }
                }
                window_target.set_control_flow(ControlFlow::WaitUntil(last_tick + frame_duration));
            }
            _ => {}
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FlowMeterConfig;
    use std::sync::mpsc;

    #[test]
    fn commands_drive_the_gauge() {
        let mut meter = FlowMeter::new(FlowMeterConfig::default()).unwrap();
        let (sender, receiver) = mpsc::channel();
        let commands = [
            FlowMeterCommand::SetInfo("10:00".to_string()),
            FlowMeterCommand::SetValue {
                value: 500,
                animate: false,
                reset: false,
            },
            FlowMeterCommand::SetArcAngles(180.0, 180.0),
            FlowMeterCommand::SetCalibration {
                breakpoints: vec![7],
                minor_labels: None,
                minor_steps: 1,
            },
        ];
        for command in commands {
            sender.send(command).unwrap();
        }
        drop(sender);

        while let Ok(command) = receiver.try_recv() {
            meter.apply(command);
        }

        assert_eq!(meter.value(), 500);
        assert_eq!(meter.current_time().as_deref(), Some("10:00"));
        assert_eq!(meter.calibration().arc_sweep_angle(), 180.0);
        assert_eq!(meter.progress_sweep_angle(), 90.0);
        // the single-breakpoint calibration was refused
        assert_eq!(meter.max(), 800);
    }

    #[test]
    fn animated_command_runs_on_advance() {
        let mut meter = FlowMeter::new(FlowMeterConfig::default()).unwrap();
        meter.apply(FlowMeterCommand::SetValue {
            value: 800,
            animate: true,
            reset: true,
        });
        assert!(meter.is_animating());
        meter.advance(Duration::from_secs(3));
        assert!(!meter.is_animating());
        assert_eq!(meter.value(), 800);
    }
}
