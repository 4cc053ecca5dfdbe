//! Software renderer drawing the gauge into an RGBA8 frame buffer, the layout
//! `pixels` hands out from `frame_mut()`.

use std::convert::Infallible;
use std::f64::consts::TAU;

use rusttype::{point, Font, Point, Scale};

use crate::calibration::CalibrationModel;
use crate::config::{Color, FlowMeterConfig};
use crate::error::RenderError;
use crate::renderer::{dp_to_px, ArcRect, GaugeText, Renderer};

const DEFAULT_BACKGROUND: Color = Color::new(0x15, 0x65, 0xc0);
const DEFAULT_DIAL: Color = Color::new(0x64, 0xb5, 0xf6);
const DEFAULT_TICK: Color = Color::new(0xbb, 0xde, 0xfb);

// ============================================================================
// RETAINED MODE ABSTRACTIONS
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
enum DrawCommand {
    Clear(Color),
    Arc {
        cx: f32,
        cy: f32,
        r: f32,
        thickness: f32,
        start_angle: f64,
        sweep: f64,
        color: Color,
    },
    Tick {
        cx: f32,
        cy: f32,
        r: f32,
        angle: f64,
        length: f32,
        thickness: f32,
        color: Color,
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        font_size: f32,
        color: Color,
    },
}

struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    fn clear(&mut self, color: Color) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.r, color.g, color.b, 0xff]);
        }
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Color, alpha: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = (y as usize * self.width + x as usize) * 4;
        let Some(pixel) = self.frame.get_mut(idx..idx + 4) else {
            return;
        };
        let a = alpha.clamp(0.0, 1.0);
        let blend = |src: u8, dst: u8| (f32::from(src) * a + f32::from(dst) * (1.0 - a)).round() as u8;
        let out = [
            blend(color.r, pixel[0]),
            blend(color.g, pixel[1]),
            blend(color.b, pixel[2]),
            0xff,
        ];
        pixel.copy_from_slice(&out);
    }
}

/// Colors and stroke sizes, logical pixels.
#[derive(Debug, Clone, Copy)]
struct RasterStyle {
    background: Color,
    dial: Color,
    progress: Color,
    tick: Color,
    arc_thickness: f32,
    major_tick_length: f32,
    minor_tick_length: f32,
    major_tick_thickness: f32,
    minor_tick_thickness: f32,
    calibration_font_size: f32,
}

impl RasterStyle {
    fn from_config(config: &FlowMeterConfig) -> Self {
        Self {
            background: config.background_color.unwrap_or(DEFAULT_BACKGROUND),
            dial: config.dial_color.unwrap_or(DEFAULT_DIAL),
            progress: config.progress_color.unwrap_or(Color::WHITE),
            tick: config.tick_color.unwrap_or(DEFAULT_TICK),
            arc_thickness: config.arc_thickness,
            major_tick_length: config.major_tick_length,
            minor_tick_length: config.minor_tick_length,
            major_tick_thickness: config.major_tick_thickness,
            minor_tick_thickness: config.minor_tick_thickness,
            calibration_font_size: config.calibration_font_size,
        }
    }
}

/// [`Renderer`] that records draw commands and rasterizes them on
/// [`render`](Self::render).
pub struct PixelRenderer {
    commands: Vec<DrawCommand>,
    rect: ArcRect,
    scale_factor: f64,
    font: Option<Font<'static>>,
    style: RasterStyle,
}

impl PixelRenderer {
    pub fn new(config: &FlowMeterConfig, scale_factor: f64) -> Result<Self, RenderError> {
        let font = match &config.font_data {
            Some(data) => Some(Font::try_from_vec(data.clone()).ok_or(RenderError::InvalidFont)?),
            None => {
                log::info!("no font configured, gauge text will not be drawn");
                None
            }
        };
        Ok(Self {
            commands: Vec::new(),
            rect: ArcRect::new(0.0, 0.0, 0.0, 0.0),
            scale_factor,
            font,
            style: RasterStyle::from_config(config),
        })
    }

    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        self.scale_factor = scale_factor;
    }

    fn px(&self, dp: f32) -> f32 {
        dp_to_px(dp, self.scale_factor) as f32
    }

    /// Rasterizes and clears the recorded commands.
    pub fn render(&mut self, frame: &mut [u8], width: usize, height: usize) {
        let mut canvas = Canvas::new(frame, width, height);
        for command in self.commands.drain(..) {
            match command {
                DrawCommand::Clear(color) => canvas.clear(color),
                DrawCommand::Arc {
                    cx,
                    cy,
                    r,
                    thickness,
                    start_angle,
                    sweep,
                    color,
                } => render_arc(&mut canvas, cx, cy, r, thickness, start_angle, sweep, color),
                DrawCommand::Tick {
                    cx,
                    cy,
                    r,
                    angle,
                    length,
                    thickness,
                    color,
                } => {
                    let (cos, sin) = (angle.cos() as f32, angle.sin() as f32);
                    draw_thick_line_aa(
                        &mut canvas,
                        (cx + cos * (r - length), cy + sin * (r - length)),
                        (cx + cos * r, cy + sin * r),
                        thickness,
                        color,
                    );
                }
                DrawCommand::Text {
                    x,
                    y,
                    text,
                    font_size,
                    color,
                } => {
                    let Some(font) = self.font.as_ref() else {
                        continue;
                    };
                    let scale = Scale::uniform(font_size);
                    let metrics = font.v_metrics(scale);
                    let origin = centered_origin(
                        x,
                        y,
                        line_width(font, scale, &text),
                        metrics.ascent,
                        metrics.descent,
                    );
                    for glyph in font.layout(&text, scale, origin) {
                        let Some(bb) = glyph.pixel_bounding_box() else {
                            continue;
                        };
                        glyph.draw(|gx, gy, coverage| {
                            canvas.set_pixel(bb.min.x + gx as i32, bb.min.y + gy as i32, color, coverage);
                        });
                    }
                }
            }
        }
    }

    fn push_text(&mut self, x: f32, y: f32, text: String, font_size: f32, color: Color) {
        self.commands.push(DrawCommand::Text {
            x: x.round() as i32,
            y: y.round() as i32,
            text,
            font_size,
            color,
        });
    }
}

impl Renderer for PixelRenderer {
    type Error = Infallible;

    fn layout(&mut self, rect: ArcRect) {
        self.rect = rect;
    }

    fn draw_arc(&mut self, calibration: &CalibrationModel) -> Result<(), Infallible> {
        let style = self.style;
        let (cx, cy) = self.rect.center();
        let r = self.rect.radius();
        let thickness = self.px(style.arc_thickness);
        let start = calibration.arc_start_angle();

        self.commands.push(DrawCommand::Clear(style.background));
        self.commands.push(DrawCommand::Arc {
            cx,
            cy,
            r,
            thickness,
            start_angle: start.to_radians(),
            sweep: calibration.arc_sweep_angle().to_radians(),
            color: style.dial,
        });

        // Ticks sit just inside the band, labels inside the ticks.
        let tick_r = r - thickness - self.px(2.0);
        let major_len = self.px(style.major_tick_length);
        let minor_len = self.px(style.minor_tick_length);
        for tick in calibration.ticks() {
            let (length, thickness) = if tick.major {
                (major_len, self.px(style.major_tick_thickness))
            } else {
                (minor_len, self.px(style.minor_tick_thickness))
            };
            self.commands.push(DrawCommand::Tick {
                cx,
                cy,
                r: tick_r,
                angle: (start + tick.offset).to_radians(),
                length,
                thickness,
                color: style.tick,
            });
        }

        let font_size = self.px(style.calibration_font_size);
        let label_r = tick_r - major_len - font_size;
        let majors = calibration.ticks().filter(|tick| tick.major);
        for (tick, value) in majors.zip(calibration.breakpoints()) {
            let angle = (start + tick.offset).to_radians();
            self.push_text(
                cx + angle.cos() as f32 * label_r,
                cy + angle.sin() as f32 * label_r,
                value.to_string(),
                font_size,
                style.tick,
            );
        }

        let interval_r = r + font_size;
        for (index, label) in calibration.minor_labels().iter().enumerate() {
            let angle = (start + calibration.interval_label_offset(index)).to_radians();
            self.push_text(
                cx + angle.cos() as f32 * interval_r,
                cy + angle.sin() as f32 * interval_r,
                label.clone(),
                font_size,
                style.tick,
            );
        }
        Ok(())
    }

    fn draw_progress_arc(&mut self, start_angle: f64, sweep: f64) -> Result<(), Infallible> {
        let (cx, cy) = self.rect.center();
        self.commands.push(DrawCommand::Arc {
            cx,
            cy,
            r: self.rect.radius(),
            thickness: self.px(self.style.arc_thickness),
            start_angle: start_angle.to_radians(),
            sweep: sweep.to_radians(),
            color: self.style.progress,
        });
        Ok(())
    }

    fn draw_text(&mut self, text: &GaugeText<'_>) -> Result<(), Infallible> {
        let (cx, cy) = self.rect.center();
        let value_size = self.px(text.value_style.size);
        let date_size = self.px(text.date_style.size);
        let spacing = self.px(text.spacing);

        self.push_text(
            cx,
            cy,
            format!("{}{}", text.value, text.unit.unwrap_or_default()),
            value_size,
            text.value_style.color,
        );

        let mut y = cy + value_size / 2.0 + spacing + date_size / 2.0;
        for line in [text.value_level, text.current_time].into_iter().flatten() {
            self.push_text(cx, y, line.to_string(), date_size, text.date_style.color);
            y += date_size + spacing;
        }
        Ok(())
    }
}

// ============================================================================
// DRAWING PRIMITIVES
// ============================================================================

/// Whether `angle` lies on the clockwise arc from `start` spanning `sweep`.
fn angle_within(angle: f64, start: f64, sweep: f64) -> bool {
    sweep >= TAU || (angle - start).rem_euclid(TAU) <= sweep
}

#[allow(clippy::too_many_arguments)]
fn render_arc(
    canvas: &mut Canvas,
    cx: f32,
    cy: f32,
    r: f32,
    thickness: f32,
    start_angle: f64,
    sweep: f64,
    color: Color,
) {
    if sweep <= 0.0 || r <= 0.0 {
        return;
    }
    let inner = (r - thickness).max(0.0);
    let min_x = (cx - r - 1.0).floor().max(0.0) as i32;
    let max_x = (cx + r + 1.0).ceil().min(canvas.width as f32 - 1.0) as i32;
    let min_y = (cy - r - 1.0).floor().max(0.0) as i32;
    let max_y = (cy + r + 1.0).ceil().min(canvas.height as f32 - 1.0) as i32;

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist < inner - 1.0 || dist > r + 1.0 {
                continue;
            }
            if !angle_within(f64::from(dy).atan2(f64::from(dx)), start_angle, sweep) {
                continue;
            }
            let aa = if dist > r {
                1.0 - (dist - r).min(1.0)
            } else if dist < inner {
                1.0 - (inner - dist).min(1.0)
            } else {
                1.0
            };
            if aa > 0.0 {
                canvas.set_pixel(x, y, color, aa);
            }
        }
    }
}

fn draw_thick_line_aa(
    canvas: &mut Canvas,
    (x0, y0): (f32, f32),
    (x1, y1): (f32, f32),
    thickness: f32,
    color: Color,
) {
    let pad = thickness.ceil() + 1.0;
    let (min_x, max_x) = ((x0.min(x1) - pad) as i32, (x0.max(x1) + pad) as i32);
    let (min_y, max_y) = ((y0.min(y1) - pad) as i32, (y0.max(y1) + pad) as i32);
    let dx = x1 - x0;
    let dy = y1 - y0;
    let len_sq = dx * dx + dy * dy;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let px = x as f32 - x0;
            let py = y as f32 - y0;
            let t = if len_sq > 0.0 {
                ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let lx = x0 + t * dx;
            let ly = y0 + t * dy;
            let dist = ((lx - x as f32).powi(2) + (ly - y as f32).powi(2)).sqrt();
            let aa = (1.0 - (dist - thickness / 2.0).clamp(0.0, 1.0)).clamp(0.0, 1.0);
            if aa > 0.01 {
                canvas.set_pixel(x, y, color, aa);
            }
        }
    }
}

/// Advance width of one laid-out line.
fn line_width(font: &Font, scale: Scale, text: &str) -> f32 {
    font.layout(text, scale, point(0.0, 0.0))
        .last()
        .map_or(0.0, |glyph| {
            glyph.position().x + glyph.unpositioned().h_metrics().advance_width
        })
}

/// Baseline origin putting the middle of a `width` wide line box on `(x, y)`.
/// `descent` is negative, as rusttype reports it.
fn centered_origin(x: i32, y: i32, width: f32, ascent: f32, descent: f32) -> Point<f32> {
    point(x as f32 - width / 2.0, y as f32 + (ascent + descent) / 2.0)
}
