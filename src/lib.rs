//! Animated flow meter gauge.
//!
//! A [`FlowMeter`] maps a value onto a dial whose scale is split into
//! intervals by increasing breakpoints. Each interval gets the same share of
//! the arc no matter how wide its numeric range is. Value changes can be
//! eased over a fixed duration; the host drives time through
//! [`FlowMeter::advance`].
//!
//! ```no_run
//! use flowmeter::{FlowMeter, FlowMeterConfig};
//!
//! let config = FlowMeterConfig::builder()
//!     .title("Bandwidth".to_string())
//!     .breakpoints(vec![0, 400, 600, 800])
//!     .unit_info("MB".to_string())
//!     .build();
//! let mut meter = FlowMeter::new(config)?;
//! meter.set_value_with(520, true, false);
//! meter.show()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod animator;
pub mod calibration;
pub mod config;
pub mod error;
pub mod gauge;
pub mod raster;
pub mod renderer;
mod window;

pub use animator::{AnimationState, Progress, ProgressAnimator};
pub use calibration::{CalibrationModel, Tick};
pub use config::{Color, FlowMeterConfig, TextStyle};
pub use error::{ConfigurationError, RenderError};
pub use gauge::FlowMeter;
pub use raster::PixelRenderer;
pub use renderer::{ArcRect, GaugeText, Renderer};
pub use window::FlowMeterCommand;
