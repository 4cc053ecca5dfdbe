use thiserror::Error;

/// Rejected calibration or arc configuration.
///
/// Every setter that can fail returns one of these and leaves the previous
/// configuration in place.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("calibration needs at least 2 breakpoints, got {0}")]
    TooFewBreakpoints(usize),
    #[error("calibration range is empty: min {min} is not below max {max}")]
    EmptyRange { min: i32, max: i32 },
    #[error("breakpoint {index} ({value}) is not greater than the one before it ({previous})")]
    NotIncreasing {
        index: usize,
        value: i32,
        previous: i32,
    },
    #[error("{0} minor steps per interval exceed the tick limit of {max}", max = crate::calibration::MAX_TICKS)]
    TooManyTicks(usize),
    #[error("arc start {start} / sweep {sweep} must be finite with a non-negative sweep")]
    InvalidArc { start: f64, sweep: f64 },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("font data could not be parsed")]
    InvalidFont,
    #[error("could not read font file: {0}")]
    FontIo(#[from] std::io::Error),
}
