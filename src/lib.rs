//! # breakout-fvg - Session Breakout Fair Value Gap detector
//!
//! Detects a fair value gap that forms only after price leaves the high/low range
//! printed during a time-of-day session window (by default the Asian session,
//! `00:00..09:00`).
//!
//! ## Quick Start
//!
//! ```rust
//! use breakout_fvg::prelude::*;
//! use chrono::NaiveDate;
//!
//! let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
//! let at = |h: u32| day.and_hms_opt(h, 0, 0).unwrap();
//!
//! // (timestamp, open, high, low, close)
//! let bars = vec![
//!     (at(1), 100.0, 101.0, 99.0, 100.5),
//!     (at(9), 100.5, 102.0, 100.0, 101.5),  // breakout above 101
//!     (at(10), 101.5, 103.0, 101.0, 102.5),
//!     (at(11), 103.5, 105.0, 103.5, 104.5), // low 103.5 > previous high 103
//! ];
//!
//! let detector = SessionGapDetector::new(SessionWindow::default()).validate_data(true);
//! let event = detector.scan(&bars).unwrap().unwrap();
//! assert_eq!(event.direction, Direction::Up);
//! assert_eq!(event.gap, (103.0, 103.5));
//! ```

use chrono::{Duration, NaiveDateTime, NaiveTime};

pub mod detectors;

pub mod prelude {
    pub use crate::{
        // Detection
        detect,
        detectors::*,
        // Parallel
        scan_parallel,
        // Types
        Bar,
        DetectError,
        DetectorConfig,
        Direction,
        GapEvent,
        OHLCExt,
        Result,
        ScanError,
        ScanResult,
        SessionGapDetector,
        SessionWindow,
        OHLC,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, DetectError>;

/// Errors raised by the validating front-end.
///
/// The detection routine itself never fails: "nothing found" is `None`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DetectError {
    #[error("Invalid time of day {hour:02}:{minute:02}")]
    InvalidTime { hour: u32, minute: u32 },

    #[error("Invalid OHLC at index {index}: {reason}")]
    InvalidOHLC { index: usize, reason: &'static str },

    #[error("Timestamp at index {index} is not after the previous bar")]
    UnorderedTimestamps { index: usize },
}

// ============================================================
// SESSION WINDOW
// ============================================================

/// Half-open time-of-day interval `[start, end)`, independent of the calendar date.
///
/// No wrap-around: a window with `start >= end` selects nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SessionWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl SessionWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Build a window from hour/minute pairs, rejecting values outside a 24h clock.
    pub fn from_hm(start_hour: u32, start_minute: u32, end_hour: u32, end_minute: u32) -> Result<Self> {
        Ok(Self {
            start: hm(start_hour, start_minute)?,
            end: hm(end_hour, end_minute)?,
        })
    }

    #[inline]
    pub fn start(&self) -> NaiveTime {
        self.start
    }

    #[inline]
    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// `start <= t < end`
    #[inline]
    pub fn contains(&self, t: NaiveTime) -> bool {
        detectors::time_in_window(t, self.start, self.end)
    }

    /// True when the window can never select a bar
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Asian session: midnight to 09:00
impl Default for SessionWindow {
    fn default() -> Self {
        Self {
            start: NaiveTime::MIN,
            end: NaiveTime::MIN + Duration::hours(9),
        }
    }
}

fn hm(hour: u32, minute: u32) -> Result<NaiveTime> {
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or(DetectError::InvalidTime { hour, minute })
}

// ============================================================
// OHLC TRAITS
// ============================================================

/// Core timestamped OHLC bar trait
pub trait OHLC {
    fn timestamp(&self) -> NaiveDateTime;
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
}

/// Blanket impl for references to dyn OHLC
impl OHLC for &dyn OHLC {
    fn timestamp(&self) -> NaiveDateTime {
        (*self).timestamp()
    }

    fn open(&self) -> f64 {
        (*self).open()
    }

    fn high(&self) -> f64 {
        (*self).high()
    }

    fn low(&self) -> f64 {
        (*self).low()
    }

    fn close(&self) -> f64 {
        (*self).close()
    }
}

/// `(timestamp, open, high, low, close)` records
impl OHLC for (NaiveDateTime, f64, f64, f64, f64) {
    fn timestamp(&self) -> NaiveDateTime {
        self.0
    }

    fn open(&self) -> f64 {
        self.1
    }

    fn high(&self) -> f64 {
        self.2
    }

    fn low(&self) -> f64 {
        self.3
    }

    fn close(&self) -> f64 {
        self.4
    }
}

/// Extension trait with computed properties for OHLC data
pub trait OHLCExt: OHLC {
    #[inline]
    fn time_of_day(&self) -> NaiveTime {
        self.timestamp().time()
    }

    #[inline]
    fn range(&self) -> f64 {
        self.high() - self.low()
    }

    /// Validate OHLC data consistency
    fn validate(&self) -> Result<()> {
        let values = [self.open(), self.high(), self.low(), self.close()];
        if values.iter().any(|v| v.is_nan()) {
            return Err(DetectError::InvalidOHLC {
                index: 0,
                reason: "NaN in OHLC",
            });
        }
        if values.iter().any(|v| v.is_infinite()) {
            return Err(DetectError::InvalidOHLC {
                index: 0,
                reason: "Infinite value in OHLC",
            });
        }
        if self.high() < self.low() {
            return Err(DetectError::InvalidOHLC {
                index: 0,
                reason: "high < low",
            });
        }
        Ok(())
    }
}

impl<T: OHLC> OHLCExt for T {}

/// Plain owned bar
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    pub fn new(timestamp: NaiveDateTime, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
        }
    }
}

impl OHLC for Bar {
    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }
}

// ============================================================
// GAP EVENT - result of detection (Copy, no allocations)
// ============================================================

/// Direction of the breakout, and therefore of the gap that may follow it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    #[inline]
    pub fn is_up(self) -> bool {
        matches!(self, Direction::Up)
    }

    #[inline]
    pub fn is_down(self) -> bool {
        matches!(self, Direction::Down)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fair value gap confirmed after a session breakout
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GapEvent {
    /// Timestamp of the bar that confirmed the gap
    pub time: NaiveDateTime,
    pub direction: Direction,
    /// Unfilled price interval, lower bound first.
    /// Up: `(previous.high, current.low)`. Down: `(current.high, previous.low)`.
    pub gap: (f64, f64),
    /// Index of the bar before the confirming bar
    pub start_index: usize,
    /// Index of the confirming bar
    pub end_index: usize,
}

impl GapEvent {
    #[inline]
    pub fn gap_size(&self) -> f64 {
        self.gap.1 - self.gap.0
    }
}

// ============================================================
// DETECTOR
// ============================================================

/// Detector configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub window: SessionWindow,
    /// Reject malformed bars before scanning
    pub validate_data: bool,
}

/// Detect the first post-breakout fair value gap for one session window.
///
/// Returns `None` when there are no bars, no bar inside the window, no breakout,
/// or no gap after the breakout.
pub fn detect<T: OHLC>(bars: &[T], window_start: NaiveTime, window_end: NaiveTime) -> Option<GapEvent> {
    detectors::detect_session_gap(bars, &SessionWindow::new(window_start, window_end))
}

/// Configured session gap detector
#[derive(Debug, Clone, Default)]
pub struct SessionGapDetector {
    config: DetectorConfig,
}

impl SessionGapDetector {
    pub fn new(window: SessionWindow) -> Self {
        Self {
            config: DetectorConfig {
                window,
                validate_data: false,
            },
        }
    }

    pub fn from_config(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Change the session window
    pub fn with_window(mut self, window: SessionWindow) -> Self {
        self.config.window = window;
        self
    }

    /// Enable/disable data validation
    pub fn validate_data(mut self, enable: bool) -> Self {
        self.config.validate_data = enable;
        self
    }

    #[inline]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    #[inline]
    pub fn window(&self) -> SessionWindow {
        self.config.window
    }

    /// Reference range of the first session in `bars`
    pub fn session_range<T: OHLC>(&self, bars: &[T]) -> Option<detectors::ReferenceRange> {
        detectors::session_range(bars, &self.config.window)
    }

    /// Scan bars for a post-breakout gap.
    ///
    /// Fails only when validation is enabled and the input is malformed.
    pub fn scan<T: OHLC>(&self, bars: &[T]) -> Result<Option<GapEvent>> {
        if self.config.validate_data {
            validate_bars(bars)?;
        }

        Ok(detectors::detect_session_gap(bars, &self.config.window))
    }
}

fn validate_bars<T: OHLC>(bars: &[T]) -> Result<()> {
    for (i, bar) in bars.iter().enumerate() {
        bar.validate().map_err(|e| match e {
            DetectError::InvalidOHLC { reason, .. } => DetectError::InvalidOHLC { index: i, reason },
            other => other,
        })?;
    }

    if let Some(i) = bars
        .windows(2)
        .position(|pair| pair[1].timestamp() <= pair[0].timestamp())
    {
        return Err(DetectError::UnorderedTimestamps { index: i + 1 });
    }

    Ok(())
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

use rayon::prelude::*;

/// Result of scanning a single instrument
#[derive(Debug)]
pub struct ScanResult {
    pub symbol: String,
    pub event: Option<GapEvent>,
}

/// Error from scanning a single instrument
#[derive(Debug)]
pub struct ScanError {
    pub symbol: String,
    pub error: DetectError,
}

/// Parallel scanning of multiple instruments, one session each
pub fn scan_parallel<'a, T, I>(
    detector: &SessionGapDetector,
    instruments: I,
) -> (Vec<ScanResult>, Vec<ScanError>)
where
    T: OHLC + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, bars)| {
            detector
                .scan(bars)
                .map(|event| ScanResult {
                    symbol: symbol.to_string(),
                    event,
                })
                .map_err(|error| {
                    tracing::debug!(symbol, %error, "instrument rejected");
                    ScanError {
                        symbol: symbol.to_string(),
                        error,
                    }
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================
