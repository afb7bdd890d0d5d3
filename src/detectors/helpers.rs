//! Common helper functions for session breakout detection
//!
//! Price gap and breakout predicates shared by the session gap scan.

use chrono::NaiveTime;

use crate::{Direction, OHLC};

// ============================================================
// TIME OF DAY
// ============================================================

/// Half-open time-of-day containment: `start <= t < end`.
/// Never true when `start >= end`.
#[inline]
pub fn time_in_window(t: NaiveTime, start: NaiveTime, end: NaiveTime) -> bool {
    start <= t && t < end
}

// ============================================================
// BREAKOUT
// ============================================================

/// Direction in which `bar` trades outside `[range_low, range_high]`.
/// The high is checked first, so a bar exceeding both sides is an up breakout.
#[inline]
pub fn breakout_direction<T: OHLC>(bar: &T, range_high: f64, range_low: f64) -> Option<Direction> {
    if bar.high() > range_high {
        Some(Direction::Up)
    } else if bar.low() < range_low {
        Some(Direction::Down)
    } else {
        None
    }
}

// ============================================================
// GAPS
// ============================================================

/// Gap up: current low is above previous high. Returns `(prev.high, curr.low)`.
#[inline]
pub fn gap_up<T: OHLC>(prev: &T, curr: &T) -> Option<(f64, f64)> {
    (curr.low() > prev.high()).then(|| (prev.high(), curr.low()))
}

/// Gap down: current high is below previous low. Returns `(curr.high, prev.low)`.
#[inline]
pub fn gap_down<T: OHLC>(prev: &T, curr: &T) -> Option<(f64, f64)> {
    (curr.high() < prev.low()).then(|| (curr.high(), prev.low()))
}

#[inline]
pub fn gap_in<T: OHLC>(direction: Direction, prev: &T, curr: &T) -> Option<(f64, f64)> {
    match direction {
        Direction::Up => gap_up(prev, curr),
        Direction::Down => gap_down(prev, curr),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn bar(h: f64, l: f64) -> (NaiveDateTime, f64, f64, f64, f64) {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        (ts, l, h, l, h)
    }

    #[test]
    fn test_time_in_window_half_open() {
        let t = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
        assert!(time_in_window(t(0), t(0), t(9)));
        assert!(time_in_window(t(8), t(0), t(9)));
        assert!(!time_in_window(t(9), t(0), t(9)));
        assert!(!time_in_window(t(5), t(9), t(5)));
    }

    #[test]
    fn test_breakout_up_wins_tie() {
        assert_eq!(breakout_direction(&bar(12.0, 8.0), 11.0, 9.0), Some(Direction::Up));
        assert_eq!(breakout_direction(&bar(10.0, 8.0), 11.0, 9.0), Some(Direction::Down));
        assert_eq!(breakout_direction(&bar(11.0, 9.0), 11.0, 9.0), None);
    }

    #[test]
    fn test_gaps_are_strict() {
        assert_eq!(gap_up(&bar(10.0, 9.0), &bar(12.0, 10.5)), Some((10.0, 10.5)));
        assert_eq!(gap_up(&bar(10.0, 9.0), &bar(12.0, 10.0)), None);
        assert_eq!(gap_down(&bar(10.0, 9.0), &bar(8.5, 7.0)), Some((8.5, 9.0)));
        assert_eq!(gap_down(&bar(10.0, 9.0), &bar(9.0, 7.0)), None);
        assert_eq!(gap_in(Direction::Down, &bar(10.0, 9.0), &bar(12.0, 10.5)), None);
    }
}
