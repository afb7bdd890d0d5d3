//! Session range breakout fair value gap
//!
//! Three phases over one ordered bar series:
//!
//! 1. Fold the high/low of the first contiguous run of bars inside the session
//!    window into a [`ReferenceRange`].
//! 2. Find the first later bar trading outside that range ([`Breakout`]).
//! 3. Find the first bar after the breakout bar whose price leaves a gap against its
//!    predecessor in the breakout direction.
//!
//! Each phase short-circuits, so the whole scan touches every bar at most once.
//! Only one session is considered per call; windows on later days are ignored.

use tracing::{debug, trace};

use super::helpers::{breakout_direction, gap_in};
use crate::{Direction, GapEvent, OHLCExt, SessionWindow, OHLC};

/// High/low of the bars inside the first session window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceRange {
  pub high: f64,
  pub low: f64,
  /// Index of the first bar inside the window
  pub first_index: usize,
  /// Index of the last bar inside the window
  pub last_index: usize,
}

impl ReferenceRange {
  #[inline]
  pub fn height(&self) -> f64 {
    self.high - self.low
  }
}

/// First bar after the session that trades outside the reference range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breakout {
  pub direction: Direction,
  pub index: usize,
}

/// Phase 1: reference range of the first session in `bars`.
///
/// Bars before the window are skipped. The scan stops at the first bar at or past the
/// window end once at least one window bar has been seen.
pub fn session_range<T: OHLC>(bars: &[T], window: &SessionWindow) -> Option<ReferenceRange> {
  let mut high = f64::NEG_INFINITY;
  let mut low = f64::INFINITY;
  let mut span: Option<(usize, usize)> = None;

  for (i, bar) in bars.iter().enumerate() {
    let t = bar.time_of_day();
    if window.contains(t) {
      high = high.max(bar.high());
      low = low.min(bar.low());
      span = Some((span.map_or(i, |(first, _)| first), i));
    } else if span.is_some() && t >= window.end() {
      break;
    }
  }

  let (first_index, last_index) = span?;
  Some(ReferenceRange { high, low, first_index, last_index })
}

/// Phase 2: first bar after the session that exceeds the reference range
pub fn find_breakout<T: OHLC>(bars: &[T], range: &ReferenceRange) -> Option<Breakout> {
  bars.iter().enumerate().skip(range.last_index + 1).find_map(|(index, bar)| {
    breakout_direction(bar, range.high, range.low).map(|direction| Breakout { direction, index })
  })
}

/// Phase 3: first gap in the breakout direction.
///
/// The breakout bar is only ever the predecessor of the first compared pair.
pub fn find_gap<T: OHLC>(bars: &[T], breakout: &Breakout) -> Option<GapEvent> {
  bars.windows(2).enumerate().skip(breakout.index).find_map(|(i, pair)| {
    let (prev, curr) = (&pair[0], &pair[1]);
    gap_in(breakout.direction, prev, curr).map(|gap| GapEvent {
      time: curr.timestamp(),
      direction: breakout.direction,
      gap,
      start_index: i,
      end_index: i + 1,
    })
  })
}

/// Run all three phases over `bars` for one session window.
pub fn detect_session_gap<T: OHLC>(bars: &[T], window: &SessionWindow) -> Option<GapEvent> {
  if bars.is_empty() {
    return None;
  }

  let Some(range) = session_range(bars, window) else {
    trace!(start = %window.start(), end = %window.end(), "no bars in session window");
    return None;
  };
  debug!(
    high = range.high,
    low = range.low,
    first = range.first_index,
    last = range.last_index,
    "session range"
  );

  let Some(breakout) = find_breakout(bars, &range) else {
    trace!("no breakout after session");
    return None;
  };
  debug!(direction = %breakout.direction, index = breakout.index, "breakout");

  let event = find_gap(bars, &breakout);
  match &event {
    Some(e) => debug!(
      direction = %e.direction,
      index = e.end_index,
      gap_low = e.gap.0,
      gap_high = e.gap.1,
      "fair value gap"
    ),
    None => trace!("no gap after breakout"),
  }
  event
}
