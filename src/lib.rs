pub mod error;
pub mod nmea;

use log::warn;
use time::Duration;

/// One resolved GPS position and velocity sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Fix {
    pub latitude: f64,
    pub longitude: f64,
    /// Knots. NaN when the sentence carried no usable value.
    pub speed: f64,
    /// Degrees true. NaN when the sentence carried no usable value.
    pub heading: f64,
    /// Seconds since start of the UTC day.
    pub timestamp: f64,
}

/// Thresholds for the event detectors. The three speed thresholds are independent.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Knots; fixes strictly below are stops.
    pub stop_threshold: f64,
    /// Degrees; a windowed heading change at or below this is a left turn.
    pub turn_threshold: f64,
    pub window_size: usize,
    /// Knots; the turn detector ignores fixes at or below this speed.
    pub turn_min_speed: f64,
    /// Knots; fixes at or above count as moving for the trip duration.
    pub moving_threshold: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            stop_threshold: 0.5,
            turn_threshold: -30.0,
            window_size: 5,
            turn_min_speed: 0.5,
            moving_threshold: 1.0,
        }
    }
}

pub fn detect_stops(fixes: &[Fix], stop_threshold: f64) -> Vec<usize> {
    fixes
        .iter()
        .enumerate()
        .filter(|(_, fix)| fix.speed < stop_threshold)
        .map(|(i, _)| i)
        .collect()
}

/// Folds a heading difference into (-180, 180]. Applied once, not iteratively.
pub fn normalize_heading_delta(delta: f64) -> f64 {
    if delta > 180.0 {
        delta - 360.0
    } else if delta < -180.0 {
        delta + 360.0
    } else {
        delta
    }
}

/// Flags sustained left turns.
///
/// For every fix with a full window of `window_size` heading differences behind it,
/// the normalized differences are summed; a sum at or below `turn_threshold` marks a
/// turn. Heading noise averages out over the window. A candidate within `window_size`
/// positions of the previous flagged turn belongs to the same turn and is dropped.
pub fn detect_left_turns(fixes: &[Fix], config: &DetectorConfig) -> Vec<usize> {
    let window = config.window_size;
    let mut turns = Vec::new();
    let mut last_turn: Option<usize> = None;

    for i in window..fixes.len() {
        if fixes[i].speed <= config.turn_min_speed {
            continue;
        }

        let change: f64 = (i + 1 - window..=i)
            .map(|j| normalize_heading_delta(fixes[j].heading - fixes[j - 1].heading))
            .sum();

        if change <= config.turn_threshold {
            if last_turn.is_some_and(|last| i - last <= window) {
                continue;
            }
            turns.push(i);
            last_turn = Some(i);
        }
    }

    turns
}

/// First and last moving fix of a track and the time between them.
#[derive(Debug, Clone, PartialEq)]
pub struct TripSummary {
    /// Zero when nothing moved or the difference does not fit a `Duration`.
    /// Negative if timestamps run backwards (e.g. past midnight).
    pub duration: Duration,
    /// `None` only for an empty track.
    pub start_index: Option<usize>,
    pub end_index: Option<usize>,
    /// False when no fix reached the moving threshold; the indices then span the whole track.
    pub moving: bool,
}

pub fn trip_summary(fixes: &[Fix], moving_threshold: f64) -> TripSummary {
    let is_moving = |fix: &Fix| fix.speed >= moving_threshold;
    let first = fixes.iter().position(is_moving);
    let last = fixes.iter().rposition(is_moving);

    let (Some(start), Some(end)) = (first, last) else {
        return TripSummary {
            duration: Duration::ZERO,
            start_index: (!fixes.is_empty()).then_some(0),
            end_index: fixes.len().checked_sub(1),
            moving: false,
        };
    };

    let seconds = fixes[end].timestamp - fixes[start].timestamp;
    if seconds < 0.0 {
        warn!(
            "trip duration is negative ({seconds}s); timestamps are not monotonic between fixes {} and {}",
            start + 1,
            end + 1
        );
    }

    let duration = Duration::checked_seconds_f64(seconds).unwrap_or_else(|| {
        warn!("trip duration {seconds}s is out of range, reporting zero");
        Duration::ZERO
    });

    TripSummary {
        duration,
        start_index: Some(start),
        end_index: Some(end),
        moving: true,
    }
}

/// Everything derived from one track.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub stops: Vec<usize>,
    pub turns: Vec<usize>,
    pub trip: TripSummary,
}

pub fn analyze(fixes: &[Fix], config: &DetectorConfig) -> Analysis {
    Analysis {
        stops: detect_stops(fixes, config.stop_threshold),
        turns: detect_left_turns(fixes, config),
        trip: trip_summary(fixes, config.moving_threshold),
    }
}
