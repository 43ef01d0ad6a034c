pub mod convert;
pub mod summary;

use nmea2kml::{Analysis, Fix};
use std::io::{self, Write};

fn describe_index(index: Option<usize>, moving: bool) -> String {
    match index {
        Some(i) if moving => (i + 1).to_string(),
        _ => "none (no movement detected)".to_string(),
    }
}

pub fn write_summary<W: Write>(mut out: W, fixes: &[Fix], analysis: &Analysis) -> io::Result<()> {
    let trip = &analysis.trip;
    let seconds = trip.duration.as_seconds_f64();

    writeln!(out, "Fixes: {}", fixes.len())?;
    writeln!(out, "Stops: {}", analysis.stops.len())?;
    writeln!(out, "Left turns: {}", analysis.turns.len())?;
    writeln!(
        out,
        "First moving fix: {}",
        describe_index(trip.start_index, trip.moving)
    )?;
    writeln!(
        out,
        "Last moving fix: {}",
        describe_index(trip.end_index, trip.moving)
    )?;
    writeln!(
        out,
        "Trip duration: {} s ({:.2} min)",
        seconds,
        seconds / 60.0
    )?;
    Ok(())
}
