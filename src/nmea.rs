use crate::Fix;
use crate::error::{ConvertError, SentenceError};
use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub const RMC_PREFIX: &str = "$GPRMC";

const MIN_FIELDS: usize = 9;

/// Converts an NMEA `DDDMM.MMMM` coordinate plus hemisphere letter to signed decimal degrees.
///
/// Everything left of the last two integer digits is degrees, the rest is minutes.
/// `S` and `W` give negative values. `None` unless the coordinate is a finite number.
pub fn convert_coordinate(raw: &str, hemisphere: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok().filter(|v: &f64| v.is_finite())?;
    let degrees = (value / 100.0).floor();
    let minutes = value - degrees * 100.0;
    let decimal = degrees + minutes / 60.0;

    match hemisphere.trim() {
        "S" | "W" => Some(-decimal),
        _ => Some(decimal),
    }
}

/// Parses `HHMMSS[.ss]` into seconds since midnight. Anything unusable or out of range yields 0.
pub fn parse_time_of_day(field: &str) -> f64 {
    if field.len() < 6 {
        return 0.0;
    }

    let parts = (field.get(0..2), field.get(2..4), field.get(4..));
    let (Some(hours), Some(minutes), Some(seconds)) = parts else {
        return 0.0;
    };

    match (
        hours.parse::<f64>(),
        minutes.parse::<f64>(),
        seconds.parse::<f64>(),
    ) {
        (Ok(h), Ok(m), Ok(s))
            if (0.0..24.0).contains(&h) && (0.0..60.0).contains(&m) && (0.0..61.0).contains(&s) =>
        {
            h * 3600.0 + m * 60.0 + s
        }
        _ => 0.0,
    }
}

// Speed and heading are kept lenient: an empty or garbled value becomes NaN,
// which never satisfies a threshold comparison downstream.
fn parse_lenient(field: &str) -> f64 {
    field.trim().parse().unwrap_or(f64::NAN)
}

/// Parses one `$GPRMC` line into a [`Fix`].
pub fn parse_sentence(line: &str) -> Result<Fix, SentenceError> {
    let line = line.trim_end();
    if !line.starts_with(RMC_PREFIX) {
        return Err(SentenceError::NotRmc);
    }

    // Checksum is not verified, only dropped.
    let body = line.split('*').next().unwrap_or(line);
    let fields: Vec<&str> = body.split(',').collect();
    if fields.len() < MIN_FIELDS {
        return Err(SentenceError::TooFewFields(fields.len()));
    }

    if fields[2] != "A" {
        return Err(SentenceError::NoFix(fields[2].to_string()));
    }

    let latitude =
        convert_coordinate(fields[3], fields[4]).ok_or_else(|| SentenceError::MalformedField {
            field: "latitude",
            value: fields[3].to_string(),
        })?;
    let longitude =
        convert_coordinate(fields[5], fields[6]).ok_or_else(|| SentenceError::MalformedField {
            field: "longitude",
            value: fields[5].to_string(),
        })?;

    Ok(Fix {
        latitude,
        longitude,
        speed: parse_lenient(fields[7]),
        heading: parse_lenient(fields[8]),
        timestamp: parse_time_of_day(fields[1]),
    })
}

/// Reads every line from `reader` and keeps the valid fixes in file order.
pub fn load_track<R: BufRead>(mut reader: R) -> std::io::Result<Vec<Fix>> {
    let mut fixes = Vec::new();
    let mut buf = Vec::new();
    let mut line_no = 0usize;
    let mut skipped = 0usize;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;

        let line = String::from_utf8_lossy(&buf);
        if !line.starts_with(RMC_PREFIX) {
            continue;
        }

        match parse_sentence(&line) {
            Ok(fix) => fixes.push(fix),
            Err(e @ SentenceError::MalformedField { .. }) => {
                warn!("line {line_no}: skipping sentence, {e}");
                skipped += 1;
            }
            Err(e) => {
                debug!("line {line_no}: skipping sentence, {e}");
                skipped += 1;
            }
        }
    }

    info!(
        "loaded {} fixes from {} lines ({} RMC sentences skipped)",
        fixes.len(),
        line_no,
        skipped
    );
    Ok(fixes)
}

/// Opens `path` and loads its track. The file handle is closed on every return path.
pub fn load_track_file(path: &Path) -> Result<Vec<Fix>, ConvertError> {
    let io_err = |source| ConvertError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_err)?;
    load_track(BufReader::new(file)).map_err(io_err)
}
