use super::write_summary;
use crate::InputArgs;
use nmea2kml::nmea::load_track_file;
use nmea2kml::{DetectorConfig, analyze};
use std::error::Error;
use std::io;

pub fn summary_command(input: &InputArgs) -> Result<(), Box<dyn Error>> {
    let fixes = load_track_file(&input.input_path())?;
    let analysis = analyze(&fixes, &DetectorConfig::from(&input.detector));

    write_summary(io::stdout().lock(), &fixes, &analysis)?;
    Ok(())
}
