use super::write_summary;
use crate::InputArgs;
use crate::kmlxml::{KmlOptions, write_kml};
use log::info;
use nmea2kml::nmea::load_track_file;
use nmea2kml::{DetectorConfig, analyze};
use std::error::Error;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// `<output_dir>/<input file name with a .kml extension>`
pub fn output_path(input_file: &Path, output_dir: &Path) -> PathBuf {
    let name = input_file.file_name().unwrap_or(input_file.as_os_str());
    output_dir.join(Path::new(name).with_extension("kml"))
}

pub fn convert_command(
    input: &InputArgs,
    output_dir: &Path,
    to_stdout: bool,
    altitude: f64,
) -> Result<(), Box<dyn Error>> {
    let input_path = input.input_path();
    let fixes = load_track_file(&input_path)?;
    let analysis = analyze(&fixes, &DetectorConfig::from(&input.detector));
    info!(
        "{}: {} stops, {} left turns",
        input_path.display(),
        analysis.stops.len(),
        analysis.turns.len()
    );

    let options = KmlOptions {
        name: input
            .file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
        altitude,
    };

    if to_stdout {
        let mut out = io::stdout().lock();
        write_kml(&mut out, &fixes, &analysis, &options)?;
        out.flush()?;
        write_summary(io::stderr().lock(), &fixes, &analysis)?;
        return Ok(());
    }

    fs::create_dir_all(output_dir)
        .map_err(|e| format!("cannot create {}: {e}", output_dir.display()))?;
    let path = output_path(&input.file, output_dir);
    let file = File::create(&path).map_err(|e| format!("cannot create {}: {e}", path.display()))?;

    let mut out = BufWriter::new(file);
    write_kml(&mut out, &fixes, &analysis, &options)?;
    out.flush()?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "Generated: {}", path.display())?;
    write_summary(stdout, &fixes, &analysis)?;
    Ok(())
}
