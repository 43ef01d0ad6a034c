mod commands;
mod kmlxml;

use clap::{Args, Parser, Subcommand};
use commands::convert::convert_command;
use commands::summary::summary_command;
use nmea2kml::DetectorConfig;
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nmea2kml", about = "A CLI tool for converting NMEA GPRMC logs to KML")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Convert an NMEA log into a KML file with route, stop and turn markers")]
    Convert {
        #[command(flatten)]
        input: InputArgs,

        /// Directory the KML file is written to, created if missing
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,

        /// Write the KML document to stdout instead of a file
        #[arg(long)]
        stdout: bool,

        /// Altitude in meters given to every coordinate
        #[arg(long, default_value_t = 3.0)]
        altitude: f64,
    },
    #[command(about = "Print trip statistics for an NMEA log without writing KML")]
    Summary {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Args)]
pub struct InputArgs {
    /// NMEA log file name, resolved under the input directory
    file: PathBuf,

    /// Directory input files are read from
    #[arg(long, default_value = "data")]
    input_dir: PathBuf,

    #[command(flatten)]
    detector: DetectorArgs,
}

impl InputArgs {
    pub fn input_path(&self) -> PathBuf {
        self.input_dir.join(&self.file)
    }
}

#[derive(Args)]
pub struct DetectorArgs {
    /// Speed in knots below which a fix is a stop
    #[arg(long, default_value_t = 0.5)]
    stop_threshold: f64,

    /// Summed heading change in degrees at or below which a left turn is flagged
    #[arg(long, default_value_t = -30.0, allow_hyphen_values = true)]
    turn_threshold: f64,

    /// Number of heading differences summed per turn window
    #[arg(long, default_value_t = 5)]
    window_size: usize,

    /// Speed in knots a fix must exceed to be considered for a turn
    #[arg(long, default_value_t = 0.5)]
    turn_min_speed: f64,

    /// Speed in knots at or above which a fix counts as moving
    #[arg(long, default_value_t = 1.0)]
    moving_threshold: f64,
}

impl From<&DetectorArgs> for DetectorConfig {
    fn from(args: &DetectorArgs) -> Self {
        DetectorConfig {
            stop_threshold: args.stop_threshold,
            turn_threshold: args.turn_threshold,
            window_size: args.window_size,
            turn_min_speed: args.turn_min_speed,
            moving_threshold: args.moving_threshold,
        }
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Commands::Convert {
            input,
            output_dir,
            stdout,
            altitude,
        } => convert_command(&input, &output_dir, stdout, altitude),
        Commands::Summary { input } => summary_command(&input),
    }
}
