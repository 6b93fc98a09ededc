use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use trichrome_capture::camera::{GphotoConnector, ShutterSpeed};
use trichrome_capture::capture::{CaptureConfig, CaptureFailure, CaptureSequencer};
use trichrome_capture::light::{NeewerScanner, MAX_PERCENT};
use trichrome_capture::logger;

use tracing::{error, info};

/// Exit status when the light never showed up during the scan.
const EXIT_NO_DEVICE: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "capture_negative",
    version,
    about = "Capture a film frame under red, green and blue light and merge the raws into one DNG"
)]
struct Cli {
    /// Output DNG path
    #[arg(long)]
    output: PathBuf,

    /// Exposure time offered by the camera, e.g. 1/250
    #[arg(long = "shutter_speed", visible_alias = "shutter-speed")]
    shutter_speed: String,

    /// Light brightness in percent for the red, green and blue exposures
    #[arg(
        long,
        required = true,
        num_args = 3,
        value_names = ["R", "G", "B"],
        value_parser = clap::value_parser!(u8).range(0..=MAX_PERCENT as i64)
    )]
    rgb: Vec<u8>,

    /// Bluetooth address of the light; defaults to the first one found
    #[arg(long)]
    address: Option<String>,

    /// How long to scan for the light, in milliseconds
    #[arg(long, default_value_t = 5000)]
    scan_ms: u64,

    /// Also save each exposure's raw file into this directory
    #[arg(long)]
    keep_raw: Option<PathBuf>,

    /// Subtract black levels from the samples instead of only tagging them
    #[arg(long)]
    subtract_black: bool,
}

fn main() -> ExitCode {
    logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e
                .downcast_ref::<CaptureFailure>()
                .is_some_and(CaptureFailure::is_device_not_found)
            {
                println!("No device found");
                return ExitCode::from(EXIT_NO_DEVICE);
            }
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let shutter_speed = ShutterSpeed::parse(&cli.shutter_speed)?;
    let [red, green, blue] = cli.rgb[..] else {
        bail!("--rgb takes exactly three values, got {}", cli.rgb.len());
    };

    let config = CaptureConfig::builder(shutter_speed)
        .intensities(red, green, blue)
        .light_address(cli.address.clone())
        .scan_window(Duration::from_millis(cli.scan_ms))
        .keep_raw_dir(cli.keep_raw.clone())
        .subtract_black_level(cli.subtract_black)
        .build();

    info!("Starting capture_negative...");
    info!("Output: {}", cli.output.display());

    let mut scanner = NeewerScanner::new().context("Failed to initialize Bluetooth")?;
    let mut connector = GphotoConnector::new(config.event_timeout);
    let mut sequencer = CaptureSequencer::new(config);

    sequencer.run_file(&mut scanner, &mut connector, &cli.output)?;

    info!("Capture successful!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_underscore_and_dash_spellings() {
        let cli = Cli::try_parse_from([
            "capture_negative", "--output", "out.dng", "--shutter_speed", "1/250", "--rgb", "80", "60", "40",
        ])
        .unwrap();
        assert_eq!(cli.shutter_speed, "1/250");
        assert_eq!(cli.rgb, vec![80, 60, 40]);
        assert_eq!(cli.scan_ms, 5000);
        assert!(!cli.subtract_black);

        let cli = Cli::try_parse_from([
            "capture_negative", "--output", "out.dng", "--shutter-speed", "1/8", "--rgb", "1", "2", "3",
            "--address", "AA:BB",
        ])
        .unwrap();
        assert_eq!(cli.shutter_speed, "1/8");
        assert_eq!(cli.address.as_deref(), Some("AA:BB"));
    }

    #[test]
    fn test_rgb_range_is_checked() {
        let result = Cli::try_parse_from([
            "capture_negative", "--output", "out.dng", "--shutter_speed", "1/250", "--rgb", "80", "160", "40",
        ]);
        assert!(result.is_err());

        let result = Cli::try_parse_from([
            "capture_negative", "--output", "out.dng", "--shutter_speed", "1/250", "--rgb", "80", "60",
        ]);
        assert!(result.is_err());
    }
}
