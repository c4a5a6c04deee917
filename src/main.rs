//! Command-line front end.
//!
//!   digit-sketch draw stroke.txt          # replay a recorded stroke, then recognize it
//!   digit-sketch photo seven.png          # upload a picture for recognition
//!
//! The browser UI lives in the `studio` binary.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use digit_sketch::client::config::DEFAULT_BASE_URL;
use digit_sketch::screen::drawing::DEFAULT_SURFACE_SIZE;
use digit_sketch::{Alert, Caption, ClientConfig, DrawingScreen, PathPicker, PhotoScreen, PredictionClient};

#[derive(Parser)]
#[command(name = "digit-sketch")]
#[command(about = "Recognize a handwritten digit with a remote MNIST inference service")]
struct Args {
    /// Base URL of the inference service
    #[arg(long, env = "DIGIT_SKETCH_SERVICE_URL", default_value = DEFAULT_BASE_URL)]
    service_url: String,

    /// Seconds to wait for the service before giving up
    #[arg(long, env = "DIGIT_SKETCH_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a recorded stroke (one "x y" sample per line) and recognize the drawing
    Draw {
        stroke: PathBuf,

        /// Side of the surface the stroke was recorded on
        #[arg(long, default_value_t = DEFAULT_SURFACE_SIZE)]
        surface: f64,
    },
    /// Upload a picture for recognition
    Photo {
        path: PathBuf,

        /// Filename sent with the upload (defaults to the file's own name)
        #[arg(long)]
        filename: Option<String>,

        /// MIME type sent with the upload (inferred from the extension when omitted)
        #[arg(long)]
        mime_type: Option<String>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    match run(Args::parse()) {
        Ok(Outcome::Recognized(caption)) => {
            println!("{}", caption);
            ExitCode::SUCCESS
        }
        Ok(Outcome::Failed(alert)) => {
            eprintln!("{}: {}", alert.title, alert.message);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

enum Outcome {
    Recognized(Caption),
    Failed(Alert),
}

fn run(args: Args) -> Result<Outcome> {
    let config = ClientConfig::default()
        .with_base_url(args.service_url)
        .with_timeout(Duration::from_secs(args.timeout_secs));
    let client = Arc::new(PredictionClient::new(config)?);

    match args.command {
        Command::Draw { stroke, surface } => {
            if !(surface.is_finite() && surface > 0.0) {
                bail!("surface size must be a positive number, got {}", surface);
            }
            let samples = read_stroke(&stroke)?;
            let mut screen = DrawingScreen::new(client, surface);
            for (x, y) in &samples {
                screen.pointer_move(*x, *y);
            }
            info!("replayed {} samples, {} cells filled", samples.len(), screen.snapshot().filled_count());
            print!("{}", screen.snapshot().to_ascii());

            screen.recognize_from_grid()?;
            screen.wait();
            Ok(finish(screen.take_alert(), screen.caption().cloned()))
        }
        Command::Photo { path, filename, mime_type } => {
            let mut screen = PhotoScreen::new(client);
            let mut picker = PathPicker::new(Some(path))
                .with_filename(filename)
                .with_mime_type(mime_type);
            screen.pick_image(&mut picker)?;

            screen.recognize_from_image()?;
            screen.wait();
            Ok(finish(screen.take_alert(), screen.caption().cloned()))
        }
    }
}

fn finish(alert: Option<Alert>, caption: Option<Caption>) -> Outcome {
    match (alert, caption) {
        (Some(alert), _) => Outcome::Failed(alert),
        (None, Some(caption)) => Outcome::Recognized(caption),
        (None, None) => Outcome::Failed(digit_sketch::alert_for(&digit_sketch::RequestError::NoResponse)),
    }
}

fn read_stroke(path: &Path) -> Result<Vec<(f64, f64)>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("could not read stroke file '{}'", path.display()))?;
    parse_stroke(&text).with_context(|| format!("invalid stroke file '{}'", path.display()))
}

/// Parses `x y` (or `x,y`) samples, one per line. Blank lines and `#` comments are skipped.
fn parse_stroke(text: &str) -> Result<Vec<(f64, f64)>> {
    let mut samples = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let coords: Vec<&str> = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();
        let [x, y] = coords.as_slice() else {
            bail!("line {}: expected two coordinates, got '{}'", n + 1, line);
        };
        let x: f64 = x.parse().with_context(|| format!("line {}: bad x '{}'", n + 1, x))?;
        let y: f64 = y.parse().with_context(|| format!("line {}: bad y '{}'", n + 1, y))?;
        samples.push((x, y));
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stroke_samples() {
        let text = "# a short stroke\n10 10\n\n 20.5,30 \n40\t50 # trailing\n";
        assert_eq!(parse_stroke(text).unwrap(), vec![(10.0, 10.0), (20.5, 30.0), (40.0, 50.0)]);
    }

    #[test]
    fn reports_bad_lines() {
        let err = parse_stroke("1 2\n3\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
        assert!(parse_stroke("1 x\n").is_err());
    }
}
