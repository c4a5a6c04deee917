/// digit-sketch Studio
///
/// Browser front end for the digit recognizer, served by a synchronous
/// tiny_http server; no JavaScript frameworks required.
///
/// Run with:
///   cargo run --bin studio -- --service-url http://127.0.0.1:5000
/// Then open http://127.0.0.1:7878
///
/// Tabs:
///   1. Draw:  sketch a digit on the 28×28 grid and recognize it
///   2. Photo: pick a picture and upload it for recognition

mod state;
mod render;
mod routes;
mod handlers;
mod util;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use clap::Parser;
use tiny_http::Server;

use digit_sketch::client::config::DEFAULT_BASE_URL;
use digit_sketch::screen::drawing::DEFAULT_SURFACE_SIZE;
use digit_sketch::{ClientConfig, PredictionClient};

use state::StudioState;

#[derive(Parser)]
#[command(name = "studio")]
#[command(about = "Browser UI for drawing or uploading a digit and recognizing it")]
struct Args {
    /// Address the studio listens on
    #[arg(long, env = "DIGIT_SKETCH_STUDIO_ADDR", default_value = "127.0.0.1:7878")]
    addr: String,

    /// Base URL of the inference service
    #[arg(long, env = "DIGIT_SKETCH_SERVICE_URL", default_value = DEFAULT_BASE_URL)]
    service_url: String,

    /// Seconds to wait for the service before giving up
    #[arg(long, env = "DIGIT_SKETCH_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Side of the drawing canvas in CSS pixels
    #[arg(long, default_value_t = DEFAULT_SURFACE_SIZE)]
    surface: f64,

    /// Directory picked photos are stored in
    #[arg(long, env = "DIGIT_SKETCH_UPLOAD_DIR", default_value = "uploads")]
    upload_dir: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    if !(args.surface.is_finite() && args.surface >= 28.0) {
        bail!("--surface must be at least 28 pixels, got {}", args.surface);
    }

    let config = ClientConfig::default()
        .with_base_url(args.service_url)
        .with_timeout(Duration::from_secs(args.timeout_secs));
    let client = Arc::new(PredictionClient::new(config)?);

    let server = Server::http(&args.addr)
        .map_err(|e| anyhow!("failed to bind {}: {}", args.addr, e))?;

    log::info!("digit-sketch studio on http://{}", args.addr);
    log::info!("inference service at {}", client.config().base_url);

    let shared_state = Arc::new(Mutex::new(StudioState::new(client, args.surface, args.upload_dir)));

    // Each request is dispatched on its own thread; recognition itself runs
    // on the screens' worker threads, so handlers never block on the service.
    for request in server.incoming_requests() {
        let state_clone = shared_state.clone();
        std::thread::spawn(move || {
            routes::dispatch(request, state_clone);
        });
    }
    Ok(())
}
