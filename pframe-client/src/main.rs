//! Display client (pframe-client) - Main entry point
//!
//! Polls the playlist server for the frame to show, renders it to the
//! panel resolution and writes the result to a file for the display
//! driver to pick up. The server owns all playlist state; this client
//! only fetches, renders and sleeps.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pframe_common::FramePayload;

mod render;

/// Command-line arguments for pframe-client
#[derive(Parser, Debug)]
#[command(name = "pframe-client")]
#[command(about = "Polling display client for the pframe playlist server")]
#[command(version)]
struct Args {
    /// Playlist server host
    #[arg(long, default_value = "localhost", env = "PFRAME_CLIENT_HOST")]
    host: String,

    /// Playlist server port
    #[arg(short, long, default_value = "8000", env = "PFRAME_CLIENT_PORT")]
    port: u16,

    /// Poll interval in seconds (defaults to the server's change interval)
    #[arg(short, long)]
    interval: Option<u64>,

    /// Saturation override (defaults to the server's setting)
    #[arg(short, long)]
    saturation: Option<f64>,

    /// Rotate the playlist on every poll instead of re-fetching the
    /// current item
    #[arg(long)]
    advance: bool,

    /// Where to write the rendered frame
    #[arg(short, long, default_value = "frame.png", env = "PFRAME_CLIENT_OUTPUT")]
    output: PathBuf,

    /// Panel width in pixels
    #[arg(long, default_value = "600")]
    width: u32,

    /// Panel height in pixels
    #[arg(long, default_value = "448")]
    height: u32,

    /// Render a single frame and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pframe_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command-line arguments
    let args = Args::parse();
    let base_url = format!("http://{}:{}", args.host, args.port);

    info!("Polling playlist server at {}", base_url);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .context("Failed to build HTTP client")?;

    loop {
        let payload = match fetch_frame(&client, &base_url, args.advance).await {
            Ok(payload) => payload,
            Err(e) => {
                if args.once {
                    error!("Frame fetch failed: {:#}", e);
                    return Ok(ExitCode::from(2));
                }
                warn!("Frame fetch failed, retrying in 5s: {:#}", e);
                tokio::time::sleep(Duration::from_secs(5)).await;
                continue;
            }
        };

        match render_frame(&args, &payload) {
            Ok(()) => {
                info!(
                    "Rendered {} ({} queued) to {}",
                    payload.filename,
                    payload.queued,
                    args.output.display()
                );
            }
            Err(e) => {
                if args.once {
                    error!("Frame render failed: {:#}", e);
                    return Ok(ExitCode::from(3));
                }
                warn!("Frame render failed, skipping: {:#}", e);
            }
        }

        if args.once {
            return Ok(ExitCode::SUCCESS);
        }

        let interval = args
            .interval
            .unwrap_or(u64::from(payload.settings.change_interval))
            .max(1);
        tokio::time::sleep(Duration::from_secs(interval)).await;
    }
}

/// Fetch the frame to display, rotating the playlist first if requested
async fn fetch_frame(
    client: &reqwest::Client,
    base_url: &str,
    advance: bool,
) -> Result<FramePayload> {
    let response = if advance {
        client
            .post(format!("{}/api/frame/advance", base_url))
            .send()
            .await
    } else {
        client
            .get(format!("{}/api/frame/current", base_url))
            .send()
            .await
    }
    .context("Request to playlist server failed")?;

    let response = response
        .error_for_status()
        .context("Playlist server returned an error")?;

    response
        .json::<FramePayload>()
        .await
        .context("Failed to parse frame payload")
}

/// Decode, render and atomically write one frame
fn render_frame(args: &Args, payload: &FramePayload) -> Result<()> {
    let img = render::decode_frame_image(payload)?;
    let saturation = args.saturation.unwrap_or(payload.settings.saturation);
    let prepared = render::prepare(
        &img,
        args.width,
        args.height,
        payload.offset_x,
        payload.offset_y,
        saturation,
    );
    write_atomically(&prepared, &args.output)
}

/// Write via a temp file plus rename so the display driver never reads a
/// half-written frame
fn write_atomically(img: &image::RgbaImage, output: &Path) -> Result<()> {
    let tmp = output.with_extension("tmp.png");
    img.save_with_format(&tmp, image::ImageFormat::Png)
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, output)
        .with_context(|| format!("Failed to move frame into place at {}", output.display()))?;
    Ok(())
}
