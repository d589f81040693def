mod config;

use config::Config;
use mjpeg_client::{SessionEvent, StreamSession};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {e}", config_path.display());
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.parse().unwrap_or_default()),
        )
        .init();

    info!(
        url = config.stream.url,
        live = config.stream.live,
        output_dir = config.output.dir,
        "starting mjpeg-viewer"
    );

    if let Err(e) = tokio::fs::create_dir_all(&config.output.dir).await {
        error!(error = %e, dir = config.output.dir, "failed to create output directory");
        std::process::exit(1);
    }

    let client = reqwest::Client::new();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let initial_backoff = Duration::from_secs(config.reconnect.initial_backoff_secs);
    let max_backoff = Duration::from_secs(config.reconnect.max_backoff_secs);
    let mut backoff = initial_backoff;
    let mut seq: u64 = 0;

    loop {
        let mut handle = StreamSession::new(client.clone(), config.stream.clone()).spawn();
        let mut session_frames: u64 = 0;

        loop {
            let step = tokio::select! {
                _ = &mut shutdown => None,
                event = handle.next_event() => Some(event),
            };
            let Some(event) = step else {
                info!("shutdown requested, stopping session");
                handle.stop();
                return;
            };

            match event {
                Some(SessionEvent::Frame(frame)) => {
                    session_frames += 1;
                    seq += 1;
                    save_frame(Path::new(&config.output.dir), seq, &frame).await;
                }
                Some(SessionEvent::Error(err)) => {
                    error!(error = %err, "stream session failed");
                    break;
                }
                None => break,
            }
        }

        if !config.stream.live && session_frames > 0 {
            info!(seq, "single frame captured, exiting");
            return;
        }

        // A session that produced frames was healthy; start backoff over.
        if session_frames > 0 {
            backoff = initial_backoff;
        }

        warn!(delay = ?backoff, "reconnecting");
        let interrupted = tokio::select! {
            _ = &mut shutdown => true,
            _ = tokio::time::sleep(backoff) => false,
        };
        if interrupted {
            info!("shutdown requested, exiting");
            return;
        }
        backoff = (backoff * 2).min(max_backoff);
    }
}

/// Write a frame as `<dir>/<UTC timestamp>_<seq>.jpg`.
async fn save_frame(dir: &Path, seq: u64, frame: &[u8]) {
    let ts = chrono::Utc::now().format("%Y%m%dT%H%M%S%3fZ");
    let path = dir.join(format!("{ts}_{seq:06}.jpg"));
    match tokio::fs::write(&path, frame).await {
        Ok(()) => debug!(path = %path.display(), bytes = frame.len(), "frame written"),
        Err(e) => warn!(error = %e, path = %path.display(), "failed to write frame"),
    }
}
