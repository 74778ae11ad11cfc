//! fmap: headless map host
//!
//! Reads a JSON-lines script of method calls (from the file given as the
//! first argument, or stdin), runs each through the map host and prints one
//! JSON reply per call, followed by any events the call raised.
//!
//! A line is either a call, `{"viewId": 1, "method": "map#create", "arguments": {...}}`,
//! or a clock step, `{"pump_ms": 300}`.
//!
//! The host config is read from the TOML file named by `FMAP_CONFIG`;
//! without it the offline preset is used.

use anyhow::{Context, Result};
use fmap_host::{encode_reply, BridgeError, HostConfig, MapHost, MethodCall};
use serde::Deserialize;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

// Use mimalloc as the global allocator for reduced memory fragmentation
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// One script line.
#[derive(Deserialize)]
#[serde(untagged)]
enum Step {
    Pump { pump_ms: u64 },
    Call(MethodCall),
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries replies
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();

    info!("fmap starting...");

    let config = load_config(std::env::var_os("FMAP_CONFIG").map(PathBuf::from))?;
    let mut host = MapHost::new(&config).context("invalid host configuration")?;

    let input: Box<dyn BufRead> = match std::env::args_os().nth(1) {
        Some(path) => {
            let path = PathBuf::from(path);
            let file = std::fs::File::open(&path)
                .with_context(|| format!("cannot open script {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_script(&mut host, input, &mut out)?;
    out.flush()?;

    info!("fmap shutting down");
    Ok(())
}

/// Run every script line through `host`, writing replies and events to `out`.
fn run_script(host: &mut MapHost, input: impl BufRead, out: &mut impl Write) -> Result<()> {
    for (number, line) in input.lines().enumerate() {
        let line = line.context("failed to read script")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match serde_json::from_str::<Step>(line) {
            Ok(Step::Pump { pump_ms }) => {
                host.pump(Duration::from_millis(pump_ms));
            }
            Ok(Step::Call(call)) => {
                let reply = encode_reply(&host.dispatch(call));
                writeln!(out, "{reply}")?;
            }
            Err(e) => {
                warn!("Malformed line {}: {}", number + 1, e);
                writeln!(out, "{}", encode_reply(&Err(BridgeError::Decode(e))))?;
            }
        }

        for event in host.poll_events() {
            writeln!(out, "{}", serde_json::to_string(&event)?)?;
        }
    }
    Ok(())
}

/// The config file at `path`, or the offline preset without one.
fn load_config(path: Option<PathBuf>) -> Result<HostConfig> {
    match path {
        Some(path) => {
            info!("Loading config from {}", path.display());
            HostConfig::from_toml_file(&path)
                .with_context(|| format!("cannot load config {}", path.display()))
        }
        None => Ok(HostConfig::offline()),
    }
}
