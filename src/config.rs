use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

use crate::countdown::DAY_MS;

/// Keeps a local view of collaborative canvases in sync with the chain
/// and serves it over HTTP.
#[derive(Parser, Debug, Clone)]
#[command(name = "canvas-client", version, about)]
pub struct Config {
    /// Address the HTTP API listens on
    #[arg(long, env = "CANVAS_HTTP_ADDR", default_value = "127.0.0.1:3000")]
    pub http_addr: SocketAddr,

    /// How often canvas snapshots are refreshed
    #[arg(long, env = "CANVAS_POLL_MS", default_value_t = 5_000)]
    pub canvas_poll_ms: u64,

    /// How often running auctions are re-evaluated
    #[arg(long, env = "CANVAS_COUNTDOWN_TICK_MS", default_value_t = 1_000)]
    pub countdown_tick_ms: u64,

    /// Auction length once a canvas is completed (in-memory chain)
    #[arg(long, env = "CANVAS_AUCTION_DURATION_MS", default_value_t = DAY_MS)]
    pub auction_duration_ms: u64,

    /// Propose a demo canvas at start-up
    #[arg(long)]
    pub demo: bool,

    /// Tracing filter, e.g. `info` or `canvas_client=debug`; falls back to `RUST_LOG`
    #[arg(long)]
    pub log: Option<String>,
}

impl Config {
    pub fn canvas_poll_interval(&self) -> Duration {
        Duration::from_millis(self.canvas_poll_ms)
    }

    pub fn countdown_tick(&self) -> Duration {
        Duration::from_millis(self.countdown_tick_ms)
    }
}
