mod auction;
mod canvas;
mod chain;
mod clock;
mod config;
mod countdown;
mod event;
mod event_log;
mod grid;
mod service;
mod store;
mod workbench;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

const DEMO_PROPOSER: &str = "0x00000000000000000000000000000000000000000000000000000000000000de";

fn setup_logging(filter: Option<&str>) -> Result<()> {
    // user-provided filter first, then RUST_LOG, then `info`
    let env_filter = match filter {
        Some(filter) => EnvFilter::try_new(filter).context("invalid log filter")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter)
        .try_init()
        .context("failed to set up logging")?;

    Ok(())
}

fn main() -> Result<()> {
    let config = config::Config::parse();
    setup_logging(config.log.as_deref())?;

    let clock = clock::SystemClock::new_shared();
    let in_memory_chain = chain::InMemoryChain::new_shared(clock.clone(), config.auction_duration_ms);
    let store = store::InMemoryStateStore::new_shared();
    let (event_writer, event_reader) = event_log::new_in_memory_shared();

    if config.demo {
        let id = chain::ChainClient::create_canvas(
            &*in_memory_chain,
            DEMO_PROPOSER,
            chain::CreateCanvas {
                title: "Demo canvas".to_owned(),
                seeds: vec![canvas::SeedPixel {
                    x: 12,
                    y: 12,
                    color: canvas::DEFAULT_COLOR,
                }],
                payment: canvas::CREATE_FEE,
            },
        )?;
        info!(canvas_id = %id, "demo canvas proposed");
    }

    let chain: chain::SharedChainClient = in_memory_chain;
    let svc_ctr = service::ServiceControl::new();

    ctrlc::set_handler({
        let svc_ctr = svc_ctr.clone();
        move || {
            warn!("stopping all services...");
            svc_ctr.stop_all();
        }
    })?;

    let ui = service::Ui::new(
        config.http_addr,
        service::AppState {
            store: store.clone(),
            chain: chain.clone(),
            event_writer: event_writer.clone(),
            clock: clock.clone(),
        },
    )?;

    for handle in vec![
        svc_ctr.spawn_loop(service::CanvasPoller::new(
            chain.clone(),
            store.clone(),
            event_writer.clone(),
            config.canvas_poll_interval(),
        )),
        svc_ctr.spawn_loop(service::AuctionWatcher::new(
            store.clone(),
            event_writer.clone(),
            clock.clone(),
            config.countdown_tick(),
        )),
        svc_ctr.spawn_log_follower(
            service::TransactionSubmitter::new(chain.clone(), event_writer.clone()),
            event_reader.clone(),
        ),
        svc_ctr.spawn_log_follower(
            service::Reconciler::new(chain.clone(), store.clone(), event_writer.clone()),
            event_reader.clone(),
        ),
        svc_ctr.spawn_loop(ui),
    ] {
        handle.join()?
    }

    Ok(())
}

#[cfg(test)]
mod tests;
