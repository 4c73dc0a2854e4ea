use crate::auction::{AmountError, BidError, MIST_PER_SUI};
use crate::canvas::{Canvas, CanvasId, PALETTE};
use crate::chain::{InMemoryChain, SharedChainClient};
use crate::clock::ManualClock;
use crate::countdown::HOUR_MS;
use crate::event::{Event, UiEvent};
use crate::event_log::{self, SharedReader};
use crate::grid::{Coord, GridError};
use crate::service::ui::*;
use crate::store::InMemoryStateStore;
use crate::workbench::PaintError;
use anyhow::{bail, format_err, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

const START: u64 = 1_700_000_000_000;
const AUCTION_ID: &str = "0xauction";

struct Fixture {
    clock: Arc<ManualClock>,
    state: AppState,
    reader: SharedReader,
}

impl Fixture {
    fn new() -> Self {
        let clock = Arc::new(ManualClock::new(START));
        let chain: SharedChainClient = InMemoryChain::new_shared(clock.clone(), HOUR_MS);
        let (event_writer, reader) = event_log::new_in_memory_shared();
        Self {
            state: AppState {
                store: InMemoryStateStore::new_shared(),
                chain,
                event_writer,
                clock: clock.clone(),
            },
            clock,
            reader,
        }
    }

    fn state(&self) -> State<AppState> {
        State(self.state.clone())
    }

    fn queued(&self) -> Result<Vec<Event>> {
        Ok(self
            .reader
            .read(0, 100, Some(Duration::ZERO))?
            .data
            .into_iter()
            .map(|e| e.details)
            .collect())
    }

    /// A completed canvas whose auction ends an hour from now
    fn store_running_auction(&self) -> Result<()> {
        let mut canvas = Canvas::empty(
            AUCTION_ID.to_owned(),
            "done".to_owned(),
            "0xproposer".to_owned(),
        );
        canvas.completed = true;
        canvas.auction.running = true;
        canvas.auction.end_time = START + HOUR_MS;
        canvas.contributions.insert("0xa".to_owned(), 3);
        canvas.contributions.insert("0xb".to_owned(), 1);
        self.state.store.store_canvas(canvas)?;
        Ok(())
    }
}

fn block_on<F: Future>(f: F) -> Result<F::Output> {
    Ok(tokio::runtime::Runtime::new()?.block_on(f))
}

fn status<T: IntoResponse>(res: ApiResult<T>) -> StatusCode {
    res.into_response().status()
}

fn create(fx: &Fixture, title: &str) -> Result<ApiResult<CanvasId>> {
    let res = block_on(create_canvas(
        fx.state(),
        Json(CreateRequest {
            sender: "0xproposer".to_owned(),
            title: title.to_owned(),
            seeds: vec![],
        }),
    ))?;
    Ok(res.map(|(_, Json(created))| created.id))
}

fn paint(fx: &Fixture, canvas_id: &str, x: i64, y: i64) -> Result<ApiResult<Json<PaintResponse>>> {
    let res = block_on(paint_pixel(
        fx.state(),
        Path(canvas_id.to_owned()),
        Json(PaintRequest {
            x,
            y,
            painter: "0xpainter".to_owned(),
            color: Some(PALETTE[5]),
        }),
    ))?;
    Ok(res.map(|(_, response)| response))
}

fn bid(
    fx: &Fixture,
    amount: Option<i64>,
    amount_sui: Option<&str>,
) -> Result<ApiResult<(StatusCode, Json<BidQueued>)>> {
    block_on(place_bid(
        fx.state(),
        Path(AUCTION_ID.to_owned()),
        Json(BidRequest {
            bidder: "0xbidder".to_owned(),
            amount,
            amount_sui: amount_sui.map(str::to_owned),
        }),
    ))
}

fn settle_now(fx: &Fixture) -> Result<StatusCode> {
    Ok(status(block_on(settle(
        fx.state(),
        Path(AUCTION_ID.to_owned()),
        Json(SettleRequest {
            sender: "0xbidder".to_owned(),
            name: "Done #1".to_owned(),
        }),
    ))?))
}

#[test]
fn errors_map_to_status_codes() {
    assert_eq!(
        ApiError::from(GridError::InvalidInput { x: -1, y: 0 })
            .into_response()
            .status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        ApiError::from(BidError::InvalidInput(AmountError::TooLarge))
            .into_response()
            .status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        ApiError::from(BidError::TooLow {
            minimum: 2,
            offered: 1
        })
        .into_response()
        .status(),
        StatusCode::CONFLICT
    );
    assert_eq!(
        ApiError::from(PaintError::AlreadyPainted(Coord::new(0, 0)))
            .into_response()
            .status(),
        StatusCode::CONFLICT
    );
    assert_eq!(
        ApiError::NotFound("x".to_owned()).into_response().status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        ApiError::from(format_err!("boom")).into_response().status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn created_canvases_are_listed() -> Result<()> {
    let fx = Fixture::new();
    let id = create(&fx, "  Sunset  ")?.map_err(|e| format_err!("{e:?}"))?;
    assert_eq!(status(create(&fx, "   ")?), StatusCode::BAD_REQUEST);

    let Json(list) = block_on(list_canvases(fx.state()))?.map_err(|e| format_err!("{e:?}"))?;
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].title, "Sunset");

    let Json(view) = block_on(get_canvas(fx.state(), Path(id)))?.map_err(|e| format_err!("{e:?}"))?;
    assert!(view.cells.is_empty());
    assert_eq!(
        status(block_on(get_canvas(fx.state(), Path("0xnope".to_owned())))?),
        StatusCode::NOT_FOUND
    );
    Ok(())
}

#[test]
fn paint_is_applied_locally_and_queued() -> Result<()> {
    let fx = Fixture::new();
    let id = create(&fx, "Sunset")?.map_err(|e| format_err!("{e:?}"))?;

    match paint(&fx, &id, 3, 4)? {
        Ok(Json(PaintResponse::Pending { x: 3, y: 4, color })) => assert_eq!(color, PALETTE[5]),
        other => bail!("unexpected paint outcome {:?}", other.err()),
    }
    let workbench = fx
        .state
        .store
        .load_workbench(&id)?
        .ok_or_else(|| format_err!("workbench missing"))?;
    assert!(workbench.is_pending(Coord::new(3, 4)));

    let queued = fx.queued()?;
    assert_eq!(queued.len(), 1);
    assert!(matches!(
        &queued[0],
        Event::Ui(UiEvent::PaintRequested { pixel, .. }) if pixel.coord() == Coord::new(3, 4)
    ));

    assert_eq!(status(paint(&fx, &id, 3, 4)?), StatusCode::CONFLICT);
    assert_eq!(status(paint(&fx, &id, -1, 4)?), StatusCode::BAD_REQUEST);
    assert_eq!(status(paint(&fx, &id, 24, 0)?), StatusCode::BAD_REQUEST);
    assert_eq!(status(paint(&fx, "0xnope", 0, 0)?), StatusCode::NOT_FOUND);
    // rejected clicks queue nothing
    assert_eq!(fx.queued()?.len(), 1);
    Ok(())
}

#[test]
fn bids_are_checked_before_queueing() -> Result<()> {
    let fx = Fixture::new();
    assert_eq!(status(bid(&fx, Some(1), None)?), StatusCode::NOT_FOUND);
    fx.store_running_auction()?;

    assert_eq!(status(bid(&fx, None, None)?), StatusCode::BAD_REQUEST);
    assert_eq!(status(bid(&fx, Some(-5), None)?), StatusCode::BAD_REQUEST);
    assert_eq!(status(bid(&fx, None, Some("-1"))?), StatusCode::BAD_REQUEST);
    assert_eq!(status(bid(&fx, None, Some("0.05"))?), StatusCode::CONFLICT);
    assert!(fx.queued()?.is_empty());

    // the MIST amount wins over the display amount
    let (code, Json(queued)) =
        bid(&fx, Some(MIST_PER_SUI as i64), Some("0.01"))?.map_err(|e| format_err!("{e:?}"))?;
    assert_eq!(code, StatusCode::ACCEPTED);
    assert_eq!(queued.amount, MIST_PER_SUI);
    assert_eq!(
        fx.queued()?,
        vec![Event::Ui(UiEvent::BidRequested {
            canvas_id: AUCTION_ID.to_owned(),
            bidder: "0xbidder".to_owned(),
            amount: MIST_PER_SUI,
        })]
    );

    fx.clock.advance(HOUR_MS);
    assert_eq!(status(bid(&fx, Some(10 * MIST_PER_SUI as i64), None)?), StatusCode::CONFLICT);
    Ok(())
}

#[test]
fn settlement_waits_for_the_deadline() -> Result<()> {
    let fx = Fixture::new();
    fx.store_running_auction()?;

    assert_eq!(settle_now(&fx)?, StatusCode::CONFLICT);
    fx.clock.advance(HOUR_MS);
    assert_eq!(settle_now(&fx)?, StatusCode::ACCEPTED);
    assert!(matches!(
        fx.queued()?.as_slice(),
        [Event::Ui(UiEvent::SettleRequested { .. })]
    ));
    Ok(())
}

#[test]
fn auction_and_contributor_views() -> Result<()> {
    let fx = Fixture::new();
    fx.store_running_auction()?;
    fx.clock.advance(HOUR_MS - 61_000);

    let Json(auction) = block_on(get_auction(fx.state(), Path(AUCTION_ID.to_owned())))?
        .map_err(|e| format_err!("{e:?}"))?;
    assert_eq!(auction.min_next_bid, MIST_PER_SUI / 10);
    assert_eq!(auction.min_next_bid_display, "0.100 SUI");
    assert_eq!(auction.clock, "00:00:01:01");
    assert_eq!(auction.time_left, "1m");

    let mut canvas = fx
        .state
        .store
        .load_canvas(AUCTION_ID)?
        .ok_or_else(|| format_err!("canvas missing"))?;
    canvas.auction.settled = true;
    canvas.auction.sale_amount = 4 * MIST_PER_SUI;
    fx.state.store.store_canvas(canvas)?;

    let Json(contributors) = block_on(get_contributors(
        fx.state(),
        Path(AUCTION_ID.to_owned()),
        Query(LeaderboardQuery { limit: None }),
    ))?
    .map_err(|e| format_err!("{e:?}"))?;
    assert_eq!(contributors.len(), 2);
    assert_eq!(contributors[0].contribution.address, "0xa");
    assert_eq!(contributors[0].estimated_payout, 3 * MIST_PER_SUI);
    assert_eq!(contributors[0].heat_hue, 0.0);
    assert_eq!(contributors[1].estimated_payout, MIST_PER_SUI);
    assert_eq!(contributors[1].heat_intensity, 1.0 / 3.0);

    let Json(palette) = block_on(get_palette())?;
    assert_eq!(palette, PALETTE);
    Ok(())
}
