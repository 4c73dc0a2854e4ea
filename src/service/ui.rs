//! HTTP API
//!
//! Read side is served straight from the state store; user actions are
//! validated locally with the same rules the chain applies, applied
//! optimistically where that makes sense, and then queued on the log
//! for the submitter.
use super::*;
use crate::{
    auction::{
        ensure_valid_bid, format_sui, min_next_bid, parse_sui, Address, Amount, AmountError,
        BidError, Bracket, HighestBid, BID_LADDER,
    },
    canvas::{
        heat_hue, Canvas, CanvasDraft, CanvasError, CanvasId, CanvasIdRef, Color, Contribution,
        PaintedCell, SeedPixel, SeedSet, CREATE_FEE, PALETTE,
    },
    chain::{CreateCanvas, SharedChainClient},
    clock::SharedClock,
    countdown::{self, format_clock, format_compact, Remaining, Urgency},
    event::UiEvent,
    grid::{GridError, CANVAS_GRID},
    store::SharedStateStore,
    workbench::{ClickOutcome, PaintError, Tool, WorkbenchState},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::{runtime::Runtime, sync::oneshot};

pub const UI_SERVICE_ID: &str = "ui";

const DEFAULT_LEADERBOARD: usize = 10;

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStateStore,
    pub chain: SharedChainClient,
    pub event_writer: event_log::SharedWriter,
    pub clock: SharedClock,
}

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Internal(anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(e) => {
                error!(error = %e, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_owned())
            }
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e)
    }
}

impl From<GridError> for ApiError {
    fn from(e: GridError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<AmountError> for ApiError {
    fn from(e: AmountError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<CanvasError> for ApiError {
    fn from(e: CanvasError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<BidError> for ApiError {
    fn from(e: BidError) -> Self {
        match e {
            BidError::InvalidInput(e) => e.into(),
            other => ApiError::Conflict(other.to_string()),
        }
    }
}

impl From<PaintError> for ApiError {
    fn from(e: PaintError) -> Self {
        match e {
            PaintError::Grid(e) => e.into(),
            other => ApiError::Conflict(other.to_string()),
        }
    }
}

pub(crate) type ApiResult<T> = std::result::Result<T, ApiError>;

fn load_canvas(state: &AppState, canvas_id: CanvasIdRef) -> ApiResult<Canvas> {
    state
        .store
        .load_canvas(canvas_id)?
        .ok_or_else(|| ApiError::NotFound(format!("unknown canvas: {canvas_id}")))
}

fn queue(state: &AppState, request: UiEvent) -> ApiResult<()> {
    state.event_writer.write(&[Event::Ui(request)])?;
    Ok(())
}

#[derive(Serialize)]
pub struct CanvasSummary {
    pub id: CanvasId,
    pub title: String,
    pub proposer: Address,
    pub total_painted: u32,
    pub completion_percent: f64,
    pub completed: bool,
    pub auction_running: bool,
    pub time_left: Option<String>,
}

pub(crate) async fn list_canvases(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CanvasSummary>>> {
    let now = state.clock.now_ms();
    let summaries = state
        .store
        .list_canvases()?
        .into_iter()
        .map(|canvas| CanvasSummary {
            completion_percent: canvas.completion_percent(),
            time_left: canvas
                .auction
                .running
                .then(|| format_compact(&countdown::remaining(canvas.auction.end_time, now))),
            auction_running: canvas.auction.running,
            id: canvas.id,
            title: canvas.title,
            proposer: canvas.proposer,
            total_painted: canvas.total_painted,
            completed: canvas.completed,
        })
        .collect();
    Ok(Json(summaries))
}

#[derive(Serialize)]
pub struct CanvasView {
    pub canvas: Canvas,
    pub cells: Vec<PaintedCell>,
    pub completion_percent: f64,
    pub workbench: Option<WorkbenchState>,
}

pub(crate) async fn get_canvas(
    State(state): State<AppState>,
    Path(canvas_id): Path<CanvasId>,
) -> ApiResult<Json<CanvasView>> {
    let canvas = load_canvas(&state, &canvas_id)?;
    Ok(Json(CanvasView {
        cells: canvas.painted_cells()?,
        completion_percent: canvas.completion_percent(),
        workbench: state.store.load_workbench(&canvas_id)?,
        canvas,
    }))
}

#[derive(Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

pub(crate) async fn get_contributors(
    State(state): State<AppState>,
    Path(canvas_id): Path<CanvasId>,
    Query(query): Query<LeaderboardQuery>,
) -> ApiResult<Json<Vec<ContributorView>>> {
    let canvas = load_canvas(&state, &canvas_id)?;
    // the final sale once settled, the standing bid before that
    let pool = if canvas.auction.settled {
        canvas.auction.sale_amount
    } else {
        canvas.auction.highest_amount()
    };
    let contributors = canvas
        .leaderboard(query.limit.unwrap_or(DEFAULT_LEADERBOARD))
        .into_iter()
        .map(|contribution| {
            let heat_intensity = canvas.heat_intensity(&contribution.address);
            ContributorView {
                heat_intensity,
                heat_hue: heat_hue(heat_intensity),
                estimated_payout: canvas.estimated_payout(&contribution.address, pool),
                contribution,
            }
        })
        .collect();
    Ok(Json(contributors))
}

#[derive(Serialize)]
pub struct ContributorView {
    #[serde(flatten)]
    pub contribution: Contribution,
    pub heat_intensity: f64,
    pub heat_hue: f64,
    pub estimated_payout: Amount,
}

pub(crate) async fn get_palette() -> Json<[Color; 24]> {
    Json(PALETTE)
}

#[derive(Serialize)]
pub struct AuctionView {
    pub running: bool,
    pub settled: bool,
    pub end_time: u64,
    pub highest_bid: Option<HighestBid>,
    pub min_next_bid: Amount,
    pub min_next_bid_display: String,
    pub remaining: Remaining,
    pub urgency: Urgency,
    pub time_left: String,
    pub clock: String,
    pub sale_amount: Amount,
    pub ladder: [Bracket; 4],
}

pub(crate) async fn get_auction(
    State(state): State<AppState>,
    Path(canvas_id): Path<CanvasId>,
) -> ApiResult<Json<AuctionView>> {
    let canvas = load_canvas(&state, &canvas_id)?;
    let auction = canvas.auction;
    let min_next_bid = min_next_bid(auction.highest_amount())?;
    let remaining = countdown::remaining(auction.end_time, state.clock.now_ms());
    Ok(Json(AuctionView {
        running: auction.running,
        settled: auction.settled,
        end_time: auction.end_time,
        min_next_bid,
        min_next_bid_display: format_sui(min_next_bid),
        urgency: remaining.urgency(),
        time_left: format_compact(&remaining),
        clock: format_clock(&remaining),
        remaining,
        sale_amount: auction.sale_amount,
        highest_bid: auction.highest_bid,
        ladder: BID_LADDER,
    }))
}

#[derive(Deserialize)]
pub struct PaintRequest {
    pub x: i64,
    pub y: i64,
    pub painter: Address,
    pub color: Option<Color>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum PaintResponse {
    Pending { x: u32, y: u32, color: Color },
    Picked { color: Color },
    Nothing,
}

pub(crate) async fn paint_pixel(
    State(state): State<AppState>,
    Path(canvas_id): Path<CanvasId>,
    Json(request): Json<PaintRequest>,
) -> ApiResult<(StatusCode, Json<PaintResponse>)> {
    let canvas = load_canvas(&state, &canvas_id)?;
    let coord = CANVAS_GRID.coord_from_signed(request.x, request.y)?;

    let mut outcome = None;
    state.store.update_workbench(&canvas_id, &mut |workbench| {
        if let Some(color) = request.color {
            workbench.select_color(color);
        }
        let result = workbench.click(&canvas, coord, &request.painter);
        if let Ok(ClickOutcome::Paint(command)) = &result {
            command.apply(workbench);
        }
        outcome = Some(result);
    })?;

    match outcome.ok_or_else(|| anyhow::format_err!("workbench was not updated"))?? {
        ClickOutcome::Paint(command) => {
            let pixel = command.pixel;
            let response = PaintResponse::Pending {
                x: pixel.x,
                y: pixel.y,
                color: pixel.color,
            };
            queue(&state, UiEvent::PaintRequested { canvas_id, pixel })?;
            Ok((StatusCode::ACCEPTED, Json(response)))
        }
        ClickOutcome::Picked(color) => Ok((StatusCode::OK, Json(PaintResponse::Picked { color }))),
        ClickOutcome::Nothing => Ok((StatusCode::OK, Json(PaintResponse::Nothing))),
    }
}

#[derive(Deserialize)]
pub struct WorkbenchUpdate {
    pub color: Option<Color>,
    pub tool: Option<Tool>,
    #[serde(default)]
    pub clear_pending: bool,
}

pub(crate) async fn update_workbench(
    State(state): State<AppState>,
    Path(canvas_id): Path<CanvasId>,
    Json(update): Json<WorkbenchUpdate>,
) -> ApiResult<Json<Option<WorkbenchState>>> {
    load_canvas(&state, &canvas_id)?;
    state.store.update_workbench(&canvas_id, &mut |workbench| {
        if let Some(color) = update.color {
            workbench.select_color(color);
        }
        if let Some(tool) = update.tool {
            workbench.set_tool(tool);
        }
        if update.clear_pending {
            workbench.clear_pending();
        }
    })?;
    Ok(Json(state.store.load_workbench(&canvas_id)?))
}

pub(crate) async fn undo(
    State(state): State<AppState>,
    Path(canvas_id): Path<CanvasId>,
) -> ApiResult<Json<Option<WorkbenchState>>> {
    state.store.update_workbench(&canvas_id, &mut |workbench| {
        workbench.undo();
    })?;
    Ok(Json(state.store.load_workbench(&canvas_id)?))
}

pub(crate) async fn redo(
    State(state): State<AppState>,
    Path(canvas_id): Path<CanvasId>,
) -> ApiResult<Json<Option<WorkbenchState>>> {
    state.store.update_workbench(&canvas_id, &mut |workbench| {
        workbench.redo();
    })?;
    Ok(Json(state.store.load_workbench(&canvas_id)?))
}

pub(crate) async fn close_workbench(
    State(state): State<AppState>,
    Path(canvas_id): Path<CanvasId>,
) -> ApiResult<StatusCode> {
    Ok(if state.store.close_workbench(&canvas_id)? {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    })
}

#[derive(Deserialize)]
pub struct BidRequest {
    pub bidder: Address,
    /// In MIST; takes precedence over `amount_sui`
    pub amount: Option<i64>,
    pub amount_sui: Option<String>,
}

#[derive(Serialize)]
pub struct BidQueued {
    pub amount: Amount,
    pub min_next_bid: Amount,
}

pub(crate) async fn place_bid(
    State(state): State<AppState>,
    Path(canvas_id): Path<CanvasId>,
    Json(request): Json<BidRequest>,
) -> ApiResult<(StatusCode, Json<BidQueued>)> {
    let canvas = load_canvas(&state, &canvas_id)?;

    let amount = match (request.amount, request.amount_sui.as_deref()) {
        (Some(mist), _) => crate::auction::amount_from_signed(mist)?,
        (None, Some(sui)) => parse_sui(sui)?,
        (None, None) => return Err(ApiError::BadRequest("missing bid amount".to_owned())),
    };

    if !canvas.auction.running || canvas.auction.settled {
        return Err(BidError::AuctionNotRunning.into());
    }
    if state.clock.now_ms() >= canvas.auction.end_time {
        return Err(BidError::AuctionEnded.into());
    }
    let current = canvas.auction.highest_amount();
    ensure_valid_bid(current, amount)?;

    queue(
        &state,
        UiEvent::BidRequested {
            canvas_id,
            bidder: request.bidder,
            amount,
        },
    )?;
    Ok((
        StatusCode::ACCEPTED,
        Json(BidQueued {
            amount,
            min_next_bid: min_next_bid(current)?,
        }),
    ))
}

#[derive(Deserialize)]
pub struct SettleRequest {
    pub sender: Address,
    pub name: String,
}

pub(crate) async fn settle(
    State(state): State<AppState>,
    Path(canvas_id): Path<CanvasId>,
    Json(request): Json<SettleRequest>,
) -> ApiResult<StatusCode> {
    let canvas = load_canvas(&state, &canvas_id)?;
    if !canvas.auction.running || canvas.auction.settled {
        return Err(BidError::AuctionNotRunning.into());
    }
    if state.clock.now_ms() < canvas.auction.end_time {
        return Err(ApiError::Conflict("auction has not ended yet".to_owned()));
    }
    queue(
        &state,
        UiEvent::SettleRequested {
            canvas_id,
            sender: request.sender,
            name: request.name,
        },
    )?;
    Ok(StatusCode::ACCEPTED)
}

#[derive(Deserialize)]
pub struct CreateRequest {
    pub sender: Address,
    pub title: String,
    #[serde(default)]
    pub seeds: Vec<SeedPixel>,
}

#[derive(Serialize)]
pub struct Created {
    pub id: CanvasId,
}

pub(crate) async fn create_canvas(
    State(state): State<AppState>,
    Json(request): Json<CreateRequest>,
) -> ApiResult<(StatusCode, Json<Created>)> {
    let draft = CanvasDraft::new(&request.title, SeedSet::from_seeds(request.seeds)?)?;

    let chain = state.chain.clone();
    let sender = request.sender;
    let id = tokio::task::spawn_blocking(move || {
        chain.create_canvas(
            &sender,
            CreateCanvas {
                title: draft.title,
                seeds: draft.seeds.seeds().to_vec(),
                payment: CREATE_FEE,
            },
        )
    })
    .await
    .map_err(|e| anyhow::format_err!("create task failed: {e}"))?
    .map_err(|e| ApiError::Conflict(e.to_string()))?;

    if let Some(canvas) = state.chain.get_canvas(&id)? {
        state.store.store_canvas(canvas)?;
    }
    info!(canvas_id = %id, "canvas created");
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/palette", get(get_palette))
        .route("/canvases", get(list_canvases).post(create_canvas))
        .route("/canvases/:id", get(get_canvas))
        .route("/canvases/:id/contributors", get(get_contributors))
        .route("/canvases/:id/auction", get(get_auction))
        .route("/canvases/:id/pixels", post(paint_pixel))
        .route(
            "/canvases/:id/workbench",
            axum::routing::put(update_workbench).delete(close_workbench),
        )
        .route("/canvases/:id/undo", post(undo))
        .route("/canvases/:id/redo", post(redo))
        .route("/canvases/:id/bids", post(place_bid))
        .route("/canvases/:id/settle", post(settle))
        .with_state(state)
}

async fn run_http_server(addr: SocketAddr, state: AppState) -> Result<()> {
    info!(%addr, "http server listening");
    axum::Server::try_bind(&addr)?
        .serve(router(state).into_make_service())
        .await?;

    Ok(())
}

pub struct Ui {
    // dropping the runtime cancels the server
    _runtime: Runtime,
    server_rx: oneshot::Receiver<Result<()>>,
}

impl Ui {
    pub fn new(addr: SocketAddr, state: AppState) -> Result<Self> {
        let runtime = Runtime::new()?;

        let (tx, rx) = oneshot::channel();

        runtime.spawn(async move {
            let res = run_http_server(addr, state)
                .await
                .map_err(|e| e.context("failed to run http server"));
            if tx.send(res).is_err() {
                warn!("ui service gone before the http server finished");
            }
        });

        Ok(Self {
            _runtime: runtime,
            server_rx: rx,
        })
    }
}

impl LoopService for Ui {
    fn get_service_id(&self) -> ServiceId {
        UI_SERVICE_ID.to_owned()
    }

    fn run_iteration(&mut self) -> Result<()> {
        // don't hog the cpu
        thread::sleep(Duration::from_millis(100));

        match self.server_rx.try_recv() {
            Ok(res) => res,
            Err(oneshot::error::TryRecvError::Empty) => Ok(()),
            Err(oneshot::error::TryRecvError::Closed) => {
                Err(format_err!("ui server died without leaving a response"))
            }
        }
    }
}
