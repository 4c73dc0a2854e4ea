//! Chain boundary
//!
//! Everything the client needs from the chain: reading canvas objects
//! and submitting the four transactions of the canvas contract.
mod in_memory;

pub use self::in_memory::*;

use crate::auction::{Address, AddressRef, Amount, BidError};
use crate::canvas::{Canvas, CanvasError, CanvasId, CanvasIdRef, Color, SeedPixel};
use crate::grid::{Coord, GridError};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Aborts raised by the contract
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("unknown canvas: {0}")]
    UnknownCanvas(CanvasId),
    #[error("payment of {paid} is below the fee of {fee}")]
    InsufficientPayment { paid: Amount, fee: Amount },
    #[error("pixel ({}, {}) is already painted", .0.x, .0.y)]
    AlreadyPainted(Coord),
    #[error("canvas is already completed")]
    CanvasCompleted,
    #[error("painter is cooling down for {0} more ms")]
    Cooldown(u64),
    #[error("painter reached the contribution limit")]
    ContributionLimit,
    #[error("auction has not ended yet")]
    AuctionNotEnded,
    #[error("auction already settled")]
    AlreadySettled,
    #[error(transparent)]
    Bid(#[from] BidError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Canvas(#[from] CanvasError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nft {
    pub id: String,
    pub canvas_id: CanvasId,
    pub title: String,
    pub owner: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCanvas {
    pub title: String,
    pub seeds: Vec<SeedPixel>,
    pub payment: Amount,
}

pub trait ChainClient {
    fn get_canvas(&self, canvas_id: CanvasIdRef) -> Result<Option<Canvas>>;
    fn list_canvases(&self) -> Result<Vec<Canvas>>;

    fn create_canvas(&self, sender: AddressRef, request: CreateCanvas) -> Result<CanvasId>;
    fn paint_pixel(
        &self,
        sender: AddressRef,
        canvas_id: CanvasIdRef,
        coord: Coord,
        color: Color,
    ) -> Result<()>;
    fn place_bid(&self, sender: AddressRef, canvas_id: CanvasIdRef, amount: Amount) -> Result<()>;
    fn settle_auction(&self, sender: AddressRef, canvas_id: CanvasIdRef, name: &str)
        -> Result<Nft>;
}

pub type SharedChainClient = Arc<dyn ChainClient + Send + Sync + 'static>;
