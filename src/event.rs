use crate::auction::{Address, Amount};
use crate::canvas::{CanvasId, Pixel};
use crate::chain::Nft;
use crate::countdown::Urgency;
use serde::{Deserialize, Serialize};

// Every service reads and writes this one type. Fine at this size; a
// bigger client would give each service its own event enum.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Ui(UiEvent),
    Chain(ChainEvent),
    Auction(AuctionEvent),
    #[cfg(test)]
    Test,
}

/// Requests made by the user, already validated locally
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiEvent {
    PaintRequested {
        canvas_id: CanvasId,
        pixel: Pixel,
    },
    BidRequested {
        canvas_id: CanvasId,
        bidder: Address,
        amount: Amount,
    },
    SettleRequested {
        canvas_id: CanvasId,
        sender: Address,
        name: String,
    },
}

/// What the chain made of our requests, and fresh snapshots
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainEvent {
    CanvasUpdated {
        canvas_id: CanvasId,
    },
    PaintConfirmed {
        canvas_id: CanvasId,
        pixel: Pixel,
    },
    PaintRejected {
        canvas_id: CanvasId,
        pixel: Pixel,
        reason: String,
    },
    BidAccepted {
        canvas_id: CanvasId,
        bidder: Address,
        amount: Amount,
    },
    BidRejected {
        canvas_id: CanvasId,
        bidder: Address,
        amount: Amount,
        reason: String,
    },
    Settled {
        canvas_id: CanvasId,
        nft: Nft,
    },
    SettleRejected {
        canvas_id: CanvasId,
        reason: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionEvent {
    UrgencyChanged {
        canvas_id: CanvasId,
        urgency: Urgency,
    },
    Ended {
        canvas_id: CanvasId,
    },
}
