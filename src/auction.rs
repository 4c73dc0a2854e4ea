//! Bid ladder
//!
//! Amounts are integer counts of the smallest currency unit (MIST).
//! The chain applies the very same ladder when it accepts a bid, so
//! everything here has to stay in integer arithmetic.
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Amount = u64;
pub type Address = String;
pub type AddressRef<'s> = &'s str;

pub const MIST_PER_SUI: Amount = 1_000_000_000;

/// Minimum first bid when the auction has no bids yet (0.1 SUI)
pub const FIRST_BID_FLOOR: Amount = MIST_PER_SUI / 10;

/// One step of the ladder: up to and including `up_to`, bids grow by `increment`
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct Bracket {
    pub up_to: Option<Amount>,
    pub increment: Amount,
}

/// Evaluated top to bottom, the first bracket whose `up_to` is not
/// below the current highest bid wins.
pub const BID_LADDER: [Bracket; 4] = [
    Bracket {
        up_to: Some(10 * MIST_PER_SUI),
        increment: MIST_PER_SUI / 10,
    },
    Bracket {
        up_to: Some(100 * MIST_PER_SUI),
        increment: MIST_PER_SUI,
    },
    Bracket {
        up_to: Some(1000 * MIST_PER_SUI),
        increment: 5 * MIST_PER_SUI,
    },
    Bracket {
        up_to: None,
        increment: 10 * MIST_PER_SUI,
    },
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("invalid amount: {0}")]
    InvalidInput(String),
    #[error("amount too large")]
    TooLarge,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BidError {
    #[error(transparent)]
    InvalidInput(#[from] AmountError),
    #[error("bid is too low: offered {offered}, minimum is {minimum}")]
    TooLow { minimum: Amount, offered: Amount },
    #[error("auction is not running")]
    AuctionNotRunning,
    #[error("auction already ended")]
    AuctionEnded,
}

/// Increment applied on top of `current`, or `None` when there are no bids yet
pub fn increment_for(current: Amount) -> Option<Amount> {
    if current == 0 {
        return None;
    }
    BID_LADDER
        .iter()
        .find(|bracket| bracket.up_to.map(|up_to| current <= up_to).unwrap_or(true))
        .map(|bracket| bracket.increment)
}

/// Smallest bid the chain will accept given the current highest bid
pub fn min_next_bid(current: Amount) -> Result<Amount, AmountError> {
    match increment_for(current) {
        None => Ok(FIRST_BID_FLOOR),
        Some(increment) => current.checked_add(increment).ok_or(AmountError::TooLarge),
    }
}

pub fn ensure_valid_bid(current: Amount, offered: Amount) -> Result<(), BidError> {
    let minimum = min_next_bid(current)?;
    if offered < minimum {
        return Err(BidError::TooLow { minimum, offered });
    }
    Ok(())
}

pub fn amount_from_signed(raw: i64) -> Result<Amount, AmountError> {
    Amount::try_from(raw).map_err(|_| AmountError::InvalidInput(raw.to_string()))
}

/// Display form with three decimals, truncated: `1_500_000_000` -> `1.500 SUI`
pub fn format_sui(amount: Amount) -> String {
    let whole = amount / MIST_PER_SUI;
    let millis = (amount % MIST_PER_SUI) / 1_000_000;
    format!("{whole}.{millis:03} SUI")
}

/// Parses a display amount such as `"12.5"` into MIST without going through floats
pub fn parse_sui(input: &str) -> Result<Amount, AmountError> {
    let invalid = || AmountError::InvalidInput(input.to_owned());
    let s = input.trim();
    let s = s.strip_suffix("SUI").map(str::trim_end).unwrap_or(s);

    if s.is_empty() || s.starts_with('-') {
        return Err(invalid());
    }

    let (whole, frac) = match s.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (s, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) || frac.len() > 9 {
        return Err(invalid());
    }

    let whole: Amount = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| AmountError::TooLarge)?
    };
    let frac: Amount = if frac.is_empty() {
        0
    } else {
        let digits: Amount = frac.parse().map_err(|_| invalid())?;
        digits * 10u64.pow(9 - frac.len() as u32)
    };

    whole
        .checked_mul(MIST_PER_SUI)
        .and_then(|w| w.checked_add(frac))
        .ok_or(AmountError::TooLarge)
}

/// Highest bid as seen on chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighestBid {
    pub bidder: Address,
    pub amount: Amount,
}
