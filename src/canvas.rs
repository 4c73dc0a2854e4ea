//! Canvas model
//!
//! A local, read-only view of a canvas object as last fetched from the
//! chain, and the statistics derived from it for display.
use crate::auction::{Address, AddressRef, Amount, HighestBid, MIST_PER_SUI};
use crate::clock::Timestamp;
use crate::grid::{Coord, GridError, CANVAS_GRID};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

pub type CanvasId = String;
pub type CanvasIdRef<'s> = &'s str;

pub const TOTAL_PIXELS: u32 = CANVAS_GRID.len();
pub const SEED_MAX: usize = 10;
pub const COOLDOWN_MS: u64 = 10_000;
pub const MAX_CONTRIBUTION: u32 = 50;
pub const TITLE_MAX: usize = 50;
pub const CREATE_FEE: Amount = MIST_PER_SUI / 10;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CanvasError {
    #[error("invalid color: {0}")]
    InvalidColor(String),
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("title longer than {TITLE_MAX} characters")]
    TitleTooLong,
    #[error("at most {SEED_MAX} seed pixels allowed")]
    TooManySeeds,
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// 24-bit RGB color, written as `#RRGGBB`
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(u32);

impl Color {
    pub const fn from_rgb(rgb: u32) -> Self {
        Self(rgb & 0x00ff_ffff)
    }

    pub fn rgb(self) -> u32 {
        self.0
    }
}

impl FromStr for Color {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CanvasError::InvalidColor(s.to_owned());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        u32::from_str_radix(hex, 16)
            .map(Color)
            .map_err(|_| invalid())
    }
}

impl TryFrom<String> for Color {
    type Error = CanvasError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

pub const PALETTE: [Color; 24] = [
    Color(0x000000),
    Color(0xFFFFFF),
    Color(0xFF0000),
    Color(0x00FF00),
    Color(0x0000FF),
    Color(0xFFFF00),
    Color(0xFF00FF),
    Color(0x00FFFF),
    Color(0xFF8800),
    Color(0x8800FF),
    Color(0x00FF88),
    Color(0xFF0088),
    Color(0x888888),
    Color(0x4444FF),
    Color(0xFF4444),
    Color(0x44FF44),
    Color(0xFFD700),
    Color(0x8B4513),
    Color(0x800080),
    Color(0xFFA500),
    Color(0xA52A2A),
    Color(0x000080),
    Color(0x008080),
    Color(0x808000),
];

pub const DEFAULT_COLOR: Color = Color(0xFF0000);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pixel {
    pub x: u32,
    pub y: u32,
    pub color: Color,
    pub painter: Address,
}

impl Pixel {
    pub fn coord(&self) -> Coord {
        Coord::new(self.x, self.y)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPixel {
    pub x: u32,
    pub y: u32,
    pub color: Color,
}

impl SeedPixel {
    pub fn coord(&self) -> Coord {
        Coord::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionInfo {
    pub running: bool,
    pub end_time: Timestamp,
    pub highest_bid: Option<HighestBid>,
    pub settled: bool,
    pub sale_amount: Amount,
}

impl AuctionInfo {
    pub fn highest_amount(&self) -> Amount {
        self.highest_bid.as_ref().map(|b| b.amount).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canvas {
    pub id: CanvasId,
    pub title: String,
    pub proposer: Address,
    /// Row-major, one entry per cell; meaningful only where `filled` is set
    pub colors: Vec<Color>,
    pub filled: Vec<bool>,
    pub total_painted: u32,
    pub completed: bool,
    pub contributions: BTreeMap<Address, u32>,
    pub auction: AuctionInfo,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct PaintedCell {
    pub x: u32,
    pub y: u32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contribution {
    pub address: Address,
    pub short_address: String,
    pub pixels: u32,
    pub share_percent: f64,
}

impl Canvas {
    pub fn empty(id: CanvasId, title: String, proposer: Address) -> Self {
        Self {
            id,
            title,
            proposer,
            colors: vec![Color::default(); TOTAL_PIXELS as usize],
            filled: vec![false; TOTAL_PIXELS as usize],
            total_painted: 0,
            completed: false,
            contributions: BTreeMap::new(),
            auction: AuctionInfo::default(),
        }
    }

    pub fn pixel_at(&self, coord: Coord) -> Result<Option<Color>, GridError> {
        let index = CANVAS_GRID.coord_to_index(coord)? as usize;
        Ok(if self.filled.get(index).copied().unwrap_or(false) {
            self.colors.get(index).copied()
        } else {
            None
        })
    }

    pub fn is_filled(&self, coord: Coord) -> Result<bool, GridError> {
        Ok(self.pixel_at(coord)?.is_some())
    }

    /// Painted cells in index order
    pub fn painted_cells(&self) -> Result<Vec<PaintedCell>, GridError> {
        self.filled
            .iter()
            .zip(&self.colors)
            .zip(0u32..)
            .filter(|((filled, _), _)| **filled)
            .map(|((_, color), index)| {
                let Coord { x, y } = CANVAS_GRID.from_index(index)?;
                Ok(PaintedCell {
                    x,
                    y,
                    color: *color,
                })
            })
            .collect()
    }

    pub fn completion_percent(&self) -> f64 {
        f64::from(self.total_painted) * 100.0 / f64::from(TOTAL_PIXELS)
    }

    pub fn contributed_by(&self, address: AddressRef) -> u32 {
        self.contributions.get(address).copied().unwrap_or(0)
    }

    fn total_contributed(&self) -> u64 {
        self.contributions.values().map(|c| u64::from(*c)).sum()
    }

    /// Display only; the payout itself is computed by the chain
    pub fn share_percent(&self, address: AddressRef) -> f64 {
        let total = self.total_contributed();
        if total == 0 {
            return 0.0;
        }
        f64::from(self.contributed_by(address)) * 100.0 / total as f64
    }

    /// Pro-rata part of `pool` for `address`, rounded down
    pub fn estimated_payout(&self, address: AddressRef, pool: Amount) -> Amount {
        let total = self.total_contributed();
        if total == 0 {
            return 0;
        }
        let share = u128::from(pool) * u128::from(self.contributed_by(address)) / u128::from(total);
        share as Amount
    }

    /// Top painters by pixel count, ties broken by address
    pub fn leaderboard(&self, limit: usize) -> Vec<Contribution> {
        let mut entries: Vec<_> = self.contributions.iter().collect();
        entries.sort_by(|(a_addr, a), (b_addr, b)| b.cmp(a).then_with(|| a_addr.cmp(b_addr)));
        entries
            .into_iter()
            .take(limit)
            .map(|(address, pixels)| Contribution {
                address: address.clone(),
                short_address: short_address(address),
                pixels: *pixels,
                share_percent: self.share_percent(address),
            })
            .collect()
    }

    /// Relative to the top contributor, in `0.0..=1.0`
    pub fn heat_intensity(&self, address: AddressRef) -> f64 {
        let max = self.contributions.values().copied().max().unwrap_or(0);
        if max == 0 {
            return 0.0;
        }
        f64::from(self.contributed_by(address)) / f64::from(max)
    }
}

/// Hue for a heatmap cell: 240 (blue) for cold, 0 (red) for hot
pub fn heat_hue(intensity: f64) -> f64 {
    240.0 - intensity.clamp(0.0, 1.0) * 240.0
}

/// `0x1234...abcd`
pub fn short_address(address: AddressRef) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_owned();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SeedToggle {
    Added,
    Removed,
    Full,
}

/// Hint pixels the proposer places when creating a canvas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedSet {
    max: usize,
    seeds: Vec<SeedPixel>,
}

impl Default for SeedSet {
    fn default() -> Self {
        Self::new(SEED_MAX)
    }
}

impl SeedSet {
    pub fn new(max: usize) -> Self {
        Self {
            max,
            seeds: Vec::new(),
        }
    }

    pub fn from_seeds(seeds: Vec<SeedPixel>) -> Result<Self, CanvasError> {
        let mut set = Self::default();
        for seed in seeds {
            if set.seed_at(seed.coord()).is_some() {
                continue;
            }
            if set.toggle(seed.coord(), seed.color)? == SeedToggle::Full {
                return Err(CanvasError::TooManySeeds);
            }
        }
        Ok(set)
    }

    /// Removes the seed at `coord` if present, adds one otherwise
    pub fn toggle(&mut self, coord: Coord, color: Color) -> Result<SeedToggle, CanvasError> {
        CANVAS_GRID.coord_to_index(coord)?;
        if let Some(pos) = self.seeds.iter().position(|s| s.coord() == coord) {
            self.seeds.remove(pos);
            return Ok(SeedToggle::Removed);
        }
        if self.seeds.len() >= self.max {
            return Ok(SeedToggle::Full);
        }
        self.seeds.push(SeedPixel {
            x: coord.x,
            y: coord.y,
            color,
        });
        Ok(SeedToggle::Added)
    }

    pub fn seed_at(&self, coord: Coord) -> Option<&SeedPixel> {
        self.seeds.iter().find(|s| s.coord() == coord)
    }

    pub fn clear(&mut self) {
        self.seeds.clear();
    }

    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    pub fn seeds(&self) -> &[SeedPixel] {
        &self.seeds
    }
}

/// A canvas about to be proposed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasDraft {
    pub title: String,
    pub seeds: SeedSet,
}

impl CanvasDraft {
    pub fn new(title: &str, seeds: SeedSet) -> Result<Self, CanvasError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CanvasError::EmptyTitle);
        }
        if title.chars().count() > TITLE_MAX {
            return Err(CanvasError::TitleTooLong);
        }
        Ok(Self {
            title: title.to_owned(),
            seeds,
        })
    }
}
