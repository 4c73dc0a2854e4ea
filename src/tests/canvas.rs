use crate::auction::MIST_PER_SUI;
use crate::canvas::*;
use crate::grid::Coord;
use anyhow::Result;

fn canvas_with(contributions: &[(&str, u32)]) -> Canvas {
    let mut canvas = Canvas::empty("0x1".to_owned(), "t".to_owned(), "0xproposer".to_owned());
    for (address, count) in contributions {
        canvas.contributions.insert((*address).to_owned(), *count);
        canvas.total_painted += count;
    }
    canvas
}

#[test]
fn colors_parse_and_print_as_hex() -> Result<()> {
    let color: Color = "#ff8800".parse()?;
    assert_eq!(color.rgb(), 0xFF8800);
    assert_eq!(color.to_string(), "#FF8800");

    for bad in ["ff8800", "#ff880", "#gg0000", "#ff88001", ""] {
        assert!(bad.parse::<Color>().is_err(), "{bad:?}");
    }
    Ok(())
}

#[test]
fn colors_serialize_as_strings() -> Result<()> {
    assert_eq!(serde_json::to_string(&PALETTE[2])?, "\"#FF0000\"");
    let color: Color = serde_json::from_str("\"#00ff88\"")?;
    assert_eq!(color, PALETTE[10]);
    assert!(serde_json::from_str::<Color>("\"red\"").is_err());
    Ok(())
}

#[test]
fn palette_has_no_duplicates() {
    let mut colors = PALETTE.to_vec();
    colors.sort();
    colors.dedup();
    assert_eq!(colors.len(), PALETTE.len());
}

#[test]
fn pixel_lookup_uses_row_major_layout() -> Result<()> {
    let mut canvas = canvas_with(&[]);
    canvas.filled[24 * 2 + 5] = true;
    canvas.colors[24 * 2 + 5] = PALETTE[4];

    assert_eq!(canvas.pixel_at(Coord::new(5, 2))?, Some(PALETTE[4]));
    assert_eq!(canvas.pixel_at(Coord::new(2, 5))?, None);
    assert!(canvas.pixel_at(Coord::new(24, 0)).is_err());
    Ok(())
}

#[test]
fn completion_percent() {
    let mut canvas = canvas_with(&[]);
    assert_eq!(canvas.completion_percent(), 0.0);
    canvas.total_painted = 288;
    assert_eq!(canvas.completion_percent(), 50.0);
}

#[test]
fn leaderboard_orders_by_pixels_then_address() {
    let canvas = canvas_with(&[("0xb", 5), ("0xa", 5), ("0xc", 10)]);

    let board = canvas.leaderboard(10);
    let order: Vec<_> = board.iter().map(|c| (c.address.as_str(), c.pixels)).collect();
    assert_eq!(order, vec![("0xc", 10), ("0xa", 5), ("0xb", 5)]);
    assert_eq!(board[0].share_percent, 50.0);
    assert_eq!(board[1].share_percent, 25.0);

    assert_eq!(canvas.leaderboard(1).len(), 1);
}

#[test]
fn payout_estimate_rounds_down() {
    let canvas = canvas_with(&[("0xa", 1), ("0xb", 2)]);
    let pool = 10 * MIST_PER_SUI;

    assert_eq!(canvas.estimated_payout("0xa", pool), 3_333_333_333);
    assert_eq!(canvas.estimated_payout("0xb", pool), 6_666_666_666);
    assert_eq!(canvas.estimated_payout("0xnobody", pool), 0);
    assert_eq!(canvas_with(&[]).estimated_payout("0xa", pool), 0);
}

#[test]
fn heatmap_is_relative_to_top_contributor() {
    let canvas = canvas_with(&[("0xa", 4), ("0xb", 1)]);
    assert_eq!(canvas.heat_intensity("0xa"), 1.0);
    assert_eq!(canvas.heat_intensity("0xb"), 0.25);
    assert_eq!(canvas.heat_intensity("0xc"), 0.0);

    assert_eq!(heat_hue(0.0), 240.0);
    assert_eq!(heat_hue(1.0), 0.0);
    assert_eq!(heat_hue(0.5), 120.0);
}

#[test]
fn addresses_are_shortened_for_display() {
    assert_eq!(
        short_address("0x1234567890abcdef1234567890abcdef"),
        "0x1234...cdef"
    );
    assert_eq!(short_address("0x12"), "0x12");
    assert_eq!(short_address(""), "");
}

#[test]
fn seeds_toggle_up_to_the_limit() -> Result<()> {
    let mut seeds = SeedSet::default();
    for i in 0..SEED_MAX as u32 {
        assert_eq!(seeds.toggle(Coord::new(i, 0), PALETTE[0])?, SeedToggle::Added);
    }
    assert_eq!(seeds.toggle(Coord::new(0, 1), PALETTE[0])?, SeedToggle::Full);
    assert_eq!(seeds.toggle(Coord::new(3, 0), PALETTE[0])?, SeedToggle::Removed);
    assert_eq!(seeds.len(), SEED_MAX - 1);
    assert!(seeds.seed_at(Coord::new(3, 0)).is_none());

    assert!(seeds.toggle(Coord::new(0, 24), PALETTE[0]).is_err());

    seeds.clear();
    assert!(seeds.is_empty());
    Ok(())
}

#[test]
fn too_many_seeds_are_rejected() {
    let seeds = (0..=SEED_MAX as u32)
        .map(|x| SeedPixel {
            x,
            y: 0,
            color: PALETTE[1],
        })
        .collect();
    assert_eq!(SeedSet::from_seeds(seeds), Err(CanvasError::TooManySeeds));
}

#[test]
fn draft_titles_are_validated() {
    assert_eq!(
        CanvasDraft::new("   ", SeedSet::default()),
        Err(CanvasError::EmptyTitle)
    );
    assert_eq!(
        CanvasDraft::new(&"x".repeat(TITLE_MAX + 1), SeedSet::default()),
        Err(CanvasError::TitleTooLong)
    );
    assert_eq!(
        CanvasDraft::new("  Sunset  ", SeedSet::default()).map(|d| d.title),
        Ok("Sunset".to_owned())
    );
}
