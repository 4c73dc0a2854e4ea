use crate::auction::*;
use anyhow::Result;

#[test]
fn first_bid_uses_the_flat_floor() -> Result<()> {
    assert_eq!(min_next_bid(0)?, 100_000_000);
    assert_eq!(increment_for(0), None);
    Ok(())
}

#[test]
fn ladder_brackets_include_their_upper_bound() -> Result<()> {
    assert_eq!(min_next_bid(1)?, 100_000_001);
    assert_eq!(min_next_bid(10_000_000_000)?, 10_100_000_000);
    assert_eq!(min_next_bid(10_000_000_001)?, 11_000_000_001);
    assert_eq!(min_next_bid(100_000_000_000)?, 101_000_000_000);
    assert_eq!(min_next_bid(100_000_000_001)?, 105_000_000_001);
    assert_eq!(min_next_bid(1_000_000_000_000)?, 1_005_000_000_000);
    assert_eq!(min_next_bid(1_000_000_000_001)?, 1_010_000_000_001);
    Ok(())
}

#[test]
fn ladder_strictly_increases() -> Result<()> {
    for current in [
        1,
        99_999_999,
        5 * MIST_PER_SUI,
        42 * MIST_PER_SUI + 7,
        999 * MIST_PER_SUI,
        123_456 * MIST_PER_SUI,
    ] {
        assert!(min_next_bid(current)? > current, "ladder at {current}");
    }
    Ok(())
}

#[test]
fn ladder_overflow_is_reported() {
    assert_eq!(min_next_bid(u64::MAX), Err(AmountError::TooLarge));
}

#[test]
fn negative_amounts_are_rejected() {
    assert!(matches!(
        amount_from_signed(-1),
        Err(AmountError::InvalidInput(_))
    ));
    assert_eq!(
        amount_from_signed(0).and_then(min_next_bid),
        Ok(FIRST_BID_FLOOR)
    );
}

#[test]
fn minimum_itself_is_a_valid_bid() {
    assert_eq!(ensure_valid_bid(10_000_000_000, 10_100_000_000), Ok(()));
    assert_eq!(
        ensure_valid_bid(10_000_000_000, 10_099_999_999),
        Err(BidError::TooLow {
            minimum: 10_100_000_000,
            offered: 10_099_999_999
        })
    );
    assert_eq!(ensure_valid_bid(0, FIRST_BID_FLOOR), Ok(()));
}

#[test]
fn formats_display_amounts() {
    assert_eq!(format_sui(0), "0.000 SUI");
    assert_eq!(format_sui(1_500_000_000), "1.500 SUI");
    assert_eq!(format_sui(100_000_000), "0.100 SUI");
    assert_eq!(format_sui(1_999_999), "0.001 SUI");
}

#[test]
fn parses_display_amounts_exactly() -> Result<()> {
    assert_eq!(parse_sui("1")?, MIST_PER_SUI);
    assert_eq!(parse_sui("0.1")?, 100_000_000);
    assert_eq!(parse_sui(" 12.5 SUI ")?, 12_500_000_000);
    assert_eq!(parse_sui(".000000001")?, 1);
    assert_eq!(parse_sui("3.")?, 3 * MIST_PER_SUI);
    Ok(())
}

#[test]
fn rejects_malformed_display_amounts() {
    for input in ["", "-1", "abc", "1.2.3", ".", "0.0000000001", "1e9"] {
        assert!(
            matches!(parse_sui(input), Err(AmountError::InvalidInput(_))),
            "{input:?}"
        );
    }
    assert_eq!(parse_sui("18446744074"), Err(AmountError::TooLarge));
}
