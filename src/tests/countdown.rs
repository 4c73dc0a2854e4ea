use crate::countdown::*;

const NOW: u64 = 1_700_000_000_000;

#[test]
fn one_second_left() {
    let r = remaining(NOW + 1000, NOW);
    assert_eq!(
        (r.days, r.hours, r.minutes, r.seconds),
        (0, 0, 0, 1)
    );
    assert_eq!(r.urgency(), Urgency::Critical);
}

#[test]
fn past_deadline_clamps_to_zero() {
    let r = remaining(NOW - 1, NOW);
    assert_eq!(r, Remaining::default());
    assert_eq!(r.urgency(), Urgency::Ended);
    assert_eq!(format_compact(&r), "Ended");
}

#[test]
fn components_are_taken_from_remainders() {
    let total = 2 * DAY_MS + 3 * HOUR_MS + 4 * MINUTE_MS + 5 * SECOND_MS + 999;
    let r = remaining(NOW + total, NOW);
    assert_eq!((r.days, r.hours, r.minutes, r.seconds), (2, 3, 4, 5));
    assert_eq!(r.total_ms, total);
    assert_eq!(format_clock(&r), "02:03:04:05");
}

#[test]
fn urgency_boundaries_are_half_open() {
    assert_eq!(Urgency::of(0), Urgency::Ended);
    assert_eq!(Urgency::of(1), Urgency::Critical);
    assert_eq!(Urgency::of(5 * MINUTE_MS - 1), Urgency::Critical);
    assert_eq!(Urgency::of(5 * MINUTE_MS), Urgency::EndingSoon);
    assert_eq!(Urgency::of(HOUR_MS - 1), Urgency::EndingSoon);
    assert_eq!(Urgency::of(HOUR_MS), Urgency::Normal);
}

#[test]
fn compact_format_picks_the_two_largest_units() {
    assert_eq!(format_compact(&Remaining::from_ms(DAY_MS + 2 * HOUR_MS + 5)), "1d 2h");
    assert_eq!(format_compact(&Remaining::from_ms(3 * HOUR_MS + 7 * MINUTE_MS)), "3h 7m");
    assert_eq!(format_compact(&Remaining::from_ms(7 * MINUTE_MS + 59 * SECOND_MS)), "7m");
    assert_eq!(format_compact(&Remaining::from_ms(30 * SECOND_MS)), "0m");
}

#[test]
fn countdown_progresses_one_way_and_ends_once() {
    let mut countdown = Countdown::new(NOW + 2 * HOUR_MS);

    let states: Vec<_> = [
        NOW,
        NOW + HOUR_MS + 1,
        NOW + 2 * HOUR_MS - 5 * MINUTE_MS + 1,
        NOW + 2 * HOUR_MS,
        NOW + 3 * HOUR_MS,
    ]
    .into_iter()
    .map(|now| countdown.tick(now))
    .map(|t| (t.urgency, t.ended_now))
    .collect();

    assert_eq!(
        states,
        vec![
            (Urgency::Normal, false),
            (Urgency::EndingSoon, false),
            (Urgency::Critical, false),
            (Urgency::Ended, true),
            (Urgency::Ended, false),
        ]
    );
}

#[test]
fn countdown_ignores_clock_going_backwards() {
    let mut countdown = Countdown::new(NOW + 1000);
    assert!(countdown.tick(NOW + 1000).ended_now);

    let tick = countdown.tick(NOW);
    assert_eq!(tick.urgency, Urgency::Ended);
    assert!(!tick.ended_now);
}

#[test]
fn rearming_starts_over() {
    let mut countdown = Countdown::new(NOW);
    assert!(countdown.tick(NOW).ended_now);

    countdown.rearm(NOW + HOUR_MS);
    let tick = countdown.tick(NOW);
    assert_eq!(tick.urgency, Urgency::Normal);
    assert_eq!(countdown.deadline(), NOW + HOUR_MS);

    assert!(countdown.tick(NOW + HOUR_MS).ended_now);
}
