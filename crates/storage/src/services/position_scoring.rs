//! Points for a single predicted-vs-actual position pair.
//!
//! The rule table is evaluated top to bottom, first match wins:
//!
//! | rule                                   | points |
//! |----------------------------------------|--------|
//! | exact position                         | 10     |
//! | off by at most 3                       | 5      |
//! | off by at most 5                       | 2      |
//! | both in the same half of the table     | 1      |
//! | anything else                          | 0      |
//!
//! The upper half is `position <= floor(table_size / 2)`, so for odd-sized
//! leagues the middle team belongs to the lower half.

/// Bump when any constant below changes; history recorded under different
/// versions is not comparable.
pub const RULES_VERSION: u32 = 1;

pub const EXACT_POINTS: u32 = 10;
pub const NEAR_DISTANCE: u32 = 3;
pub const NEAR_POINTS: u32 = 5;
pub const CLOSE_DISTANCE: u32 = 5;
pub const CLOSE_POINTS: u32 = 2;
pub const SAME_HALF_POINTS: u32 = 1;
pub const MISS_POINTS: u32 = 0;

/// Highest score a single team line can earn.
pub const MAX_POINTS: u32 = EXACT_POINTS;

/// Last position that counts as the upper half of a `table_size` league.
pub fn upper_half_boundary(table_size: u32) -> u32 {
    table_size / 2
}

/// Scores one predicted position against the actual one.
///
/// # Panics
///
/// Panics when either position lies outside `1..=table_size`. Callers
/// validate predictions and snapshots before scoring, so an out-of-range
/// position here is a bug, not bad input.
pub fn score(predicted: u32, actual: u32, table_size: u32) -> u32 {
    assert!(
        (1..=table_size).contains(&predicted),
        "predicted position {predicted} outside 1..={table_size}"
    );
    assert!(
        (1..=table_size).contains(&actual),
        "actual position {actual} outside 1..={table_size}"
    );

    let distance = predicted.abs_diff(actual);
    let boundary = upper_half_boundary(table_size);

    if distance == 0 {
        EXACT_POINTS
    } else if distance <= NEAR_DISTANCE {
        NEAR_POINTS
    } else if distance <= CLOSE_DISTANCE {
        CLOSE_POINTS
    } else if (predicted <= boundary) == (actual <= boundary) {
        SAME_HALF_POINTS
    } else {
        MISS_POINTS
    }
}
