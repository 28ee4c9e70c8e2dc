//! Token boost table.
//!
//! Each entry is the population growth multiplier of the best boost
//! combination a player can buy with that many tokens, written as
//! `(sum of tachyon prisms) x (sum of boost beacons)`. These are game balance
//! constants, not derived values; change the table, not the lookup.

/// Multiplier for token counts outside the table.
pub const BOOST_FLOOR: f64 = 50.0;

const BOOST_TABLE: [f64; 12] = [
    (4.0 * 10.0) * 2.0,                 // 1
    100.0 * 2.0,                        // 2
    (2.0 * 100.0) * 2.0,                // 3
    (5.0 * 100.0) * 2.0,                // 4
    (1000.0 + 2.0 * 10.0) * 2.0,        // 5
    (1000.0 + 2.0 * 10.0) * (2.0 + 2.0), // 6
    (1000.0 + 5.0 * 10.0) * (2.0 + 2.0), // 7
    (1000.0 + 100.0 + 2.0 * 10.0) * (2.0 + 2.0), // 8
    (1000.0 + 100.0 + 2.0 * 10.0) * 5.0, // 9
    (1000.0 + 2.0 * 10.0) * (5.0 + 2.0), // 10
    (1000.0 + 100.0 + 2.0 * 10.0) * (5.0 + 2.0), // 11
    (2000.0 + 2.0 * 10.0) * (5.0 + 2.0), // 12
];

/// Tokens actually spent, one fewer when a mirror boost is used.
pub fn boost_cost(tokens: u32, mirror: bool) -> u32 {
    if mirror {
        tokens.saturating_sub(1)
    } else {
        tokens
    }
}

/// Growth multiplier bought with `tokens`.
///
/// Example:
/// assert_eq!(boost_multiplier(6, false), 4080.0);
pub fn boost_multiplier(tokens: u32, mirror: bool) -> f64 {
    let effective = boost_cost(tokens, mirror) as usize;
    match effective {
        1..=12 => BOOST_TABLE[effective - 1],
        _ => BOOST_FLOOR,
    }
}
