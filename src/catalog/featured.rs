//! Weekly featured sample.
//!
//! The featured sample changes once a week and is the same for every build
//! within that week: the random generator is seeded from the week number and
//! year of the build date.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::constants::FEATURED_SEED_OFFSET;

/// Seed for the week containing `now`.
///
/// The decimal digits of the Sunday-based week number (`%U`) followed by the
/// year (`%Y`), plus a fixed offset. Week 5 of 2024 gives `52024 + 5`.
pub fn weekly_seed(now: DateTime<Utc>) -> u64 {
    let digits = now.format("%U%Y").to_string();
    // %U%Y is always all digits.
    digits.parse::<u64>().unwrap_or(0) + FEATURED_SEED_OFFSET
}

/// Pick one item with a generator seeded by `seed`. `None` for an empty slice.
pub fn choose<T>(items: &[T], seed: u64) -> Option<&T> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    items.choose(&mut rng)
}
