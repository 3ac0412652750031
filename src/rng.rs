//! Seedable randomness shared by all random transforms.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

/// Random number generator with optional seeding for reproducibility.
#[allow(clippy::option_if_let_else)] // match is clearer than map_or_else here
pub(crate) fn get_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Sample a zero-mean normal truncated to `[-std, std]`.
///
/// Draws from the standard normal and rejects values outside `[-1, 1]` before
/// scaling, so the result has the shape of a truncated normal with bounds at
/// one standard deviation. Acceptance rate is about 68%.
pub fn truncated_normal<R: Rng + ?Sized>(rng: &mut R, std: f64) -> f64 {
    loop {
        let z: f64 = rng.sample(StandardNormal);
        if (-1.0..=1.0).contains(&z) {
            return z * std;
        }
    }
}
