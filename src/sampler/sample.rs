use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{Error, Result};
use crate::store::Table;

/// Keep each row with probability `fraction`.
///
/// One uniform draw per row, in row order, from a ChaCha8 generator seeded
/// with `seed`; a row survives when its draw is below `fraction`. ChaCha8
/// output does not change between library releases, so a seed names the same
/// rows everywhere. The draws do not depend on `fraction`, so for the same
/// input a larger fraction keeps a superset of the rows a smaller one keeps.
/// `1.0` keeps everything and `0.0` keeps nothing.
pub fn sample_fraction(mut table: Table, fraction: f64, seed: u64) -> Table {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    table.rows.retain(|_| rng.gen::<f64>() < fraction);
    table
}

/// Reject fractions outside `[0, 1]` (and NaN)
pub fn check_fraction(name: &'static str, value: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(Error::InvalidFraction { name, value })
    }
}
