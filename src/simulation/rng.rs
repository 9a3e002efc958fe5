//! Deterministic random substreams
//!
//! Every phase of every day draws from its own ChaCha stream keyed off the
//! master seed, so the order in which metros are processed (or whether they
//! run on several threads) never changes a draw.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::types::Day;

/// Which movement phase a stream belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    IntraMetro,
    InterMetro,
}

impl Phase {
    fn tag(self) -> u64 {
        match self {
            Phase::IntraMetro => 1,
            Phase::InterMetro => 2,
        }
    }
}

/// The stream for (`phase`, `day`, `key`) under `seed`
pub fn substream(seed: u64, phase: Phase, day: Day, key: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(stream_id(phase, day, key));
    rng
}

fn stream_id(phase: Phase, day: Day, key: u64) -> u64 {
    mix64(mix64(mix64(phase.tag()) ^ day as u64) ^ key)
}

/// SplitMix64 finalizer
fn mix64(value: u64) -> u64 {
    let mut z = value.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
