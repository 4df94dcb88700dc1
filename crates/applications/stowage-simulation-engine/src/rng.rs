//! Per-run random number streams
//!
//! Every run draws from its own ChaCha8 stream derived from the batch seed, so
//! runs never share generator state and any run can be replayed on its own:
//! the same `(seed, simulation)` pair always yields the same sequence.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Generator used by the engine and the departure policies
pub type SimRng = ChaCha8Rng;

/// Stream for one run of a batch seeded with `seed`
pub fn run_rng(seed: u64, simulation: usize) -> SimRng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(simulation as u64);
    rng
}

/// Fresh batch seed from entropy
pub fn entropy_seed() -> u64 {
    rand::random()
}
