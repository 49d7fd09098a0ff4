use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::info;

/// Upper bound (exclusive) of freshly drawn seeds. Seeds travel in the marker
/// header, so they are kept small.
pub const SEED_RANGE: u64 = 200;

/// Seeded source of per-trial stimulus orders.
///
/// The whole run replays from the logged seed: the first permutation after
/// seeding is fixed, later ones continue the same generator stream.
#[derive(Debug, Clone)]
pub struct RandomSequencer {
    seed: u64,
    rng: StdRng,
    sequence: Vec<usize>,
}

impl Default for RandomSequencer {
    fn default() -> Self {
        Self::with_seed(0)
    }
}

impl RandomSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
            sequence: Vec::new(),
        }
    }

    /// Draws a fresh seed from the thread generator and reseeds.
    pub fn randomize_seed(&mut self) -> u64 {
        let seed = rand::rng().random_range(0..SEED_RANGE);
        self.set_seed(seed);
        seed
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = StdRng::seed_from_u64(seed);
        info!(seed, "random seed set");
    }

    /// Uniform permutation of `0..n`. `n == 0` gives an empty sequence.
    pub fn randomize_sequence(&mut self, n: usize) -> &[usize] {
        self.sequence.clear();
        self.sequence.extend(0..n);
        self.sequence.shuffle(&mut self.rng);
        &self.sequence
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn sequence(&self) -> &[usize] {
        &self.sequence
    }

    pub fn get(&self, index: usize) -> Option<usize> {
        self.sequence.get(index).copied()
    }
}
