use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};

use crate::models::SeedMode;

/// Exclusive upper bound of every seed handed to the model (31 bits).
pub const SEED_LIMIT: u32 = 0x8000_0000;

/// Draw a non-negative 31-bit seed.
pub fn draw_seed(rng: &mut dyn RngCore) -> u32 {
    rng.gen_range(0..SEED_LIMIT)
}

/// Hands out one seed per unit according to the batch's seed mode.
pub struct SeedAllocator {
    mode: SeedMode,
    base_seed: u32,
    rng: Box<dyn RngCore + Send>,
}

impl SeedAllocator {
    pub fn new(mode: SeedMode, base_seed: Option<u32>) -> Self {
        Self::with_rng(mode, base_seed, Box::new(StdRng::from_entropy()))
    }

    /// Build with an explicit randomness source. When `base_seed` is absent it is drawn here.
    pub fn with_rng(
        mode: SeedMode,
        base_seed: Option<u32>,
        mut rng: Box<dyn RngCore + Send>,
    ) -> Self {
        let base_seed = match base_seed {
            Some(seed) => seed.min(SEED_LIMIT - 1),
            None => draw_seed(rng.as_mut()),
        };
        Self {
            mode,
            base_seed,
            rng,
        }
    }

    pub fn mode(&self) -> SeedMode {
        self.mode
    }

    pub fn base_seed(&self) -> u32 {
        self.base_seed
    }

    pub fn next_seed(&mut self) -> u32 {
        match self.mode {
            SeedMode::Single => self.base_seed,
            SeedMode::PerUnit => draw_seed(self.rng.as_mut()),
        }
    }
}
