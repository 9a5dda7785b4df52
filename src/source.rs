// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Polymer SSA Suite - Random Streams
//
// The simulator never touches a platform RNG. Every draw flows through an
// EventSource handed in by the caller, so runs are reproducible from a seed.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::Exp1;

/// Source of the two variates an SSA step consumes.
///
/// Any [`rand::Rng`] is an `EventSource`; tests can script exact draw
/// sequences by implementing the trait on their own type.
pub trait EventSource {
    /// Waiting time until the next event of a Poisson process with rate
    /// `total_rate` (exponential, mean `1 / total_rate`).
    fn waiting_time(&mut self, total_rate: f64) -> f64;

    /// Uniform variate in `[0, 1)` used to pick the firing event.
    fn uniform(&mut self) -> f64;
}

impl<R: Rng> EventSource for R {
    fn waiting_time(&mut self, total_rate: f64) -> f64 {
        let unit: f64 = self.sample(Exp1);
        unit / total_rate
    }

    fn uniform(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Shared ChaCha8 generator for a whole ensemble.
pub fn seeded(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Independent stream for path `index` of the ensemble seeded with `seed`.
///
/// ChaCha streams with the same key never overlap, so path `i` sees the same
/// draws however many paths run before it.
pub fn path_stream(seed: u64, index: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(index);
    rng
}
