//! Randomly drifting price

use rand::Rng;

/// Largest absolute move of a single tick
const MAX_STEP: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct PriceTicker {
    current: f64,
}

impl PriceTicker {
    pub const fn new(initial: f64) -> Self {
        Self { current: initial }
    }

    pub const fn current(&self) -> f64 {
        self.current
    }

    /// Move the price by a uniform step in `[-1, 1)` and return the new value
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        self.current += rng.random_range(-MAX_STEP..MAX_STEP);
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_steps_stay_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut ticker = PriceTicker::new(60.0);

        for _ in 0..1_000 {
            let before = ticker.current();
            let after = ticker.tick(&mut rng);
            let step = after - before;
            assert!(step.abs() <= 1.0 + 1e-9, "step {step} out of range");
            assert!((after - ticker.current()).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_same_seed_same_path() {
        let mut a = PriceTicker::new(60.0);
        let mut b = PriceTicker::new(60.0);
        let mut rng_a = StdRng::seed_from_u64(99);
        let mut rng_b = StdRng::seed_from_u64(99);

        for _ in 0..20 {
            assert!((a.tick(&mut rng_a) - b.tick(&mut rng_b)).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_ticks_move_the_price() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut ticker = PriceTicker::new(60.0);
        let moved = (0..10).any(|_| (ticker.tick(&mut rng) - 60.0).abs() > f64::EPSILON);
        assert!(moved);
    }
}
