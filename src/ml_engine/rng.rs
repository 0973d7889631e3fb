//! Park-Miller linear congruential generator.
//!
//! The trainer's seeded initialization must be bit-identical across runs
//! and across reimplementations, so the recurrence is fixed:
//! `value = value * 16807 mod 2147483647`, draws mapped to `[0, 1)` as
//! `(value - 1) / 2147483646`. State is an explicit struct constructed once
//! per training run; there is no hidden global RNG.

const MODULUS: i64 = 2_147_483_647;
const MULTIPLIER: i64 = 16_807;

/// Minimal-standard LCG with i64 state. All intermediates stay well inside
/// the exactly-representable integer range.
#[derive(Debug, Clone)]
pub struct Lcg {
    value: i64,
}

impl Lcg {
    /// Seed the generator, folding the seed into `(0, MODULUS)`.
    pub fn new(seed: i64) -> Self {
        let mut value = seed % MODULUS;
        if value <= 0 {
            value += MODULUS - 1;
        }
        Self { value }
    }

    /// Next draw in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.value = (self.value * MULTIPLIER) % MODULUS;
        (self.value - 1) as f64 / (MODULUS - 1) as f64
    }

    /// Next index in `0..len`.
    pub fn next_index(&mut self, len: usize) -> usize {
        (self.next_f64() * len as f64) as usize
    }
}
