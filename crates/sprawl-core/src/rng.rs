//! Deterministic PRNG consulted once, while the template catalog is built.
//!
//! Uses the mulberry32 algorithm: 4 bytes of state and identical output on
//! every platform for a given seed.

/// mulberry32 pseudo-random number generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimRng {
    state: u32,
}

impl SimRng {
    /// Create a new RNG. Only the low 32 bits of `seed` are used.
    pub fn new(seed: u64) -> Self {
        Self { state: seed as u32 }
    }

    /// Generate the next `u32` in the sequence.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let t = self.state;
        let mut r = (t ^ (t >> 15)).wrapping_mul(t | 1);
        r ^= r.wrapping_add((r ^ (r >> 7)).wrapping_mul(r | 61));
        r ^ (r >> 14)
    }

    /// Uniform `f64` in `[0, 1)`: the next output divided by 2^32.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }

    /// Uniform `f64` in `[low, low + span)`.
    pub fn next_in(&mut self, low: f64, span: f64) -> f64 {
        low + self.next_f64() * span
    }

    /// Get the internal state.
    pub fn state(&self) -> u32 {
        self.state
    }
}
