//! Deterministic random rolls for combat and content resolution.
//!
//! Every roll is a pure function of a seed. The seed is derived from the
//! session seed, the event nonce and the acting entity, so replaying the same
//! events against the same level reproduces the same outcomes.

/// Source of deterministic random numbers.
pub trait RngOracle: Send + Sync {
    /// Generates a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Rolls a d100 (1-100 inclusive).
    fn roll_d100(&self, seed: u64) -> u32 {
        (self.next_u32(seed) % 100) + 1
    }

    /// Picks an index in `0..len`. Returns 0 when `len` is 0.
    fn pick(&self, seed: u64, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.next_u32(seed) as usize % len
    }
}

/// PCG-XSH-RR generator: 64-bit state, 32-bit output.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::output(Self::step(seed))
    }
}

/// Mixes the session seed with per-roll context into a single seed.
///
/// `salt` separates independent rolls made for the same event, e.g. the spawn
/// index while resolving several random enemies of one level.
pub fn compute_seed(session_seed: u64, nonce: u64, subject: u32, salt: u32) -> u64 {
    let mut hash = session_seed;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (subject as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (salt as u64).wrapping_mul(0x85ebca6b);

    // murmur3 finalizer
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}
