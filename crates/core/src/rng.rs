//! RNG module - uniform random piece generation
//!
//! Every draw picks one of the seven kinds uniformly, with replacement. There
//! is no bag: the same kind can come up any number of times in a row.
//!
//! Also provides a simple LCG so seeded sessions replay identically, and a
//! scripted generator for fixtures and tests.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::PieceKind;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Seed from the wall clock (sub-second nanos mixed with seconds).
    pub fn from_clock() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| (d.as_secs() as u32) ^ d.subsec_nanos())
            .unwrap_or(1);
        Self::new(seed)
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Uses the high bits; the low bits of an LCG cycle with short periods.
    pub fn next_range(&mut self, max: u32) -> u32 {
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    /// Current internal state (usable as a seed to replay from here)
    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Source of the next falling piece kind
#[derive(Debug, Clone)]
pub enum PieceGenerator {
    /// Uniform draw with replacement
    Uniform(SimpleRng),
    /// Fixed sequence that repeats once exhausted
    Scripted { kinds: Vec<PieceKind>, next: usize },
}

impl PieceGenerator {
    pub fn uniform(seed: u32) -> Self {
        PieceGenerator::Uniform(SimpleRng::new(seed))
    }

    pub fn from_clock() -> Self {
        PieceGenerator::Uniform(SimpleRng::from_clock())
    }

    /// Cycle through `kinds` in order. An empty list falls back to `O`.
    pub fn scripted(kinds: Vec<PieceKind>) -> Self {
        PieceGenerator::Scripted { kinds, next: 0 }
    }

    /// Draw the next piece kind
    pub fn draw(&mut self) -> PieceKind {
        match self {
            PieceGenerator::Uniform(rng) => {
                PieceKind::ALL[rng.next_range(PieceKind::ALL.len() as u32) as usize]
            }
            PieceGenerator::Scripted { kinds, next } => {
                if kinds.is_empty() {
                    return PieceKind::O;
                }
                let kind = kinds[*next % kinds.len()];
                *next = (*next + 1) % kinds.len();
                kind
            }
        }
    }
}

impl Default for PieceGenerator {
    fn default() -> Self {
        Self::uniform(1)
    }
}
