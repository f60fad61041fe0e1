// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Seeded random numbers.
use rand::RngCore;

/// A 64 bits linear congruential generator.
///
/// Used where equity estimates must be reproducible for a given seed, it uses
/// Knuth's MMIX constants and only returns the high bits of the state as the
/// low bits of a power of two LCG have short periods.
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    const MULTIPLIER: u64 = 6_364_136_223_846_793_005;
    const INCREMENT: u64 = 1_442_695_040_888_963_407;

    /// Creates a new generator from a seed.
    pub fn new(seed: u64) -> Self {
        let mut lcg = Self { state: seed };
        lcg.step();
        lcg
    }

    #[inline]
    fn step(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
        self.state
    }
}

impl RngCore for Lcg {
    fn next_u32(&mut self) -> u32 {
        (self.step() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.next_u32() as u64;
        let lo = self.next_u32() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn same_seed_same_sequence() {
        let mut r1 = Lcg::new(42);
        let mut r2 = Lcg::new(42);
        for _ in 0..100 {
            assert_eq!(r1.next_u64(), r2.next_u64());
        }

        let mut r3 = Lcg::new(43);
        let v1 = (0..8).map(|_| r1.next_u32()).collect::<Vec<_>>();
        let v3 = (0..8).map(|_| r3.next_u32()).collect::<Vec<_>>();
        assert_ne!(v1, v3);
    }

    #[test]
    fn uniform_ranges() {
        let mut rng = Lcg::new(7);
        let mut counts = [0usize; 10];
        for _ in 0..100_000 {
            counts[rng.random_range(0..10usize)] += 1;
        }

        // Each bucket should be close to 10k.
        assert!(counts.iter().all(|&c| (9_500..10_500).contains(&c)));
    }

    #[test]
    fn fill_bytes_partial_chunk() {
        let mut rng = Lcg::new(1);
        let mut buf = [0u8; 7];
        rng.fill_bytes(&mut buf);
        assert!(buf.iter().any(|&b| b != 0));
    }
}
