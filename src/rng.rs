//! Deterministic random number generation.
//!
//! Every system draws from its own named ChaCha8 stream. A stream's seed is
//! mixed from the master seed and the stream name, so adding a system never
//! shifts the numbers another system sees.

use std::collections::HashMap;

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub struct RngManager {
    master_seed: u64,
    streams: HashMap<String, ChaCha8Rng>,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self {
            master_seed: seed,
            streams: HashMap::new(),
        }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn stream(&mut self, name: &str) -> SystemRng<'_> {
        let seed = derive_seed(self.master_seed, name);
        let entry = self
            .streams
            .entry(name.to_string())
            .or_insert_with(|| ChaCha8Rng::seed_from_u64(seed));
        SystemRng { inner: entry }
    }
}

impl Default for RngManager {
    fn default() -> Self {
        Self::new(42)
    }
}

fn derive_seed(master: u64, name: &str) -> u64 {
    // FNV-1a over the name, then an LCG round to mix in the master seed.
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in name.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    let mut seed = master;
    seed = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    seed ^= hash;
    seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407)
}

pub struct SystemRng<'a> {
    inner: &'a mut ChaCha8Rng,
}

impl<'a> RngCore for SystemRng<'a> {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}

/// Helpers for the draws the simulation needs beyond `Rng`.
pub trait RngExt {
    /// `true` with probability `p`.
    fn chance(&mut self, p: f64) -> bool;
    fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64;
    fn exponential(&mut self, mean: f64) -> f64;
    /// Gamma distribution with shape 2.
    fn gamma2(&mut self, scale: f64) -> f64;
}

impl<R: Rng + ?Sized> RngExt for R {
    fn chance(&mut self, p: f64) -> bool {
        self.gen::<f64>() < p
    }

    fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64 {
        // Box-Muller; 1 - u keeps the log argument away from zero.
        let u1 = 1.0 - self.gen::<f64>();
        let u2 = self.gen::<f64>();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn exponential(&mut self, mean: f64) -> f64 {
        -mean * (1.0 - self.gen::<f64>()).ln()
    }

    fn gamma2(&mut self, scale: f64) -> f64 {
        self.exponential(scale) + self.exponential(scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = RngManager::new(42);
        let mut b = RngManager::new(42);

        let x: f64 = a.stream("weather").gen();
        let y: f64 = b.stream("weather").gen();
        assert_eq!(x, y);
    }

    #[test]
    fn streams_are_independent_of_request_order() {
        let mut a = RngManager::new(7);
        let mut b = RngManager::new(7);

        let _: u64 = a.stream("weather").gen();
        let from_a: u64 = a.stream("farm").gen();
        let from_b: u64 = b.stream("farm").gen();
        assert_eq!(from_a, from_b);
    }

    #[test]
    fn different_streams_differ() {
        let mut rng = RngManager::new(42);
        let x: u64 = rng.stream("weather").gen();
        let y: u64 = rng.stream("farm").gen();
        assert_ne!(x, y);
    }

    #[test]
    fn stream_state_persists_between_borrows() {
        let mut rng = RngManager::new(1);
        let first: u64 = rng.stream("weather").gen();
        let second: u64 = rng.stream("weather").gen();
        assert_ne!(first, second);
    }

    #[test]
    fn chance_edges() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..100 {
            assert!(rng.chance(1.0));
            assert!(!rng.chance(0.0));
        }
    }

    #[test]
    fn sample_means_are_plausible() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let n = 20_000;
        let gauss = (0..n).map(|_| rng.gaussian(10.0, 2.0)).sum::<f64>() / n as f64;
        let expo = (0..n).map(|_| rng.exponential(5.0)).sum::<f64>() / n as f64;
        let gamma = (0..n).map(|_| rng.gamma2(1.5)).sum::<f64>() / n as f64;

        assert!((gauss - 10.0).abs() < 0.1, "gaussian mean {gauss}");
        assert!((expo - 5.0).abs() < 0.2, "exponential mean {expo}");
        assert!((gamma - 3.0).abs() < 0.1, "gamma mean {gamma}");
    }
}
