use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::sync::{Mutex, PoisonError};

use super::CipherOracle;

/// Repeating-key XOR cipher.
///
/// Randomness comes from the thread-local generator, or from a seeded
/// [`StdRng`] when built with [`XorOracle::seeded`] so round secrets can be
/// replayed. Only the controller draws from it; workers carry their own key
/// generators.
#[derive(Default)]
pub struct XorOracle {
    seeded: Option<Mutex<StdRng>>,
}

impl XorOracle {
    pub fn new() -> Self {
        Self { seeded: None }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            seeded: Some(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    pub fn is_seeded(&self) -> bool {
        self.seeded.is_some()
    }

    fn apply(input: &[u8], key: &[u8], out: &mut Vec<u8>) {
        out.clear();
        out.extend(input.iter().zip(key.iter().cycle()).map(|(b, k)| b ^ k));
    }
}

impl CipherOracle for XorOracle {
    fn encrypt(&self, plaintext: &[u8], key: &[u8]) -> Vec<u8> {
        if key.is_empty() {
            return plaintext.to_vec();
        }
        let mut ciphertext = Vec::with_capacity(plaintext.len());
        Self::apply(plaintext, key, &mut ciphertext);
        ciphertext
    }

    fn decrypt(&self, ciphertext: &[u8], key: &[u8]) -> Option<Vec<u8>> {
        let mut plaintext = Vec::with_capacity(ciphertext.len());
        self.decrypt_into(ciphertext, key, &mut plaintext)
            .then_some(plaintext)
    }

    fn decrypt_into(&self, ciphertext: &[u8], key: &[u8], out: &mut Vec<u8>) -> bool {
        if key.is_empty() || key.len() > ciphertext.len() {
            return false;
        }
        Self::apply(ciphertext, key, out);
        true
    }

    fn fill_random(&self, buf: &mut [u8]) {
        match &self.seeded {
            Some(rng) => rng
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .fill_bytes(buf),
            None => rand::thread_rng().fill_bytes(buf),
        }
    }
}
