//! Cipher oracle
//!
//! The race treats the cipher as an opaque capability: it can encrypt, it can
//! attempt a decryption that may fail, and it is the source of randomness for
//! keys and plaintexts. [`XorOracle`] is the implementation the CLI ships with;
//! tests plug in their own.

mod xor;

pub use xor::XorOracle;

/// Encrypt/decrypt capability consumed by the controller and the workers.
pub trait CipherOracle: Send + Sync {
    fn encrypt(&self, plaintext: &[u8], key: &[u8]) -> Vec<u8>;

    /// `None` means the oracle rejected the attempt.
    fn decrypt(&self, ciphertext: &[u8], key: &[u8]) -> Option<Vec<u8>>;

    fn fill_random(&self, buf: &mut [u8]);

    fn random_bytes(&self, n: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; n];
        self.fill_random(&mut bytes);
        bytes
    }

    /// Decrypt into a caller-owned buffer, returning `false` on failure.
    ///
    /// Workers call this once per trial; implementations that can decrypt in
    /// place should override it.
    fn decrypt_into(&self, ciphertext: &[u8], key: &[u8], out: &mut Vec<u8>) -> bool {
        match self.decrypt(ciphertext, key) {
            Some(plaintext) => {
                *out = plaintext;
                true
            }
            None => false,
        }
    }
}
