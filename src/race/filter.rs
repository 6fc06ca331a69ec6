//! Candidate checks: the cheap worker-side plausibility filter and the
//! authoritative comparison the controller performs.

use super::types::{Candidate, Round};

/// Printable ASCII, space included (`0x20..=0x7E`)
#[inline]
pub fn is_printable_byte(byte: u8) -> bool {
    byte == b' ' || byte.is_ascii_graphic()
}

/// Worker-side plausibility filter: every byte is printable.
///
/// Necessary but not sufficient for a correct decryption. An empty buffer is
/// never plausible.
pub fn is_plausible(plaintext: &[u8]) -> bool {
    !plaintext.is_empty() && plaintext.iter().copied().all(is_printable_byte)
}

/// Authoritative check: the guess matches the round's plaintext byte for byte.
pub fn verify(candidate: &Candidate, round: &Round) -> bool {
    candidate.guessed_plaintext.len() == round.length()
        && candidate.guessed_plaintext == round.plaintext()
}
