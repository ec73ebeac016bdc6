//! Family identity shared by a founder and all of its descendants.

use rand::Rng;
use serde::{Deserialize, Serialize};

const VOWELS: &[u8] = b"aeiou";
const CONSONANTS: &[u8] = b"bcdfghjklmnpqrstvwxyz";

/// Family color and name, copied verbatim into every child
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Family {
    pub color: [u8; 3],
    pub name: String,
}

impl Family {
    /// Fresh family for a founder
    pub fn random<R: Rng + ?Sized>(name_length: usize, rng: &mut R) -> Self {
        Self {
            color: [rng.gen(), rng.gen(), rng.gen()],
            name: generate_name(name_length, rng),
        }
    }
}

/// Pronounceable-ish name: each letter is a coin flip between a
/// consonant and a vowel.
pub fn generate_name<R: Rng + ?Sized>(length: usize, rng: &mut R) -> String {
    (0..length)
        .map(|_| {
            let pool = if rng.gen_bool(0.5) { CONSONANTS } else { VOWELS };
            pool[rng.gen_range(0..pool.len())] as char
        })
        .collect()
}
