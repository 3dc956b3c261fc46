//! Human-friendly pet identifiers such as `GF123`.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Letters usable in a short ID. `I` and `O` are left out so IDs can be read
/// back from a printed code without confusing them with digits.
pub const SHORT_ID_LETTERS: &[u8; 24] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
pub const SHORT_ID_NUMBER_MIN: u16 = 100;
pub const SHORT_ID_NUMBER_MAX: u16 = 999;
/// Allocation attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

/// Errors produced while parsing a short ID.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShortIdError {
    #[error("short id must be 5 characters, got {0}")]
    Length(usize),

    #[error("invalid short id letter '{0}'")]
    Letter(char),

    #[error("invalid short id number '{0}'")]
    Number(String),
}

/// Errors produced while allocating a fresh short ID.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("Could not generate unique short ID after {attempts} attempts")]
    Exhausted { attempts: usize },
}

/// Two letters followed by a number in `100..=999`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShortId {
    letters: [u8; 2],
    number: u16,
}

impl ShortId {
    /// Parse a short ID. Letters are accepted in either case.
    pub fn parse(input: &str) -> Result<Self, ShortIdError> {
        let input = input.trim();
        let chars: Vec<char> = input.chars().collect();
        if chars.len() != 5 {
            return Err(ShortIdError::Length(chars.len()));
        }

        let mut letters = [0u8; 2];
        for (slot, ch) in letters.iter_mut().zip(&chars[..2]) {
            let upper = ch.to_ascii_uppercase();
            if !upper.is_ascii() || !SHORT_ID_LETTERS.contains(&(upper as u8)) {
                return Err(ShortIdError::Letter(*ch));
            }
            *slot = upper as u8;
        }

        let digits: String = chars[2..].iter().collect();
        let number = digits
            .parse::<u16>()
            .ok()
            .filter(|_| digits.bytes().all(|b| b.is_ascii_digit()))
            .filter(|n| (SHORT_ID_NUMBER_MIN..=SHORT_ID_NUMBER_MAX).contains(n))
            .ok_or(ShortIdError::Number(digits))?;

        Ok(Self { letters, number })
    }

    /// A uniformly random candidate. Uniqueness is the allocator's job.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let first = SHORT_ID_LETTERS[rng.gen_range(0..SHORT_ID_LETTERS.len())];
        let second = SHORT_ID_LETTERS[rng.gen_range(0..SHORT_ID_LETTERS.len())];
        let number = rng.gen_range(SHORT_ID_NUMBER_MIN..=SHORT_ID_NUMBER_MAX);
        Self {
            letters: [first, second],
            number,
        }
    }

    pub fn number(&self) -> u16 {
        self.number
    }
}

impl fmt::Display for ShortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.letters[0] as char, self.letters[1] as char, self.number
        )
    }
}

impl FromStr for ShortId {
    type Err = ShortIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ShortId {
    type Error = ShortIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ShortId> for String {
    fn from(value: ShortId) -> Self {
        value.to_string()
    }
}

/// Lookup of short IDs already taken within one owner's collection.
pub trait ShortIdRegistry {
    fn is_taken(&self, id: &ShortId) -> bool;
}

impl ShortIdRegistry for HashSet<ShortId> {
    fn is_taken(&self, id: &ShortId) -> bool {
        self.contains(id)
    }
}

impl ShortIdRegistry for [crate::record::PetRecord] {
    fn is_taken(&self, id: &ShortId) -> bool {
        self.iter().any(|record| record.short_id.as_ref() == Some(id))
    }
}

/// Draw candidates until one is free, for at most `max_attempts` draws.
pub fn allocate_short_id<R, G>(
    rng: &mut R,
    registry: &G,
    max_attempts: usize,
) -> Result<ShortId, AllocationError>
where
    R: Rng + ?Sized,
    G: ShortIdRegistry + ?Sized,
{
    for attempt in 1..=max_attempts {
        let candidate = ShortId::generate(rng);
        if !registry.is_taken(&candidate) {
            return Ok(candidate);
        }
        log::debug!("short id {candidate} taken (attempt {attempt}/{max_attempts})");
    }
    log::warn!("short id allocation exhausted after {max_attempts} attempts");
    Err(AllocationError::Exhausted {
        attempts: max_attempts,
    })
}
