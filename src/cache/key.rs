//! Key Hasher
//!
//! Turns a call type and a (reduced) input string into a short, stable cache
//! key. Not a security primitive: collisions are tolerated.

use std::fmt;

use crate::models::CallType;

/// Typed view of a cache key: `(call type, input digest)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub call_type: CallType,
    pub digest: String,
}

impl CacheKey {
    /// Hashes `input` under `call_type`.
    pub fn new(call_type: CallType, input: &str) -> Self {
        Self {
            call_type,
            digest: digest(input),
        }
    }

    /// Parses a rendered key (`"{type}_{digest}"`) back into its parts.
    pub fn parse(raw: &str) -> Option<Self> {
        let (prefix, digest) = raw.split_once('_')?;
        if digest.is_empty() || !digest.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(Self {
            call_type: prefix.parse().ok()?,
            digest: digest.to_string(),
        })
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.call_type, self.digest)
    }
}

/// Renders the cache key string for `(call_type, input)`.
pub fn hash_input(call_type: CallType, input: &str) -> String {
    CacheKey::new(call_type, input).to_string()
}

/// 32-bit rolling hash (`h = h * 31 + unit`) over UTF-16 code units, base-36 rendered.
fn digest(input: &str) -> String {
    let hash = input
        .encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)));
    to_base36(hash.unsigned_abs())
}

fn to_base36(mut n: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
