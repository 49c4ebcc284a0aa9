//! Bearer token generation and parsing.
//!
//! Issued tokens have the shape `<prefix><lookup_key>.<secret>`. The lookup
//! key is public and narrows authentication to a single row; only the
//! secret is hashed. Tokens without a `.` are legacy secrets with no key.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Random bytes in a lookup key (16 base64 characters).
const LOOKUP_KEY_BYTES: usize = 12;
/// Random bytes in a secret (43 base64 characters).
const SECRET_BYTES: usize = 32;
/// Separator between lookup key and secret.
const SEPARATOR: char = '.';

/// Freshly generated token material. The raw token is shown exactly once.
#[derive(Clone)]
pub struct IssuedToken {
    /// Full bearer value handed to the agent.
    pub raw: String,
    /// Public lookup key, stored in clear.
    pub lookup_key: String,
    /// Secret part, stored only as a digest.
    pub secret: String,
}

impl std::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedToken")
            .field("lookup_key", &self.lookup_key)
            .finish_non_exhaustive()
    }
}

/// A bearer value split into its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedToken<'a> {
    /// Lookup key, absent for legacy tokens.
    pub lookup_key: Option<&'a str>,
    /// Secret to verify against the stored digest.
    pub secret: &'a str,
}

/// Generates and parses prefixed bearer tokens.
#[derive(Debug, Clone)]
pub struct TokenGenerator {
    prefix: String,
}

impl TokenGenerator {
    /// Create a generator for the given prefix (e.g. `ext_`).
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Generate a new token from the operating system RNG.
    pub fn generate(&self) -> IssuedToken {
        let lookup_key = URL_SAFE_NO_PAD.encode(rand::random::<[u8; LOOKUP_KEY_BYTES]>());
        let secret = URL_SAFE_NO_PAD.encode(rand::random::<[u8; SECRET_BYTES]>());
        let raw = format!("{}{lookup_key}{SEPARATOR}{secret}", self.prefix);
        IssuedToken {
            raw,
            lookup_key,
            secret,
        }
    }

    /// Split a raw bearer value.
    ///
    /// The prefix is stripped when present but not required. Returns `None`
    /// when nothing usable remains.
    pub fn parse<'a>(&self, raw: &'a str) -> Option<ParsedToken<'a>> {
        let raw = raw.trim();
        let body = raw.strip_prefix(self.prefix.as_str()).unwrap_or(raw);
        if body.is_empty() {
            return None;
        }
        match body.split_once(SEPARATOR) {
            Some((key, secret)) if !key.is_empty() && !secret.is_empty() => Some(ParsedToken {
                lookup_key: Some(key),
                secret,
            }),
            Some(_) => None,
            None => Some(ParsedToken {
                lookup_key: None,
                secret: body,
            }),
        }
    }
}
