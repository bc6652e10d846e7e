use std::fmt;

use crate::SignatureError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternByte {
    Exact(u8),
    /// Matches any byte
    Any,
}

impl PatternByte {
    pub fn matches(&self, byte: u8) -> bool {
        match self {
            PatternByte::Exact(expected) => *expected == byte,
            PatternByte::Any => true,
        }
    }
}

impl fmt::Display for PatternByte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternByte::Exact(b) => write!(f, "{b:02X}"),
            PatternByte::Any => f.write_str("??"),
        }
    }
}

/// A fixed-length byte pattern with don't-care positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    bytes: Vec<PatternByte>,
}

impl Pattern {
    pub fn new(bytes: Vec<PatternByte>) -> Result<Self, SignatureError> {
        if bytes.is_empty() {
            return Err(SignatureError::Empty);
        }

        Ok(Self { bytes })
    }

    /// Parses a whitespace separated hex pattern. `?` and `??` mark wildcards,
    /// e.g. `"00 00 F0 44 ?? ?? 00 00 96 44"`.
    pub fn parse(pattern: &str) -> Result<Self, SignatureError> {
        let bytes = pattern.split_whitespace()
            .enumerate()
            .map(|(position, token)| match token {
                "?" | "??" => Ok(PatternByte::Any),
                _ => parse_hex_byte(position, token).map(PatternByte::Exact),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn bytes(&self) -> &[PatternByte] {
        &self.bytes
    }

    pub fn matches(&self, window: &[u8]) -> bool {
        matches(window, &self.bytes)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens = self.bytes.iter()
            .map(PatternByte::to_string)
            .collect::<Vec<_>>();

        f.write_str(&tokens.join(" "))
    }
}

/// Tests a window of concrete bytes against a pattern. Windows of a different
/// length than the pattern never match.
pub fn matches(window: &[u8], pattern: &[PatternByte]) -> bool {
    window.len() == pattern.len()
        && window.iter()
            .zip(pattern)
            .all(|(byte, expected)| expected.matches(*byte))
}

pub(crate) fn parse_hex_byte(position: usize, token: &str) -> Result<u8, SignatureError> {
    let digits = token.strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);

    if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(SignatureError::InvalidByte { position, token: token.to_string() });
    }

    u8::from_str_radix(digits, 16)
        .map_err(|_| SignatureError::InvalidByte { position, token: token.to_string() })
}
