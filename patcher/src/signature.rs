use crate::pattern::{parse_hex_byte, Pattern};
use crate::SignatureError;

pub const DEFAULT_TARGET: &str = "Terraria.exe";

// Max zoom dimensions as little endian f32s, separated by six bytes we don't
// care about.
//   00 00 F0 44    1920.0
//   00 00 96 44    1200.0
pub const ZOOM_LIMIT_PATTERN: &str = concat!(
    "00 00 F0 44 ",
    "?? ?? ?? ?? ?? ?? ",
    "00 00 96 44",
);

// Raises the exponent byte of both dimensions so the cap is effectively gone.
pub const ZOOM_LIMIT_MASK: &str = concat!(
    "00 00 00 55 ",
    "00 00 00 00 00 00 ",
    "00 00 00 55",
);

/// Bytes OR'd into a matched window. A `00` leaves the original byte alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementMask {
    bytes: Vec<u8>,
}

impl ReplacementMask {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn parse(mask: &str) -> Result<Self, SignatureError> {
        let bytes = mask.split_whitespace()
            .enumerate()
            .map(|(position, token)| match token {
                "?" | "??" => Err(SignatureError::WildcardInMask(position)),
                _ => parse_hex_byte(position, token),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn apply(&self, window: &[u8]) -> Vec<u8> {
        window.iter()
            .zip(&self.bytes)
            .map(|(original, mask)| original | mask)
            .collect()
    }
}

/// What to look for and how to rewrite it. Pattern and mask always have the
/// same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pattern: Pattern,
    mask: ReplacementMask,
}

impl Signature {
    pub fn new(pattern: Pattern, mask: ReplacementMask) -> Result<Self, SignatureError> {
        if pattern.len() != mask.len() {
            return Err(SignatureError::LengthMismatch {
                pattern: pattern.len(),
                mask: mask.len(),
            });
        }

        Ok(Self { pattern, mask })
    }

    pub fn parse(pattern: &str, mask: &str) -> Result<Self, SignatureError> {
        Self::new(Pattern::parse(pattern)?, ReplacementMask::parse(mask)?)
    }

    pub fn zoom_limits() -> Result<Self, SignatureError> {
        Self::parse(ZOOM_LIMIT_PATTERN, ZOOM_LIMIT_MASK)
    }

    pub fn len(&self) -> usize {
        self.pattern.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn mask(&self) -> &ReplacementMask {
        &self.mask
    }

    pub fn matches(&self, window: &[u8]) -> bool {
        self.pattern.matches(window)
    }

    pub fn replacement(&self, window: &[u8]) -> Vec<u8> {
        self.mask.apply(window)
    }
}
