// Mon Oct 19 2026 - Alex

use crate::pattern::PatternError;
use crate::utils;
use std::fmt;

/// Byte sequence plus a same-length mask; `true` marks a must-match byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    bytes: Vec<u8>,
    mask: Vec<bool>,
    name: Option<String>,
}

impl Pattern {
    pub fn new(bytes: Vec<u8>, mask: Vec<bool>) -> Result<Self, PatternError> {
        if bytes.is_empty() {
            return Err(PatternError::EmptyPattern);
        }
        if mask.is_empty() {
            return Err(PatternError::EmptyMask);
        }
        if bytes.len() != mask.len() {
            return Err(PatternError::LengthMismatch {
                bytes: bytes.len(),
                mask: mask.len(),
            });
        }
        Ok(Self {
            bytes,
            mask,
            name: None,
        })
    }

    /// Textual mask: `'x'` must match, anything else is a wildcard.
    pub fn from_mask_str(bytes: &[u8], mask: &str) -> Result<Self, PatternError> {
        Self::new(bytes.to_vec(), parse_mask(mask))
    }

    /// Hex-encoded bytes with a textual mask. The decoded length must equal the mask length.
    pub fn from_hex(hex: &str, mask: &str) -> Result<Self, PatternError> {
        let cleaned = utils::validate_hex_string(hex)
            .ok_or_else(|| PatternError::InvalidHex(hex.to_string()))?;
        let mask = parse_mask(mask);
        if mask.is_empty() {
            return Err(PatternError::EmptyMask);
        }
        if cleaned.len() != mask.len() * 2 {
            return Err(PatternError::LengthMismatch {
                bytes: cleaned.len() / 2,
                mask: mask.len(),
            });
        }
        let bytes = utils::data_from_hex(&cleaned).ok_or(PatternError::InvalidHex(cleaned))?;
        Self::new(bytes, mask)
    }

    /// Fixed data, every byte must match.
    pub fn from_data(data: &[u8]) -> Result<Self, PatternError> {
        Self::new(data.to_vec(), vec![true; data.len()])
    }

    /// IDA-style signature such as `"48 8B ?? ?? 89"`. `?` and `??` are wildcards.
    pub fn from_signature(signature: &str) -> Result<Self, PatternError> {
        let mut bytes = Vec::new();
        let mut mask = Vec::new();

        for token in signature.split_whitespace() {
            if token == "?" || token == "??" {
                bytes.push(0);
                mask.push(false);
                continue;
            }
            if token.len() != 2 {
                return Err(PatternError::InvalidToken(token.to_string()));
            }
            let byte = u8::from_str_radix(token, 16)
                .map_err(|_| PatternError::InvalidToken(token.to_string()))?;
            bytes.push(byte);
            mask.push(true);
        }

        Self::new(bytes, mask)
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Bytes consumed per match; equals the mask length.
    pub fn scan_size(&self) -> usize {
        self.mask.len()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    pub fn mask_string(&self) -> String {
        self.mask.iter().map(|&m| if m { 'x' } else { '?' }).collect()
    }

    pub fn matches_at(&self, data: &[u8], offset: usize) -> bool {
        let Some(window) = offset
            .checked_add(self.scan_size())
            .and_then(|end| data.get(offset..end))
        else {
            return false;
        };

        self.bytes
            .iter()
            .zip(self.mask.iter())
            .zip(window.iter())
            .all(|((pattern_byte, &significant), &data_byte)| !significant || *pattern_byte == data_byte)
    }

    /// Non-overlapping local offsets: after a hit at `o` the next candidate is `o + scan_size`.
    pub fn find_all_in(&self, data: &[u8]) -> Vec<usize> {
        let size = self.scan_size();
        let mut results = Vec::new();
        if size == 0 || data.len() < size {
            return results;
        }

        let mut offset = 0;
        while offset + size <= data.len() {
            if self.matches_at(data, offset) {
                results.push(offset);
                offset += size;
            } else {
                offset += 1;
            }
        }
        results
    }

    pub fn find_in(&self, data: &[u8]) -> Option<usize> {
        let size = self.scan_size();
        if size == 0 || data.len() < size {
            return None;
        }
        (0..=data.len() - size).find(|&offset| self.matches_at(data, offset))
    }

    pub fn significant_byte_count(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }

    pub fn to_hex_string(&self) -> String {
        self.bytes
            .iter()
            .zip(self.mask.iter())
            .map(|(b, &m)| if m { format!("{:02X}", b) } else { "??".to_string() })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref name) = self.name {
            write!(f, "{}: ", name)?;
        }
        write!(f, "{}", self.to_hex_string())
    }
}

fn parse_mask(mask: &str) -> Vec<bool> {
    mask.chars().map(|c| c == 'x').collect()
}
