// Mon Oct 19 2026 - Alex

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Absolute address inside the remote process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address {
    value: u64,
}

impl Address {
    pub const fn new(value: u64) -> Self {
        Self { value }
    }

    pub const fn zero() -> Self {
        Self { value: 0 }
    }

    pub const fn as_u64(&self) -> u64 {
        self.value
    }

    pub const fn is_null(&self) -> bool {
        self.value == 0
    }

    pub fn checked_add(&self, rhs: u64) -> Option<Self> {
        self.value.checked_add(rhs).map(Self::new)
    }

    pub fn page_start(&self, page_size: u64) -> Self {
        Self::new(crate::utils::page_start(self.value, page_size))
    }

    pub fn page_end(&self, page_size: u64) -> Self {
        Self::new(crate::utils::page_end(self.value, page_size))
    }

    /// Distance from `base` when `self` lies at or above it.
    pub fn offset_from(&self, base: Address) -> Option<u64> {
        self.value.checked_sub(base.value)
    }

    pub fn is_within_range(&self, start: Self, end: Self) -> bool {
        self.value >= start.value && self.value < end.value
    }

    /// Parses `0x`-prefixed hex or plain decimal.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let value = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16).ok()?,
            None => text.replace('_', "").parse::<u64>().ok()?,
        };
        Some(Self::new(value))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.value)
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.value, f)
    }
}

impl fmt::UpperHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.value, f)
    }
}

impl Add<u64> for Address {
    type Output = Self;
    fn add(self, rhs: u64) -> Self::Output {
        Self { value: self.value.wrapping_add(rhs) }
    }
}

impl Sub<u64> for Address {
    type Output = Self;
    fn sub(self, rhs: u64) -> Self::Output {
        Self { value: self.value.wrapping_sub(rhs) }
    }
}

impl From<u64> for Address {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl From<Address> for u64 {
    fn from(addr: Address) -> Self {
        addr.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_and_decimal() {
        assert_eq!(Address::parse("0x7000_0000"), Some(Address::new(0x7000_0000)));
        assert_eq!(Address::parse("4096"), Some(Address::new(4096)));
        assert_eq!(Address::parse("0xZZ"), None);
        assert_eq!(Address::parse(""), None);
    }

    #[test]
    fn test_page_alignment() {
        let addr = Address::new(0x1234);
        assert_eq!(addr.page_start(0x1000), Address::new(0x1000));
        assert_eq!(addr.page_end(0x1000), Address::new(0x2000));
        assert_eq!(Address::new(0x2000).page_end(0x1000), Address::new(0x2000));
    }

    #[test]
    fn test_offset_from() {
        let base = Address::new(0x1000);
        assert_eq!(Address::new(0x1010).offset_from(base), Some(0x10));
        assert_eq!(Address::new(0x0fff).offset_from(base), None);
    }
}
