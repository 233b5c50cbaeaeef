// Mon Oct 19 2026 - Alex

use crate::memory::{Address, RemoteMemory};
use crate::pattern::{Pattern, PatternError};
use crate::utils;
use std::sync::Arc;

/// Searches a remote `[start, end)` range with one bulk read per call.
///
/// Every failure (no memory bound, empty range, short read, malformed
/// pattern) is logged and reported as "no match".
#[derive(Clone, Default)]
pub struct PatternScanner {
    mem: Option<Arc<dyn RemoteMemory>>,
}

impl PatternScanner {
    pub fn new(mem: Arc<dyn RemoteMemory>) -> Self {
        Self { mem: Some(mem) }
    }

    pub fn unbound() -> Self {
        Self { mem: None }
    }

    pub fn is_bound(&self) -> bool {
        self.mem.is_some()
    }

    fn read_range(&self, start: Address, end: Address) -> Option<Vec<u8>> {
        let Some(mem) = self.mem.as_ref() else {
            log::debug!("pattern scan without a memory backend");
            return None;
        };
        if start >= end {
            log::debug!("pattern scan over empty range [{}, {})", start, end);
            return None;
        }

        let size = usize::try_from(end.as_u64() - start.as_u64()).ok()?;
        let Some(mut buffer) = utils::try_zeroed(size) else {
            log::error!("cannot allocate {} bytes to scan [{}, {})", size, start, end);
            return None;
        };
        let read = mem.read(start, &mut buffer);
        if read != size {
            log::error!("failed to read range [{}, {}): got {} of {} bytes", start, end, read, size);
            return None;
        }
        Some(buffer)
    }

    pub fn find_pattern_all(&self, start: Address, end: Address, pattern: &Pattern) -> Vec<Address> {
        let Some(buffer) = self.read_range(start, end) else {
            return Vec::new();
        };
        pattern
            .find_all_in(&buffer)
            .into_iter()
            .map(|offset| start + offset as u64)
            .collect()
    }

    pub fn find_pattern_first(&self, start: Address, end: Address, pattern: &Pattern) -> Option<Address> {
        let buffer = self.read_range(start, end)?;
        pattern.find_in(&buffer).map(|offset| start + offset as u64)
    }

    /// Several patterns over a single read, as `(pattern index, address)`
    /// ordered by pattern then address.
    pub fn find_patterns_all(&self, start: Address, end: Address, patterns: &[Pattern]) -> Vec<(usize, Address)> {
        if patterns.is_empty() {
            return Vec::new();
        }
        let Some(buffer) = self.read_range(start, end) else {
            return Vec::new();
        };

        patterns
            .iter()
            .enumerate()
            .flat_map(|(idx, pattern)| {
                pattern
                    .find_all_in(&buffer)
                    .into_iter()
                    .map(move |offset| (idx, start + offset as u64))
            })
            .collect()
    }

    /// `mask` uses `'x'` for must-match bytes.
    pub fn find_bytes_all(&self, start: Address, end: Address, bytes: &[u8], mask: &str) -> Vec<Address> {
        match checked(Pattern::from_mask_str(bytes, mask)) {
            Some(pattern) => self.find_pattern_all(start, end, &pattern),
            None => Vec::new(),
        }
    }

    pub fn find_bytes_first(&self, start: Address, end: Address, bytes: &[u8], mask: &str) -> Option<Address> {
        let pattern = checked(Pattern::from_mask_str(bytes, mask))?;
        self.find_pattern_first(start, end, &pattern)
    }

    pub fn find_hex_all(&self, start: Address, end: Address, hex: &str, mask: &str) -> Vec<Address> {
        match checked(Pattern::from_hex(hex, mask)) {
            Some(pattern) => self.find_pattern_all(start, end, &pattern),
            None => Vec::new(),
        }
    }

    pub fn find_hex_first(&self, start: Address, end: Address, hex: &str, mask: &str) -> Option<Address> {
        let pattern = checked(Pattern::from_hex(hex, mask))?;
        self.find_pattern_first(start, end, &pattern)
    }

    pub fn find_data_all(&self, start: Address, end: Address, data: &[u8]) -> Vec<Address> {
        match checked(Pattern::from_data(data)) {
            Some(pattern) => self.find_pattern_all(start, end, &pattern),
            None => Vec::new(),
        }
    }

    pub fn find_data_first(&self, start: Address, end: Address, data: &[u8]) -> Option<Address> {
        let pattern = checked(Pattern::from_data(data))?;
        self.find_pattern_first(start, end, &pattern)
    }
}

fn checked(result: Result<Pattern, PatternError>) -> Option<Pattern> {
    result
        .map_err(|e| log::error!("rejected pattern: {}", e))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::SnapshotMemory;

    fn scanner_over(base: u64, data: Vec<u8>) -> PatternScanner {
        PatternScanner::new(Arc::new(SnapshotMemory::new(Address::new(base), data)))
    }

    fn addrs(values: &[u64]) -> Vec<Address> {
        values.iter().copied().map(Address::new).collect()
    }

    #[test]
    fn test_wildcard_find_first() {
        let mut data = vec![0u8; 0x10];
        data[..4].copy_from_slice(&[0xAA, 0xBB, 0xCC, 0xDD]);
        let scanner = scanner_over(0x1000, data);

        let found = scanner.find_bytes_first(
            Address::new(0x1000),
            Address::new(0x1010),
            &[0xAA, 0x00, 0xCC, 0xDD],
            "x?xx",
        );
        assert_eq!(found, Some(Address::new(0x1000)));
    }

    #[test]
    fn test_find_all_repeated() {
        let mut data = vec![0u8; 0x10];
        data[0..2].copy_from_slice(&[0xAA, 0xBB]);
        data[8..10].copy_from_slice(&[0xAA, 0xBB]);
        let scanner = scanner_over(0x1000, data);

        let found = scanner.find_bytes_all(Address::new(0x1000), Address::new(0x1010), &[0xAA, 0xBB], "xx");
        assert_eq!(found, addrs(&[0x1000, 0x1008]));
    }

    #[test]
    fn test_matches_stay_inside_range() {
        let scanner = scanner_over(0x1000, vec![0x90; 0x40]);
        let start = Address::new(0x1004);
        let end = Address::new(0x1013);
        let pattern = Pattern::from_data(&[0x90; 4]).unwrap();

        let all = scanner.find_pattern_all(start, end, &pattern);
        assert_eq!(all, addrs(&[0x1004, 0x1008, 0x100c]));
        for pair in all.windows(2) {
            assert!(pair[1].as_u64() - pair[0].as_u64() >= pattern.scan_size() as u64);
        }
        for a in &all {
            assert!(*a >= start && a.as_u64() + pattern.scan_size() as u64 <= end.as_u64());
        }
        assert_eq!(scanner.find_pattern_first(start, end, &pattern), all.first().copied());
    }

    #[test]
    fn test_encodings_agree() {
        let data = b"..\x7fELF..\x7fELF...\x7fELF".to_vec();
        let scanner = scanner_over(0x4000, data.clone());
        let start = Address::new(0x4000);
        let end = Address::new(0x4000 + data.len() as u64);

        let by_bytes = scanner.find_bytes_all(start, end, b"\x7fELF", "xxxx");
        let by_hex = scanner.find_hex_all(start, end, "7f454c46", "xxxx");
        let by_data = scanner.find_data_all(start, end, b"\x7fELF");
        let by_sig = scanner.find_pattern_all(start, end, &Pattern::from_signature("7F 45 4C 46").unwrap());

        assert_eq!(by_bytes, addrs(&[0x4002, 0x4008, 0x400f]));
        assert_eq!(by_bytes, by_hex);
        assert_eq!(by_bytes, by_data);
        assert_eq!(by_bytes, by_sig);
        assert_eq!(scanner.find_hex_first(start, end, "0x7f 45", "xx"), Some(Address::new(0x4002)));
        assert_eq!(scanner.find_data_first(start, end, b"ELF"), Some(Address::new(0x4003)));
    }

    #[test]
    fn test_rejections_yield_nothing() {
        let scanner = scanner_over(0x1000, vec![0xAA; 0x10]);
        let start = Address::new(0x1000);
        let end = Address::new(0x1010);

        assert!(scanner.find_bytes_all(end, start, &[0xAA], "x").is_empty());
        assert!(scanner.find_bytes_all(start, start, &[0xAA], "x").is_empty());
        assert!(scanner.find_bytes_all(start, end, &[], "").is_empty());
        assert!(scanner.find_bytes_all(start, end, &[0xAA], "").is_empty());
        assert!(scanner.find_hex_all(start, end, "AAA", "xx").is_empty());
        assert!(scanner.find_hex_all(start, end, "AAAA", "x").is_empty());
        assert!(scanner.find_data_first(start, end, b"").is_none());

        let unbound = PatternScanner::unbound();
        assert!(!unbound.is_bound());
        assert!(unbound.find_data_all(start, end, &[0xAA]).is_empty());
    }

    #[test]
    fn test_short_read_is_not_scanned() {
        // The snapshot ends at 0x1010, so this read comes back short.
        let scanner = scanner_over(0x1000, vec![0xAA; 0x10]);
        let found = scanner.find_data_all(Address::new(0x1000), Address::new(0x1020), &[0xAA]);
        assert!(found.is_empty());
    }

    #[test]
    fn test_find_patterns_all() {
        let scanner = scanner_over(0x2000, b"abcabcxyz".to_vec());
        let patterns = vec![
            Pattern::from_data(b"xyz").unwrap(),
            Pattern::from_data(b"bc").unwrap(),
            Pattern::from_data(b"nope").unwrap(),
        ];
        let found = scanner.find_patterns_all(Address::new(0x2000), Address::new(0x2009), &patterns);
        assert_eq!(
            found,
            vec![
                (0, Address::new(0x2006)),
                (1, Address::new(0x2001)),
                (1, Address::new(0x2004)),
            ]
        );
        assert!(scanner.find_patterns_all(Address::new(0x2000), Address::new(0x2009), &[]).is_empty());
    }
}
