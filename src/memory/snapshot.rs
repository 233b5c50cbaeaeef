// Mon Oct 19 2026 - Alex

use crate::memory::{Address, MemoryError, RemoteMemory};
use parking_lot::RwLock;
use std::fs;
use std::path::Path;

/// A captured copy of remote memory placed at its original base address.
///
/// Reads past the end are truncated, reads outside the range return 0.
pub struct SnapshotMemory {
    base: Address,
    data: RwLock<Vec<u8>>,
}

impl SnapshotMemory {
    pub fn new(base: Address, data: Vec<u8>) -> Self {
        Self {
            base,
            data: RwLock::new(data),
        }
    }

    pub fn load<P: AsRef<Path>>(path: P, base: Address) -> Result<Self, MemoryError> {
        let data = fs::read(path)?;
        Ok(Self::new(base, data))
    }

    pub fn base(&self) -> Address {
        self.base
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    pub fn end(&self) -> Address {
        self.base + self.len() as u64
    }

    fn local_offset(&self, address: Address, len: usize) -> Option<usize> {
        let offset = address.offset_from(self.base)?;
        let offset = usize::try_from(offset).ok()?;
        if offset < len {
            Some(offset)
        } else {
            None
        }
    }
}

impl RemoteMemory for SnapshotMemory {
    fn read(&self, address: Address, buffer: &mut [u8]) -> usize {
        let data = self.data.read();
        let Some(offset) = self.local_offset(address, data.len()) else {
            return 0;
        };

        let count = buffer.len().min(data.len() - offset);
        buffer[..count].copy_from_slice(&data[offset..offset + count]);
        count
    }

    fn write(&self, address: Address, bytes: &[u8]) -> usize {
        let mut data = self.data.write();
        let Some(offset) = self.local_offset(address, data.len()) else {
            return 0;
        };

        let count = bytes.len().min(data.len() - offset);
        data[offset..offset + count].copy_from_slice(&bytes[..count]);
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> SnapshotMemory {
        SnapshotMemory::new(Address::new(0x1000), b"hello\0world\0".to_vec())
    }

    #[test]
    fn test_partial_read_at_end() {
        let mem = snapshot();
        let mut buf = [0u8; 8];
        assert_eq!(mem.read(Address::new(0x1008), &mut buf), 4);
        assert_eq!(&buf[..4], b"rld\0");
        assert!(!mem.read_exact(Address::new(0x1008), &mut buf));
    }

    #[test]
    fn test_read_outside_range() {
        let mem = snapshot();
        let mut buf = [0u8; 4];
        assert_eq!(mem.read(Address::new(0x0fff), &mut buf), 0);
        assert_eq!(mem.read(Address::new(0x100c), &mut buf), 0);
    }

    #[test]
    fn test_read_cstring() {
        let mem = snapshot();
        assert_eq!(mem.read_cstring(Address::new(0x1000), 1024), "hello");
        assert_eq!(mem.read_cstring(Address::new(0x1006), 1024), "world");
        assert_eq!(mem.read_cstring(Address::new(0x1000), 3), "hel");
        assert_eq!(mem.read_cstring(Address::new(0x2000), 16), "");
    }

    #[test]
    fn test_write_then_read() {
        let mem = snapshot();
        assert_eq!(mem.write(Address::new(0x1000), b"HE"), 2);
        assert_eq!(mem.read_cstring(Address::new(0x1000), 16), "HEllo");
        assert_eq!(mem.write(Address::new(0x100a), b"xyz"), 2);
    }

    #[test]
    fn test_load_dump_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.bin");
        fs::write(&path, [0xDE, 0xAD, 0xBE, 0xEF]).unwrap();

        let mem = SnapshotMemory::load(&path, Address::new(0x7000)).unwrap();
        assert_eq!(mem.len(), 4);
        assert_eq!(mem.end(), Address::new(0x7004));
        assert_eq!(mem.read_bytes(Address::new(0x7001), 2), Some(vec![0xAD, 0xBE]));
        assert!(SnapshotMemory::load(dir.path().join("missing.bin"), Address::zero()).is_err());
    }
}
