// Mon Oct 19 2026 - Alex

use crate::memory::Address;

/// Read/write access to another process's address space.
///
/// Results are byte counts, never errors: a short or zero count is the only
/// failure signal, and callers decide whether a partial transfer is usable.
pub trait RemoteMemory: Send + Sync {
    /// Copies up to `buffer.len()` bytes starting at `address`.
    fn read(&self, address: Address, buffer: &mut [u8]) -> usize;

    /// Copies `data` to `address`, returning how many bytes landed.
    fn write(&self, address: Address, data: &[u8]) -> usize;

    /// Reads a NUL-terminated string of at most `max_len` bytes.
    ///
    /// Returns an empty string when nothing could be read.
    fn read_cstring(&self, address: Address, max_len: usize) -> String {
        if max_len == 0 {
            return String::new();
        }

        let mut buffer = vec![0u8; max_len];
        let read = self.read(address, &mut buffer);
        if read == 0 {
            return String::new();
        }

        let bytes = &buffer[..read];
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        String::from_utf8_lossy(&bytes[..end]).into_owned()
    }

    /// True only when the whole buffer was filled.
    fn read_exact(&self, address: Address, buffer: &mut [u8]) -> bool {
        self.read(address, buffer) == buffer.len()
    }

    fn read_bytes(&self, address: Address, len: usize) -> Option<Vec<u8>> {
        let mut buffer = crate::utils::try_zeroed(len)?;
        if self.read_exact(address, &mut buffer) {
            Some(buffer)
        } else {
            None
        }
    }

    fn write_all(&self, address: Address, data: &[u8]) -> bool {
        self.write(address, data) == data.len()
    }
}
