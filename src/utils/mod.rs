// Mon Oct 19 2026 - Alex

pub mod logging;

pub use logging::LoggingUtils;

use once_cell::sync::Lazy;
use std::fmt::Write as _;

const FALLBACK_PAGE_SIZE: u64 = 4096;

static PAGE_SIZE: Lazy<u64> = Lazy::new(|| {
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as u64
    } else {
        log::warn!("sysconf(_SC_PAGESIZE) failed, assuming {}", FALLBACK_PAGE_SIZE);
        FALLBACK_PAGE_SIZE
    }
});

/// OS page size, queried once per process.
pub fn system_page_size() -> u64 {
    *PAGE_SIZE
}

pub fn page_start(value: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return value;
    }
    value & !(page_size - 1)
}

pub fn page_end(value: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return value;
    }
    page_start(value.wrapping_add(page_size - 1), page_size)
}

/// Zero-filled buffer of `len` bytes, or `None` when the allocation cannot be made.
pub fn try_zeroed(len: usize) -> Option<Vec<u8>> {
    let mut buffer = Vec::new();
    if let Err(e) = buffer.try_reserve_exact(len) {
        log::debug!("cannot allocate {} bytes: {}", len, e);
        return None;
    }
    buffer.resize(len, 0);
    Some(buffer)
}

/// Normalizes a hex string: drops a leading `0x` and all whitespace.
///
/// Returns `None` unless what remains is an even number (at least two) of hex digits.
pub fn validate_hex_string(hex: &str) -> Option<String> {
    let trimmed = hex.trim_start();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let cleaned: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.len() < 2 || cleaned.len() % 2 != 0 {
        return None;
    }
    if !cleaned.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(cleaned)
}

pub fn data_to_hex(data: &[u8]) -> String {
    hex::encode(data)
}

pub fn data_from_hex(text: &str) -> Option<Vec<u8>> {
    hex::decode(text).ok()
}

/// Classic offset / bytes / ASCII dump, one `row_size` row per line.
pub fn hex_dump(data: &[u8], row_size: usize, show_ascii: bool) -> String {
    if data.is_empty() || row_size == 0 {
        return String::new();
    }

    let mut out = String::new();
    for (row, chunk) in data.chunks(row_size).enumerate() {
        if row > 0 {
            out.push('\n');
        }
        let _ = write!(out, "{:08X}: ", row * row_size);

        for byte in chunk {
            let _ = write!(out, "{:02X} ", byte);
        }
        for _ in chunk.len()..row_size {
            out.push_str("   ");
        }

        if show_ascii {
            out.push(' ');
            out.extend(chunk.iter().map(|&b| {
                if b.is_ascii_graphic() || b == b' ' {
                    b as char
                } else {
                    '.'
                }
            }));
        }
    }
    out
}
