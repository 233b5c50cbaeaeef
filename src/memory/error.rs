// Mon Oct 19 2026 - Alex

use crate::memory::Address;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Process not found: {0}")]
    ProcessNotFound(String),
    #[error("Read failed at {address}: got {actual} of {expected} bytes")]
    ReadFailed {
        address: Address,
        expected: usize,
        actual: usize,
    },
    #[error("Invalid memory range [{0}, {1})")]
    InvalidRange(Address, Address),
    #[error("Invalid ELF image at {0}")]
    InvalidElf(Address),
    #[error("No mapping found for {0}")]
    MapNotFound(String),
    #[error("Failed to parse maps entry: {0}")]
    MapsParse(String),
}
