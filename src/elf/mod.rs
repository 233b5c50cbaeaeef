// Mon Oct 19 2026 - Alex

pub mod scanner;
pub mod types;

#[cfg(test)]
pub(crate) mod fixture;

pub use scanner::{ElfScanOptions, ElfScanner, ElfScannerFactory, DEFAULT_NAME_MAX_LEN};
pub use types::{DynamicEntry, ElfClass, ElfHeader, ProgramHeader, RawSymbol};
