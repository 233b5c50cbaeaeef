// Mon Oct 19 2026 - Alex

pub mod config;
pub mod elf;
pub mod manager;
pub mod memory;
pub mod pattern;
pub mod symbol;
pub mod utils;

pub use config::{Config, ConfigError};
pub use elf::{ElfScanOptions, ElfScanner, ElfScannerFactory};
pub use manager::{ElfBaseMap, MemoryManager};
pub use memory::{Address, MemOp, MemoryError, ProcMap, RemoteMemory};
pub use pattern::{Pattern, PatternError, PatternScanner};
pub use symbol::{Symbol, SymbolTable};
