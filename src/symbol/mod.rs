// Mon Oct 19 2026 - Alex

pub mod table;

pub use table::{Symbol, SymbolTable};
