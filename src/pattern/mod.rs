// Mon Oct 19 2026 - Alex

pub mod error;
pub mod pattern;
pub mod scanner;

pub use error::PatternError;
pub use pattern::Pattern;
pub use scanner::PatternScanner;
