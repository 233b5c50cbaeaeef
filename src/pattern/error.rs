// Mon Oct 19 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("Pattern has no bytes")]
    EmptyPattern,
    #[error("Pattern has no mask")]
    EmptyMask,
    #[error("Pattern is {bytes} bytes but mask is {mask} long")]
    LengthMismatch { bytes: usize, mask: usize },
    #[error("Invalid hex: {0}")]
    InvalidHex(String),
    #[error("Invalid signature token: {0}")]
    InvalidToken(String),
}
