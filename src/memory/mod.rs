// Mon Oct 19 2026 - Alex

pub mod address;
pub mod error;
pub mod maps;
pub mod process;
pub mod protection;
pub mod snapshot;
pub mod traits;

pub use address::Address;
pub use error::MemoryError;
pub use maps::ProcMap;
pub use process::{open_remote, FileMemory, MemOp, SyscallMemory};
pub use protection::Protection;
pub use snapshot::SnapshotMemory;
pub use traits::RemoteMemory;
