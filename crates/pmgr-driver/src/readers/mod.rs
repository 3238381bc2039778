//! Register reader implementations
//!
//! Three readers available:
//! - **DevMem**: maps the page holding each address from `/dev/mem` (root, live hardware)
//! - **Snapshot**: address/value table loaded from JSON (offline analysis, tests)
//! - **Offline**: every read fails, so the survey reports addresses only

pub mod devmem;
pub mod offline;
pub mod snapshot;

pub use devmem::DevMem;
pub use offline::Offline;
pub use snapshot::RegisterSnapshot;
