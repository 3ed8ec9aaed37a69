//! Filesystem access for slot mutations.
//!
//! This module handles:
//! - The platform symlink/rename/remove calls behind [`LinkBackend`]
//! - The advisory lock taken on a library root

mod backend;
mod lock;

pub use backend::{create_backend, LinkBackend, OsLinkBackend};
pub use lock::RootLock;
