//! Database layer - connection pool, migrations and repositories
//!
//! # Design Principles
//!
//! - Repositories are traits; PostgreSQL and in-memory stores implement them
//! - Lookups return `Option`, absence is not an error at this level
//! - List operations use JOINs - no N+1 queries
//! - Rely on unique constraints for names, report conflicts as `Duplicate`
//! - Topology edits are written in one transaction

pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repos;

pub use memory::MemoryStore;
pub use pool::{create_pool, create_pool_with_options};
pub use repos::*;
