//! SQL storage abstraction for KarmaFeed.
//!
//! Services talk to [`SQLStore`] trait objects; the only backend is
//! [`sqlite::SqliteStore`] (bundled SQLite in WAL mode). The trait carries
//! a transactional hook, [`SQLStore::with_tx`], because the system's core
//! mutations (like toggles, cascade deletes) are multi-statement and must
//! commit or roll back as one unit.

pub mod error;
pub mod sqlite;
pub mod traits;

pub use error::SQLError;
pub use sqlite::SqliteStore;
pub use traits::{Row, SQLConn, SQLStore, Value};
