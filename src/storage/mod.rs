//! Storage backends.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Storage Module                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  traits.rs     - PrimaryStore, BackupBuffer, DocumentStore   │
//! │  sql.rs        - SqlItemStore: primary items (MySQL/SQLite)  │
//! │  redis.rs      - RedisBackupBuffer: LPUSH/LRANGE list        │
//! │  documents.rs  - SqlDocumentStore: laboratory JSON docs      │
//! │  memory.rs     - In-process versions of all three            │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod traits;
pub mod sql;
pub mod redis;
pub mod documents;
pub mod memory;
