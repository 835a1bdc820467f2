// Career documents: versioned, human-readable JSON.
// {"schema_version": 1, "career": {...}}

pub mod format;
pub mod migration;

pub use format::{decode, encode, CareerDocument};
pub use migration::{document_version, migrate_document, needs_migration};

pub const SAVE_VERSION: u32 = 1;
