pub mod in_memory;
pub mod sqlite;

pub use in_memory::InMemoryCredentialStore;
pub use sqlite::SqliteCredentialStore;
