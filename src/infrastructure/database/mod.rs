pub mod connection;
pub mod local_store;
pub mod mappers;
pub mod queue_store;
pub mod rows;

pub use connection::{Database, DbPool};
pub use local_store::SqliteLocalStore;
pub use queue_store::SqliteOperationQueue;
