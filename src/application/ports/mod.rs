pub mod local_store;
pub mod operation_queue;
pub mod remote_store;

pub use local_store::LocalStore;
pub use operation_queue::OperationQueueStore;
pub use remote_store::{RemoteError, RemoteStore};
