pub mod rest_client;
pub mod translation;

pub use rest_client::RestRemoteStore;
