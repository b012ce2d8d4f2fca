pub mod client;
pub mod types;

pub use client::ClusterClient;
pub use types::{
    ClusterError, CreateIndexResult, ExistingIndex, PutOutcome, UdfRegisterOutcome, WritePolicy,
};
