//! Expected-schema contract.

mod contract;

pub use contract::SchemaContract;
