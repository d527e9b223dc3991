//! Fetch-contract implementations that keep data locally

pub mod in_memory;

pub use in_memory::InMemoryCollection;
