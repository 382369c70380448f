// Storage module for persistent data
pub mod token_store;

pub use token_store::*;
