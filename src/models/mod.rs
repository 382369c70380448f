// Models module - credentials, companion API payloads and progress rows

pub mod credentials;
pub mod cargo;
pub mod requirements;
pub mod progress;

// Re-export all models for easier imports
pub use credentials::*;
pub use cargo::*;
pub use requirements::*;
pub use progress::*;
