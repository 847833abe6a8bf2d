//! Common types, errors, and configuration shared by the TickScope services

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

pub use config::*;
pub use constants::*;
pub use errors::*;
pub use types::*;
