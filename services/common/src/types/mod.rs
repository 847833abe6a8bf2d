//! Core types for the TickScope analytics services

pub mod market;

// Re-export all types
pub use market::*;
