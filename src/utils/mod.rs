//! Utility modules.

pub mod exec;
