//! Bank-specific export readers

pub mod postal;
