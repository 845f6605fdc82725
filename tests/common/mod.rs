//! Common test utilities and helpers
//!
//! A plugin defined outside the crate, the way a third-party feature module
//! would be, plus helpers for building peers and dispatchers.

pub mod fixtures;
