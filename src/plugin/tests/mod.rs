//! Test modules for the plugin system
//!
//! Shared mocks live in `utils`; `contract` walks whole plugin lifecycles
//! through the dispatcher.

pub(crate) mod utils;
