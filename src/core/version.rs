//! Build metadata and the host platform level.
//! Includes the generated version.rs from the build script, providing a single
//! source of truth for the platform level plugins are checked against.

include!(concat!(env!("OUT_DIR"), "/version.rs"));

/// Fallback platform level when the build metadata is missing or malformed
pub const DEFAULT_PLATFORM_VERSION: u32 = 34;

/// Host platform level declared in Cargo.toml metadata.
/// Falls back to a stable default if parsing fails.
pub fn platform_version() -> u32 {
    PLATFORM_VERSION.parse().unwrap_or(DEFAULT_PLATFORM_VERSION)
}

/// Build time string from the build script (UTC)
pub fn build_time() -> &'static str {
    BUILD_TIME
}

/// Short git hash captured by the build script
pub fn git_hash() -> &'static str {
    GIT_HASH
}
