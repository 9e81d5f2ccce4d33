// Build-time identity from Cargo.toml

/// Package version, reported by GET /version and the startup log.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
