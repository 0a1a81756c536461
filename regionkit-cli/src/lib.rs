// All pipeline functionality is in regionkit-core
// This CLI acts as a thin wrapper around the core library

// CLI-specific modules
pub mod http;

// Re-export core types for convenience
pub use regionkit_core::*;

// Re-export CLI utilities
pub use http::HttpSource;
