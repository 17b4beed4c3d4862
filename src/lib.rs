//! # Location Batcher
//!
//! Creates one folder per catalog location, fills each with images drawn
//! from a pool of source folders, and remembers what it has done so the
//! next run picks up where the last one stopped.
//!
//! ## Architecture
//! - `core` - Catalog, progress store, source scanning, planning, materialization
//! - `config` - Immutable run configuration and how it is resolved
//! - `events` - Event-driven progress reporting
//! - `error` - Error types

pub mod config;
pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use config::BatchConfig;
pub use error::{BatchError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
