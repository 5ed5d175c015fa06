//! Ghidra macOS bundle builder library.
//!
//! Assembles a redistributable `Ghidra.app` bundle and compressed `.dmg`
//! from a local install or the latest GitHub release, optionally embedding
//! a JDK or GraalVM and building third-party extensions.
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundle;
pub mod cache;
pub mod cli;
pub mod config;
pub mod dmg;
pub mod error;
pub mod extension;
pub mod fsutil;
pub mod release;
pub mod runtime;
pub mod theme;
pub mod tools;

// Re-export commonly used types
pub use config::Config;
pub use error::{BundlerError, Result};
