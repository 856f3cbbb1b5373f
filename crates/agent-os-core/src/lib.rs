pub mod config;
pub mod console;
pub mod error;
pub mod fs;
pub mod manifest;
pub mod paths;
pub mod pipeline;
pub mod reconcile;
pub mod runner;
pub mod steps;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{InstallerError, Result};
