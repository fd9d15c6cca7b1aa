//! # External Processes
//!
//! The pipeline talks to the chain executable through two ports:
//!
//! - [`ConversionService`] turns the v0.39 launchpad into v0.40 genesis JSON.
//! - [`ValidationService`] boots a node on the result and reports how that
//!   went.
//!
//! Both return raw outcomes; deciding what counts as failure is the
//! pipeline's job. The `starnamed`-backed implementations live in
//! [`starnamed`], tests substitute fakes with canned outputs.
//!
//! ```text
//! runner.rs     -- ProcessRunner: spawn, capture, watch for a marker, kill
//! starnamed.rs  -- StarnamedConversion / StarnamedValidation
//! ```

pub mod runner;
pub mod starnamed;

use std::path::Path;

use async_trait::async_trait;

use crate::error::MigrationResult;

pub use runner::{BootOutcome, BootWatch, ProcessOutput, ProcessRunner};
pub use starnamed::{StarnamedConversion, StarnamedValidation};

/// Schema conversion of an intermediate artifact.
#[async_trait]
pub trait ConversionService: Send + Sync {
    /// Converts the document at `launchpad`, using `home` as the working
    /// directory. On success stdout carries the converted document.
    async fn convert(&self, launchpad: &Path, home: &Path) -> MigrationResult<ProcessOutput>;
}

/// Boot validation of a converted genesis.
#[async_trait]
pub trait ValidationService: Send + Sync {
    /// Starts a node in `home` and watches it according to `watch`. The node
    /// is no longer running when this returns.
    async fn boot(&self, home: &Path, watch: &BootWatch) -> MigrationResult<BootOutcome>;
}
