// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Starname Genesis Migration: Core Library
//!
//! Takes the exported state of the retiring weave-era chain (`iov-mainnet-2`,
//! cosmos-sdk v0.39 JSON) and turns it into a genesis document that a
//! v0.40 `starnamed` can boot from.
//!
//! The work splits into two halves. The first half is pure data surgery:
//! a fixed, ordered list of mutators edits the exported document in place
//! (burn, custody sweep, monetary policy, new subsystems, validator
//! injection) while the supply ledger is audited after every step that
//! touches balances. The second half hands the result to `starnamed`
//! twice: once to convert the schema, once to prove the output actually
//! boots. Nothing short of running the chain tells you a genesis file is
//! good.
//!
//! ## Architecture
//!
//! - **state** -- Typed exported-state document, decimal amounts, invariants.
//! - **mutators** -- Single-concern edits plus the audited chain runner.
//! - **patch** -- Per-network mutator bundles (jestnet, stargatenet, mainnet).
//! - **pipeline** -- The migration state machine and its two artifacts.
//! - **process** -- Child-process runner and the `starnamed` service ports.
//! - **config** -- Protocol constants and the pipeline configuration struct.
//! - **error** -- The one error type every fallible call returns.
//!
//! ## Ground Rules
//!
//! 1. Token amounts are never floats. Ever.
//! 2. Every balance edit leaves `supply − Σ balances` exactly where it was.
//! 3. No retries: the inputs are deterministic, so a retry is a rerun of
//!    the same failure.

pub mod config;
pub mod error;
pub mod mutators;
pub mod patch;
pub mod pipeline;
pub mod process;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use config::PipelineConfig;
pub use error::{MigrationError, MigrationResult};
pub use patch::ChainPatch;
pub use pipeline::{GenesisDocument, MigrationPipeline, PipelineState};
pub use process::{ConversionService, ValidationService};
pub use state::StateDocument;
