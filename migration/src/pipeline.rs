//! # Migration Pipeline
//!
//! Drives one exported document all the way to a booted genesis:
//!
//! ```text
//! Start
//!   │  supply must equal balances, then the common mutators
//!   │  (burn, consensus, ibc, wasm, custody, mint, durations)
//!   ▼
//! CommonMutated
//!   │  chain patch, then registry integrity check
//!   ▼
//! PatchApplied
//!   │  write <home>/config/launchpad.json, run the conversion
//!   ▼
//! ConversionInvoked
//!   │  exit 0 and non-empty stdout, parsed, written to genesis.json
//!   ▼
//! ConversionSucceeded ───────────────(boot validation disabled)──┐
//!   │  start a node, wait for the marker and the settle window   │
//!   ▼                                                            │
//! ValidationInvoked                                              │
//!   │  height > 0, byproducts removed                            │
//!   ▼                                                            │
//! Done ◄─────────────────────────────────────────────────────────┘
//! ```
//!
//! Any error moves the pipeline to `Failed`, which is absorbing. Nothing is
//! retried: every step is deterministic in its inputs except the boot, and
//! the boot has its settle window instead.
//!
//! The mutation phase is synchronous and owns the document exclusively.
//! Only the two external invocations await.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, error, info};

use crate::config::PipelineConfig;
use crate::error::{MigrationError, MigrationResult};
use crate::mutators;
use crate::patch::ChainPatch;
use crate::process::{BootOutcome, BootWatch, ConversionService, ValidationService};
use crate::state::{canonical_json, check_domain_references, check_supply, StateDocument};

/// The converted v0.40 document. Its schema belongs to `starnamed`, so it
/// is kept as plain JSON.
pub type GenesisDocument = Value;

// ---------------------------------------------------------------------------
// Pipeline State
// ---------------------------------------------------------------------------

/// Where a pipeline run currently stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Start,
    CommonMutated,
    PatchApplied,
    ConversionInvoked,
    ConversionSucceeded,
    ValidationInvoked,
    /// Terminal: both artifacts written and validated.
    Done,
    /// Terminal: something went wrong; artifacts are unusable.
    Failed,
}

impl PipelineState {
    /// Returns `true` for `Done` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

// ---------------------------------------------------------------------------
// Migration Pipeline
// ---------------------------------------------------------------------------

/// One migration run against one home directory.
pub struct MigrationPipeline<C, V> {
    config: PipelineConfig,
    patch: ChainPatch,
    conversion: C,
    validation: V,
    state: PipelineState,
}

impl<C: ConversionService, V: ValidationService> MigrationPipeline<C, V> {
    pub fn new(config: PipelineConfig, patch: ChainPatch, conversion: C, validation: V) -> Self {
        Self {
            config,
            patch,
            conversion,
            validation,
            state: PipelineState::Start,
        }
    }

    /// Return the current state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn advance(&mut self, next: PipelineState) {
        if self.state == PipelineState::Failed {
            return;
        }
        info!(from = ?self.state, to = ?next, "pipeline");
        self.state = next;
    }

    fn fail(&mut self, err: &MigrationError) {
        error!(state = ?self.state, error = %err, "pipeline failed");
        self.state = PipelineState::Failed;
    }

    /// Runs the whole pipeline on `doc`, returning the converted genesis.
    ///
    /// A pipeline runs once; a second call is refused.
    pub async fn run(&mut self, doc: StateDocument) -> MigrationResult<GenesisDocument> {
        if self.state != PipelineState::Start {
            return Err(MigrationError::InvariantViolation(format!(
                "pipeline already ran (state {:?})",
                self.state
            )));
        }

        let result = self.execute(doc).await;
        if let Err(err) = &result {
            self.fail(err);
        }
        result
    }

    async fn execute(&mut self, mut doc: StateDocument) -> MigrationResult<GenesisDocument> {
        self.mutate(&mut doc)?;

        let launchpad = self.write_launchpad(&doc).await?;
        drop(doc);

        let genesis = self.convert(&launchpad).await?;

        if self.config.boot_validation {
            let validated = self.validate().await;
            let cleaned = self.remove_byproducts().await;
            validated?;
            cleaned?;
        } else {
            info!("boot validation disabled");
        }

        self.advance(PipelineState::Done);
        Ok(genesis)
    }

    // -- mutation -------------------------------------------------------------

    fn mutate(&mut self, doc: &mut StateDocument) -> MigrationResult<()> {
        check_supply(doc)?;
        mutators::common(&self.config).apply(doc)?;
        self.advance(PipelineState::CommonMutated);

        self.patch.apply(doc)?;
        check_domain_references(doc)?;
        self.advance(PipelineState::PatchApplied);
        Ok(())
    }

    async fn write_launchpad(&self, doc: &StateDocument) -> MigrationResult<PathBuf> {
        let dir = self.config.config_dir();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| MigrationError::io(&dir, e))?;

        let path = self.config.launchpad_path();
        write(&path, doc.to_canonical_json()?).await?;
        info!(path = %path.display(), "launchpad written");
        Ok(path)
    }

    // -- conversion -----------------------------------------------------------

    async fn convert(&mut self, launchpad: &Path) -> MigrationResult<GenesisDocument> {
        self.advance(PipelineState::ConversionInvoked);
        let output = self.conversion.convert(launchpad, &self.config.home).await?;

        if !output.success() {
            let stderr = output.stderr.trim();
            return Err(MigrationError::Conversion(match output.code {
                Some(code) if stderr.is_empty() => format!("exited with code {}", code),
                Some(code) => format!("exited with code {}: {}", code, stderr),
                None => format!("killed by a signal: {}", stderr),
            }));
        }
        if output.stdout.trim().is_empty() {
            return Err(MigrationError::Conversion(
                "conversion produced no output".to_string(),
            ));
        }

        let genesis: GenesisDocument = serde_json::from_str(&output.stdout)
            .map_err(|e| MigrationError::Conversion(format!("output is not JSON: {}", e)))?;

        let path = self.config.genesis_path();
        write(&path, canonical_json(&genesis)?).await?;
        info!(path = %path.display(), "genesis written");

        self.advance(PipelineState::ConversionSucceeded);
        Ok(genesis)
    }

    // -- boot validation ------------------------------------------------------

    async fn validate(&mut self) -> MigrationResult<()> {
        self.advance(PipelineState::ValidationInvoked);
        let watch = BootWatch {
            marker: self.config.readiness_marker.clone(),
            settle: self.config.settle_window,
            timeout: self.config.boot_timeout,
        };

        match self.validation.boot(&self.config.home, &watch).await? {
            BootOutcome::Ready { elapsed } => {
                debug!(?elapsed, "node reported ready");
            }
            BootOutcome::Exited { code, tail } => {
                return Err(MigrationError::Validation(format!(
                    "node exited ({}) before reporting ready:\n{}",
                    code.map_or_else(|| "signal".to_string(), |c| format!("code {}", c)),
                    tail
                )));
            }
            BootOutcome::TimedOut { tail } => {
                return Err(MigrationError::Validation(format!(
                    "no {:?} within {:?}:\n{}",
                    watch.marker, watch.timeout, tail
                )));
            }
        }

        let path = self.config.home.join(&self.config.height_state_file);
        let state = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| MigrationError::Validation(format!("{}: {}", path.display(), e)))?;
        let height = parse_height(&state)?;
        if height == 0 {
            return Err(MigrationError::Validation(
                "node never advanced past genesis".to_string(),
            ));
        }
        info!(height, "node produced blocks");
        Ok(())
    }

    /// Deletes what the boot left behind. Missing entries are fine.
    async fn remove_byproducts(&self) -> MigrationResult<()> {
        for relative in &self.config.byproducts {
            let path = self.config.home.join(relative);
            let metadata = match tokio::fs::symlink_metadata(&path).await {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(MigrationError::io(&path, e)),
            };

            let removed = if metadata.is_dir() {
                tokio::fs::remove_dir_all(&path).await
            } else {
                tokio::fs::remove_file(&path).await
            };
            removed.map_err(|e| MigrationError::io(&path, e))?;
            debug!(path = %path.display(), "byproduct removed");
        }
        Ok(())
    }
}

async fn write(path: &Path, json: String) -> MigrationResult<()> {
    tokio::fs::write(path, json)
        .await
        .map_err(|e| MigrationError::io(path, e))
}

/// `height` from a `priv_validator_state.json`. Tendermint writes it as a
/// string; a number is accepted too.
fn parse_height(json: &str) -> MigrationResult<u64> {
    let state: Value = serde_json::from_str(json)
        .map_err(|e| MigrationError::Validation(format!("unreadable height state: {}", e)))?;

    let height = match state.get("height") {
        Some(Value::String(s)) => s.parse().ok(),
        Some(Value::Number(n)) => n.as_u64(),
        _ => None,
    };
    height.ok_or_else(|| {
        MigrationError::Validation(format!("height state has no usable height: {}", state))
    })
}
