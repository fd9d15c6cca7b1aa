//! The real services, backed by the `starnamed` executable.
//!
//! ```text
//! starnamed migrate v0.40 <launchpad> --home <home>   → genesis on stdout
//! starnamed start --home <home>                       → a running node
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use super::{
    BootOutcome, BootWatch, ConversionService, ProcessOutput, ProcessRunner, ValidationService,
};
use crate::config::{STARNAMED, TARGET_SCHEMA_VERSION};
use crate::error::MigrationResult;

fn home_args(home: &Path) -> [OsString; 2] {
    [OsString::from("--home"), home.as_os_str().to_owned()]
}

/// `starnamed migrate`.
#[derive(Clone, Debug)]
pub struct StarnamedConversion {
    runner: ProcessRunner,
}

impl StarnamedConversion {
    /// Uses the executable at `program` (or looked up on `PATH`).
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            runner: ProcessRunner::new(program),
        }
    }

    fn args(launchpad: &Path, home: &Path) -> Vec<OsString> {
        let mut args = vec![
            OsString::from("migrate"),
            OsString::from(TARGET_SCHEMA_VERSION),
            launchpad.as_os_str().to_owned(),
        ];
        args.extend(home_args(home));
        args
    }
}

impl Default for StarnamedConversion {
    fn default() -> Self {
        Self::new(STARNAMED)
    }
}

#[async_trait]
impl ConversionService for StarnamedConversion {
    async fn convert(&self, launchpad: &Path, home: &Path) -> MigrationResult<ProcessOutput> {
        info!(
            program = %self.runner.program().display(),
            launchpad = %launchpad.display(),
            "converting"
        );
        self.runner
            .run_to_completion(&Self::args(launchpad, home))
            .await
    }
}

/// `starnamed start`.
#[derive(Clone, Debug)]
pub struct StarnamedValidation {
    runner: ProcessRunner,
}

impl StarnamedValidation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            runner: ProcessRunner::new(program),
        }
    }

    fn args(home: &Path) -> Vec<OsString> {
        let mut args = vec![OsString::from("start")];
        args.extend(home_args(home));
        args
    }
}

impl Default for StarnamedValidation {
    fn default() -> Self {
        Self::new(STARNAMED)
    }
}

#[async_trait]
impl ValidationService for StarnamedValidation {
    async fn boot(&self, home: &Path, watch: &BootWatch) -> MigrationResult<BootOutcome> {
        info!(program = %self.runner.program().display(), home = %home.display(), "booting");
        self.runner.run_until_marker(&Self::args(home), watch).await
    }
}
