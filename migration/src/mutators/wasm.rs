//! InjectExecutionEngineParams -- default wasm module state. Nobody may
//! upload or instantiate code; contracts arrive through governance.

use super::Mutator;
use crate::config::{WASM_MAX_CODE_SIZE, WASM_PERMISSION_NOBODY};
use crate::error::MigrationResult;
use crate::state::{AccessConfig, StateDocument, WasmParams, WasmState};

#[derive(Clone, Copy, Debug)]
pub struct InjectExecutionEngineParams;

impl Mutator for InjectExecutionEngineParams {
    fn name(&self) -> &'static str {
        "InjectExecutionEngineParams"
    }

    fn apply(&self, doc: &mut StateDocument) -> MigrationResult<()> {
        let params = WasmParams {
            code_upload_access: AccessConfig {
                permission: WASM_PERMISSION_NOBODY.to_string(),
                address: String::new(),
            },
            instantiate_default_permission: WASM_PERMISSION_NOBODY.to_string(),
            max_wasm_code_size: WASM_MAX_CODE_SIZE.to_string(),
        };

        match doc.app_state.wasm.as_mut() {
            // Keep any codes or contracts, only the params are ours.
            Some(wasm) => wasm.params = params,
            None => {
                doc.app_state.wasm = Some(WasmState {
                    params,
                    codes: Vec::new(),
                    contracts: Vec::new(),
                    sequences: Vec::new(),
                    gen_msgs: Vec::new(),
                })
            }
        }
        Ok(())
    }
}
