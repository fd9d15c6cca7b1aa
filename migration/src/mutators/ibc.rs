//! EnableCrossChainMessaging -- fresh IBC, ICS-20 transfer and capability
//! sub-documents.
//!
//! Re-application is refused rather than silently replacing whatever IBC
//! state the document already carries.

use super::Mutator;
use crate::config::{IBC_TENDERMINT_CLIENT, TRANSFER_PORT_ID};
use crate::error::{MigrationError, MigrationResult};
use crate::state::{
    CapabilityState, ChannelGenesis, ClientGenesis, ClientParams, ConnectionGenesis, IbcState,
    StateDocument, TransferParams, TransferState,
};

#[derive(Clone, Copy, Debug)]
pub struct EnableCrossChainMessaging;

impl EnableCrossChainMessaging {
    fn ibc() -> IbcState {
        IbcState {
            client_genesis: ClientGenesis {
                clients: Vec::new(),
                clients_consensus: Vec::new(),
                create_localhost: false,
                params: ClientParams {
                    allowed_clients: vec![IBC_TENDERMINT_CLIENT.to_string()],
                },
            },
            connection_genesis: ConnectionGenesis::default(),
            channel_genesis: ChannelGenesis::default(),
        }
    }
}

impl Mutator for EnableCrossChainMessaging {
    fn name(&self) -> &'static str {
        "EnableCrossChainMessaging"
    }

    fn apply(&self, doc: &mut StateDocument) -> MigrationResult<()> {
        let app = &mut doc.app_state;
        for (module, present) in [
            ("ibc", app.ibc.is_some()),
            ("transfer", app.transfer.is_some()),
            ("capability", app.capability.is_some()),
        ] {
            if present {
                return Err(MigrationError::AlreadyPresent(format!("app_state.{}", module)));
            }
        }

        app.ibc = Some(Self::ibc());
        app.transfer = Some(TransferState {
            port_id: TRANSFER_PORT_ID.to_string(),
            denom_traces: Vec::new(),
            params: TransferParams {
                send_enabled: true,
                receive_enabled: true,
            },
        });
        app.capability = Some(CapabilityState {
            index: "1".to_string(),
            owners: Vec::new(),
        });
        Ok(())
    }
}
