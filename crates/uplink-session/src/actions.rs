//! Execution of server-defined disconnect actions.

use crate::collaborators::HostPage;
use crate::protocol::{DisconnectAction, RawDisconnectAction};
use log::{info, warn};

/// Runs the stored disconnect actions in order.
///
/// Called exactly once per disconnection episode. A failing action (missing
/// function, empty selector match, unrecognized type) is logged and
/// skipped; the remaining actions still execute. Nothing here touches
/// connection state.
pub fn run_disconnect_actions(actions: &[RawDisconnectAction], host: &mut dyn HostPage) {
    if actions.is_empty() {
        return;
    }
    info!("Executing {} client-side disconnection actions...", actions.len());
    for action in actions {
        match action {
            RawDisconnectAction::Recognized(DisconnectAction::CallJsFn(name)) => {
                if let Err(e) = host.call_function(name) {
                    warn!("Disconnect action error: {}", e);
                }
            }
            RawDisconnectAction::Recognized(DisconnectAction::SetAttribute(set)) => {
                if let Err(e) = host.set_attribute(&set.selector, &set.name, &set.value) {
                    warn!("Disconnect action error: {}", e);
                }
            }
            RawDisconnectAction::Unrecognized(raw) => {
                warn!("Unknown disconnect action: {}", raw);
            }
        }
    }
}
