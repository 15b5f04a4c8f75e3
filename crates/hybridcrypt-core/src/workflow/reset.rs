use super::panels::Panels;
use super::{Action, WorkflowCoordinator};
use crate::error::{HybridError, HybridResult};
use hybridcrypt_contract::{CryptoGateway, GatewayResult};
use log::{debug, info, warn};

pub const RESET_CONFIRMATION: &str =
    "Are you sure you want to reset the system? All keys and files will be deleted.";
pub const RESET_DONE: &str = "System reset successfully!";

impl WorkflowCoordinator {
    /// Start a reset. Returns `Ok(false)` without doing anything when the user
    /// did not confirm.
    pub fn begin_reset(&mut self, confirmed: bool) -> HybridResult<bool> {
        if !confirmed {
            debug!("reset not confirmed; nothing to do");
            return Ok(false);
        }
        self.start(Action::Reset)?;
        Ok(true)
    }

    /// Apply the service's reset reply. On failure the session is left exactly as it was.
    pub fn finish_reset(&mut self, result: GatewayResult<()>) -> HybridResult<()> {
        self.settle(Action::Reset);
        match result {
            Ok(()) => {
                self.state.clear();
                self.panels = Panels::default();
                self.clear_selections();
                self.steps.reset();
                info!("session reset");
                Ok(())
            }
            Err(err) => {
                let err = HybridError::from(err);
                warn!("reset failed: {err}");
                Err(err)
            }
        }
    }

    /// Confirmed reset round trip. Returns whether a reset took place.
    pub async fn reset_system<G>(&mut self, gateway: &G, confirmed: bool) -> HybridResult<bool>
    where
        G: CryptoGateway + ?Sized,
    {
        if !self.begin_reset(confirmed)? {
            return Ok(false);
        }
        let result = gateway.reset().await;
        self.finish_reset(result)?;
        Ok(true)
    }
}
