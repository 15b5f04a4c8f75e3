use super::panels::{ExchangeSummary, KeySummary, Panel};
use super::{Action, WorkflowCoordinator};
use crate::error::{HybridError, HybridResult};
use crate::state::Step;
use crate::steps::PendingAdvance;
use hybridcrypt_contract::{CryptoGateway, GatewayResult, KeyExchange, KeyGeneration};
use log::{info, warn};

impl WorkflowCoordinator {
    /// Mark key generation in flight. Fails only when it already is.
    pub fn begin_generate_keys(&mut self) -> HybridResult<()> {
        self.start(Action::GenerateKeys)
    }

    /// Apply a key generation reply. On success step 2 unlocks and an
    /// auto-advance to it is scheduled.
    pub fn finish_generate_keys(
        &mut self,
        result: GatewayResult<KeyGeneration>,
    ) -> HybridResult<PendingAdvance> {
        self.settle(Action::GenerateKeys);
        match result {
            Ok(reply) => {
                info!("keys generated in {:.4}s", reply.total_generation_time);
                self.state.mark_keys_generated();
                let (summary, keys) = KeySummary::split(reply);
                self.panels.keys = Panel::Ready(summary);
                self.panels.published = Some(keys);
                Ok(self.schedule(Step::Exchange))
            }
            Err(err) => {
                let err = HybridError::from(err);
                warn!("key generation failed: {err}");
                self.panels.keys = Panel::Failed(err.inline_message());
                Err(err)
            }
        }
    }

    pub async fn generate_keys<G>(&mut self, gateway: &G) -> HybridResult<PendingAdvance>
    where
        G: CryptoGateway + ?Sized,
    {
        self.begin_generate_keys()?;
        let result = gateway.generate_keys().await;
        self.finish_generate_keys(result)
    }

    /// Mark the key exchange in flight. Progress is not pre-checked; the service
    /// rejects an exchange without keys.
    pub fn begin_key_exchange(&mut self) -> HybridResult<()> {
        self.start(Action::ExchangeKeys)
    }

    /// Apply a key exchange reply. On success steps 3 and 4 unlock and an
    /// auto-advance to step 3 is scheduled.
    pub fn finish_key_exchange(
        &mut self,
        result: GatewayResult<KeyExchange>,
    ) -> HybridResult<PendingAdvance> {
        self.settle(Action::ExchangeKeys);
        match result {
            Ok(reply) => {
                info!(
                    "key exchange finished in {:.4}s (keys match: {}, secrets match: {})",
                    reply.total_time(),
                    reply.keys_match,
                    reply.shared_secrets_match
                );
                if !reply.keys_match || !reply.shared_secrets_match {
                    warn!("derived keys differ between parties");
                }
                self.state.mark_key_exchanged();
                self.panels.exchange = Panel::Ready(ExchangeSummary::from(reply));
                Ok(self.schedule(Step::Encrypt))
            }
            Err(err) => {
                let err = HybridError::from(err);
                warn!("key exchange failed: {err}");
                self.panels.exchange = Panel::Failed(err.inline_message());
                Err(err)
            }
        }
    }

    pub async fn perform_key_exchange<G>(&mut self, gateway: &G) -> HybridResult<PendingAdvance>
    where
        G: CryptoGateway + ?Sized,
    {
        self.begin_key_exchange()?;
        let result = gateway.exchange_keys().await;
        self.finish_key_exchange(result)
    }
}
