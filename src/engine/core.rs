// 7.1 engine/core.rs: the engine owns its config and broker. the customer ledger is
// not engine state; each run borrows it and hands it back.

use super::config::SettlementConfig;
use crate::broker::BrokerGateway;

#[derive(Debug)]
pub struct SettlementEngine<B: BrokerGateway> {
    pub(super) config: SettlementConfig,
    pub(super) broker: B,
    pub(super) runs: u64,
}

impl<B: BrokerGateway> SettlementEngine<B> {
    pub fn new(config: SettlementConfig, broker: B) -> Self {
        Self {
            config,
            broker,
            runs: 0,
        }
    }

    pub fn config(&self) -> &SettlementConfig {
        &self.config
    }

    pub fn broker(&self) -> &B {
        &self.broker
    }

    pub fn broker_mut(&mut self) -> &mut B {
        &mut self.broker
    }

    /// Completed runs, aborted ones excluded.
    pub fn runs(&self) -> u64 {
        self.runs
    }
}
