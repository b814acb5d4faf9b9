//! One settlement run.

use super::core::SettlementEngine;
use super::results::SettlementError;
use crate::aggregation::aggregate_orders;
use crate::broker::BrokerGateway;
use crate::distribution::distribute_receipts;
use crate::fraction::{allocate_fractions, split_fractions};
use crate::ledger::CustomerLedger;
use crate::order::{format_orders, format_receipts, ExecutionReceipt, Order};
use crate::report::SettlementReport;
use crate::types::Timestamp;
use log::{error, info};

impl<B: BrokerGateway> SettlementEngine<B> {
    /// Settle every pending transaction in `ledger` against one broker batch.
    ///
    /// Everything up to and including the broker call is read-only on the
    /// ledger, so a broker failure aborts with the ledger untouched. After
    /// receipts arrive, per-customer problems are isolated and reported on the
    /// returned [`SettlementReport`] instead of failing the run.
    pub fn settle(&mut self, ledger: &mut CustomerLedger) -> Result<SettlementReport, SettlementError> {
        let started_at = Timestamp::now();

        let combined = aggregate_orders(ledger);
        info!("combined: {}", format_orders(&combined));

        let split = split_fractions(&combined);
        let allocation = allocate_fractions(&combined, &split.remainders, ledger);

        let submitted: Vec<Order> = if self.config.submit_zero_unit_orders {
            split.submittable
        } else {
            split.submittable.into_iter().filter(|o| !o.units.is_zero()).collect()
        };
        info!("to broker: {}", format_orders(&submitted));

        let receipts = self.submit(&submitted)?;
        info!("from broker: {}", format_receipts(&receipts));

        let distribution = distribute_receipts(&receipts, &allocation, ledger);
        let mut anomalies = allocation.clamps;
        anomalies.extend(distribution.anomalies);

        self.runs += 1;
        info!(
            "settled {} completions across {} customers, {} anomalies, all settled: {}",
            distribution.completions.len(),
            ledger.len(),
            anomalies.len(),
            ledger.all_settled()
        );

        Ok(SettlementReport {
            started_at,
            combined,
            submitted,
            remainders: split.remainders,
            allocations: allocation.orders,
            receipts,
            completions: distribution.completions,
            anomalies,
        })
    }

    fn submit(&mut self, orders: &[Order]) -> Result<Vec<ExecutionReceipt>, SettlementError> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let receipts = self.broker.process_orders(orders).map_err(|source| {
            error!("broker {} failed, aborting run: {}", self.broker.name(), source);
            SettlementError::Broker {
                broker: self.broker.name().to_string(),
                source,
            }
        })?;

        let tradable = orders.iter().filter(|o| !o.units.is_zero()).count();
        if receipts.is_empty() && tradable > 0 {
            error!("broker {} returned no receipts, aborting run", self.broker.name());
            return Err(SettlementError::NoReceipts {
                broker: self.broker.name().to_string(),
                submitted: tradable,
            });
        }

        Ok(receipts)
    }
}
