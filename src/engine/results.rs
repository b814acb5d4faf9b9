// 7.0.2: run-level errors. anything here aborts the run before the ledger is touched.
// per-customer trouble never lands here, it becomes an Anomaly on the report.

use crate::broker::BrokerError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum SettlementError {
    #[error("Broker {broker} failed: {source}")]
    Broker {
        broker: String,
        #[source]
        source: BrokerError,
    },

    #[error("Broker {broker} returned no receipts for {submitted} tradable orders")]
    NoReceipts { broker: String, submitted: usize },
}
