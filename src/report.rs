// 6.0: what a settlement run did. the three diagnostic artifacts (combined,
// submitted, receipts), the allocation it computed, every ledger completion,
// and every per-customer anomaly that was isolated instead of aborting the run.

use crate::customer::{Completion, CustomerError};
use crate::fraction::Allocations;
use crate::order::{ExecutionReceipt, Order};
use crate::types::{CustomerId, InstrumentId, Timestamp, Units};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct CompletionRecord {
    pub customer: CustomerId,
    pub requested: Order,
    pub completion: Completion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    /// Fraction deduction would have pushed the purchasable quantity past
    /// zero or past the pending order. `allocated` is what was used instead.
    AllocationClamped {
        customer: CustomerId,
        identifier: InstrumentId,
        requested: Units,
        allocated: Units,
    },
    /// Broker returned a fill with no units. Nothing to divide.
    ZeroUnitReceipt { identifier: InstrumentId },
    /// Customers were allocated units but no receipt came back.
    MissingReceipt { identifier: InstrumentId },
    /// Completed order asked for more than was pending.
    CompletionClamped {
        customer: CustomerId,
        identifier: InstrumentId,
        requested: Units,
        pending: Units,
    },
    /// Ledger refused the completion; customer left untouched.
    ///
    /// The broker has still executed those units, so from here on the
    /// ledger and the broker disagree by the refused quantity. This record is
    /// the only trace of the difference and needs manual reconciliation.
    CompletionRejected {
        customer: CustomerId,
        identifier: InstrumentId,
        reason: CustomerError,
    },
}

#[derive(Debug, Clone)]
pub struct SettlementReport {
    pub started_at: Timestamp,
    pub combined: Vec<Order>,
    pub submitted: Vec<Order>,
    pub remainders: BTreeMap<InstrumentId, Units>,
    pub allocations: Allocations,
    pub receipts: Vec<ExecutionReceipt>,
    pub completions: Vec<CompletionRecord>,
    pub anomalies: Vec<Anomaly>,
}

impl SettlementReport {
    pub fn remainder(&self, identifier: &InstrumentId) -> Units {
        self.remainders.get(identifier).copied().unwrap_or_default()
    }

    pub fn submitted_units(&self, identifier: &InstrumentId) -> Units {
        self.submitted
            .iter()
            .filter(|o| o.is_for(identifier))
            .map(|o| o.units)
            .sum()
    }

    pub fn completions_for<'a>(&'a self, customer: &'a CustomerId) -> impl Iterator<Item = &'a CompletionRecord> {
        self.completions.iter().filter(move |r| &r.customer == customer)
    }

    pub fn is_clean(&self) -> bool {
        self.anomalies.is_empty()
    }
}
